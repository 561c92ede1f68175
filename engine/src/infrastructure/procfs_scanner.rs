//! `/proc` scanner
//! Finds processes by a substring of their command line

use crate::domain::ports::ProcessScanner;
use crate::domain::DomainError;
use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub struct ProcfsScanner {
    proc_root: PathBuf,
}

impl ProcfsScanner {
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    /// Scan an alternative procfs mount
    pub fn with_root(proc_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
        }
    }

    fn scan(&self, signature: &str) -> Result<Vec<u32>, DomainError> {
        if signature.is_empty() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.proc_root).map_err(|e| {
            DomainError::Scan(format!("cannot read {}: {}", self.proc_root.display(), e))
        })?;
        let own_pid = std::process::id();

        let mut pids = Vec::new();
        for entry in entries.flatten() {
            let Some(pid) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<u32>().ok())
            else {
                continue;
            };
            if pid == own_pid {
                continue;
            }

            // Processes may exit mid-scan; kernel threads have an empty cmdline
            let Ok(raw) = fs::read(entry.path().join("cmdline")) else {
                continue;
            };
            if raw.is_empty() {
                continue;
            }

            let cmdline = raw
                .split(|b| *b == 0)
                .filter(|part| !part.is_empty())
                .map(String::from_utf8_lossy)
                .collect::<Vec<_>>()
                .join(" ");
            if cmdline.contains(signature) {
                debug!(pid = pid, cmdline = %cmdline, "Process matches signature");
                pids.push(pid);
            }
        }

        pids.sort_unstable();
        Ok(pids)
    }
}

impl Default for ProcfsScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessScanner for ProcfsScanner {
    async fn find_by_signature(&self, signature: &str) -> Result<Vec<u32>, DomainError> {
        self.scan(signature)
    }
}
