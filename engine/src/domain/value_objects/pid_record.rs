//! Persisted PID record
//!
//! One record per service, stored as decimal text. A record only says which
//! pid was spawned; the process may have died since.

use crate::domain::DomainError;

/// Largest pid the kernel hands out (`pid_t` is a signed 32-bit integer)
pub const MAX_PID: u32 = i32::MAX as u32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PidRecord {
    pub service: String,
    pub pid: u32,
}

impl PidRecord {
    pub fn new(service: impl Into<String>, pid: u32) -> Self {
        Self {
            service: service.into(),
            pid,
        }
    }

    /// Parse the on-disk representation
    pub fn parse(service: &str, contents: &str) -> Result<Self, DomainError> {
        let trimmed = contents.trim();
        let pid = trimmed
            .parse::<u32>()
            .map_err(|_| DomainError::PidRecord {
                service: service.to_string(),
                reason: format!("'{}' is not a process id", trimmed),
            })?;

        // 0 and 1 address whole groups or init; above pid_t::MAX is unsignalable
        if pid <= 1 || pid > MAX_PID {
            return Err(DomainError::PidRecord {
                service: service.to_string(),
                reason: format!("process id {} is out of range", pid),
            });
        }

        Ok(Self::new(service, pid))
    }

    pub fn to_file_contents(&self) -> String {
        self.pid.to_string()
    }
}
