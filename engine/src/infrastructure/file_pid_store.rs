//! File-backed PID store
//! One decimal text file per service

use crate::constants::paths;
use crate::domain::ports::PidStore;
use crate::domain::{DomainError, PidRecord, ServiceSpec};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// PID files live in one directory as `<service>.pid` unless a service has an
/// explicit path registered
pub struct FilePidStore {
    dir: PathBuf,
    paths: HashMap<String, PathBuf>,
}

impl FilePidStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            paths: HashMap::new(),
        }
    }

    /// Use the `pid_file_path` of each spec
    pub fn from_specs(dir: impl Into<PathBuf>, specs: &[ServiceSpec]) -> Self {
        let mut store = Self::new(dir);
        for spec in specs {
            store
                .paths
                .insert(spec.name().to_string(), spec.pid_file_path().to_path_buf());
        }
        store
    }

    pub fn path_for(&self, service: &str) -> PathBuf {
        self.paths
            .get(service)
            .cloned()
            .unwrap_or_else(|| self.dir.join(format!("{}.{}", service, paths::PID_FILE_EXTENSION)))
    }

    fn io_error(service: &str, action: &str, path: &Path, e: std::io::Error) -> DomainError {
        DomainError::PidRecord {
            service: service.to_string(),
            reason: format!("failed to {} '{}': {}", action, path.display(), e),
        }
    }
}

#[async_trait]
impl PidStore for FilePidStore {
    async fn save(&self, record: &PidRecord) -> Result<(), DomainError> {
        let path = self.path_for(&record.service);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| Self::io_error(&record.service, "create directory for", &path, e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| Self::io_error(&record.service, "create", &path, e))?;

        write!(file, "{}", record.to_file_contents())
            .map_err(|e| Self::io_error(&record.service, "write", &path, e))?;

        debug!(pidfile = %path.display(), pid = record.pid, "Wrote PID file");
        Ok(())
    }

    async fn find(&self, service: &str) -> Result<Option<PidRecord>, DomainError> {
        let path = self.path_for(service);
        match fs::read_to_string(&path) {
            Ok(contents) => PidRecord::parse(service, &contents).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(service, "read", &path, e)),
        }
    }

    async fn remove(&self, service: &str) -> Result<(), DomainError> {
        let path = self.path_for(service);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(pidfile = %path.display(), "Removed PID file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(service, "remove", &path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LaunchCommand;

    #[tokio::test]
    async fn test_save_find_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePidStore::new(dir.path().join("run"));

        assert!(store.find("news-collector").await.unwrap().is_none());

        store
            .save(&PidRecord::new("news-collector", 4321))
            .await
            .unwrap();
        let path = dir.path().join("run").join("news-collector.pid");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "4321");
        assert_eq!(
            store.find("news-collector").await.unwrap(),
            Some(PidRecord::new("news-collector", 4321))
        );

        store.remove("news-collector").await.unwrap();
        assert!(!path.exists());
        // Removing twice is fine
        store.remove("news-collector").await.unwrap();
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePidStore::new(dir.path());

        store.save(&PidRecord::new("ai-agent", 123456)).await.unwrap();
        store.save(&PidRecord::new("ai-agent", 7)).await.unwrap();

        assert_eq!(store.find("ai-agent").await.unwrap().unwrap().pid, 7);
    }

    #[tokio::test]
    async fn test_corrupt_record_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePidStore::new(dir.path());
        std::fs::write(dir.path().join("ai-agent.pid"), "not a pid\n").unwrap();

        let err = store.find("ai-agent").await.unwrap_err();
        assert!(matches!(err, DomainError::PidRecord { ref service, .. } if service == "ai-agent"));
    }

    #[tokio::test]
    async fn test_paths_from_specs() {
        let dir = tempfile::tempdir().unwrap();
        let custom = dir.path().join("custom").join("collector.pid");
        let spec = ServiceSpec::builder(
            "news-collector",
            LaunchCommand::new("python3").arg("news_collector_service.py"),
        )
        .port(8001)
        .pid_file(&custom)
        .build()
        .unwrap();
        let store = FilePidStore::from_specs(dir.path(), &[spec]);

        store
            .save(&PidRecord::new("news-collector", 99))
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&custom).unwrap(), "99");
        assert_eq!(store.path_for("ai-agent"), dir.path().join("ai-agent.pid"));
    }
}
