//! ProcessExecutor port
//! Interface for spawning and signalling system processes

use crate::domain::{DomainError, ServiceSpec};
use async_trait::async_trait;
use std::path::PathBuf;

/// Configuration for spawning a process
#[derive(Debug, Clone)]
pub struct SpawnConfig {
    pub command: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub env_vars: Vec<(String, String)>,
    /// Receives both stdout and stderr, opened in append mode. `None` discards output.
    pub log_file: Option<PathBuf>,
}

/// Result of spawning a process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnResult {
    pub pid: u32,
}

/// Port for executing system processes
#[async_trait]
pub trait ProcessExecutor: Send + Sync {
    /// Spawn a new process, detached from the caller's session
    async fn spawn(&self, config: SpawnConfig) -> Result<SpawnResult, DomainError>;

    /// Send a signal to a process (and its process group when it leads one)
    ///
    /// Returns `DomainError::NotRunning` when no such process exists.
    async fn kill(&self, pid: u32, signal: i32) -> Result<(), DomainError>;

    /// Check if a process is still running
    async fn is_running(&self, pid: u32) -> Result<bool, DomainError>;
}

impl SpawnConfig {
    pub fn from_spec(spec: &ServiceSpec) -> Self {
        let command = spec.command();
        Self {
            command: command.program.clone(),
            args: command.args.clone(),
            working_dir: command.working_dir.clone(),
            env_vars: command.env.clone(),
            log_file: Some(spec.log_path().to_path_buf()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LaunchCommand;
    use std::path::Path;

    #[test]
    fn test_spawn_config_from_spec() {
        let command = LaunchCommand::new("python3")
            .arg("news_collector_service.py")
            .working_dir("/srv/news")
            .env("PYTHONUNBUFFERED", "1");
        let spec = ServiceSpec::builder("news-collector", command)
            .port(8001)
            .log_path("/var/log/news/collector.log")
            .build()
            .unwrap();

        let config = SpawnConfig::from_spec(&spec);

        assert_eq!(config.command, "python3");
        assert_eq!(config.args, vec!["news_collector_service.py".to_string()]);
        assert_eq!(config.working_dir.as_deref(), Some(Path::new("/srv/news")));
        assert_eq!(
            config.env_vars,
            vec![("PYTHONUNBUFFERED".to_string(), "1".to_string())]
        );
        assert_eq!(
            config.log_file.as_deref(),
            Some(Path::new("/var/log/news/collector.log"))
        );
    }
}
