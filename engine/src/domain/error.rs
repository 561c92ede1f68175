//! Domain-level errors

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// The target process does not exist (or has already been reaped)
    #[error("Process is not running (PID: {0})")]
    NotRunning(u32),

    #[error("PID {0} cannot be signalled")]
    InvalidPid(u32),

    #[error("Failed to send signal {signal} to PID {pid}: {reason}")]
    SignalFailed { pid: u32, signal: i32, reason: String },

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Invalid service specification: {0}")]
    InvalidSpec(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("PID record for '{service}': {reason}")]
    PidRecord { service: String, reason: String },

    #[error("Request to {url} failed: {reason}")]
    Http { url: String, reason: String },

    #[error("Process scan failed: {0}")]
    Scan(String),

    #[error("Not supported on this platform: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;

/// Failure of a start sequence
///
/// Every variant is fatal for the whole sequence: nothing this sequence
/// spawned is left running once the error is returned.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StartError {
    #[error("Dependency '{name}' is unavailable at {url}")]
    DependencyUnavailable { name: String, url: String },

    #[error("Service '{service}' is already running (PID: {pid})")]
    AlreadyRunning { service: String, pid: u32 },

    #[error("Failed to spawn service '{service}': {reason}")]
    SpawnFailed { service: String, reason: String },

    #[error("Service '{failed_service}' did not become healthy")]
    StartupHealthFailure { failed_service: String },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl StartError {
    /// Name of the service whose startup failed, if the failure is tied to one
    pub fn failed_service(&self) -> Option<&str> {
        match self {
            Self::AlreadyRunning { service, .. } | Self::SpawnFailed { service, .. } => {
                Some(service)
            }
            Self::StartupHealthFailure { failed_service } => Some(failed_service),
            Self::DependencyUnavailable { .. } | Self::Domain(_) => None,
        }
    }
}
