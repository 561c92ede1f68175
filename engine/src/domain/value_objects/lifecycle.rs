//! Lifecycle results: handles from start, reports from stop and status

use super::{HealthStatus, ServiceSpec};
use std::time::SystemTime;

/// A service started by the supervisor
#[derive(Debug, Clone)]
pub struct ServiceHandle {
    pub spec: ServiceSpec,
    pub pid: u32,
    pub started_at: SystemTime,
}

/// What happened to one tracked service during stop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// Termination signal delivered
    Stopped,
    /// A record existed but the process was already gone
    AlreadyStopped,
    /// No record for this service
    NotTracked,
    /// The process exists but could not be signalled
    Failed(String),
}

impl std::fmt::Display for StopOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::AlreadyStopped => write!(f, "already stopped"),
            Self::NotTracked => write!(f, "not tracked"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopEntry {
    pub service: String,
    pub pid: Option<u32>,
    pub outcome: StopOutcome,
}

/// Untracked process terminated by the orphan sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanKill {
    pub service: String,
    pub pid: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopReport {
    pub entries: Vec<StopEntry>,
    pub orphans: Vec<OrphanKill>,
}

impl StopReport {
    pub fn outcome_for(&self, service: &str) -> Option<&StopOutcome> {
        self.entries
            .iter()
            .find(|e| e.service == service)
            .map(|e| &e.outcome)
    }

    /// True when nothing was tracked and nothing was swept
    pub fn is_noop(&self) -> bool {
        self.orphans.is_empty()
            && self
                .entries
                .iter()
                .all(|e| e.outcome == StopOutcome::NotTracked)
    }
}

/// Read-only view of one service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatus {
    pub service: String,
    pub pid: Option<u32>,
    pub alive: bool,
    pub health: HealthStatus,
    pub url: String,
}
