//! Readiness gate timing

use crate::constants::timing;
use std::time::Duration;

/// Bounded polling used as the startup readiness gate
///
/// A service passes the gate when one probe answers `Up` before `max_wait`
/// elapses. Each probe is bounded by `probe_timeout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub max_wait: Duration,
    pub poll_interval: Duration,
    pub probe_timeout: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_secs(timing::DEFAULT_READY_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(timing::DEFAULT_POLL_INTERVAL_MS),
            probe_timeout: Duration::from_secs(timing::DEFAULT_PROBE_TIMEOUT_SECS),
        }
    }
}

impl ReadinessPolicy {
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }
}
