//! Port for health probing
//! A single HTTP GET per call; callers compose retries themselves

use crate::domain::{HealthStatus, ServiceSpec};
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Probe an arbitrary URL: 2xx is `Up`, anything else is `Down`
    async fn probe_url(&self, url: &str, timeout: Duration) -> HealthStatus;

    /// Probe the health endpoint of a service
    async fn check(&self, spec: &ServiceSpec, timeout: Duration) -> HealthStatus {
        self.probe_url(&spec.health_url(), timeout).await
    }
}
