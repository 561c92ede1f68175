//! HTTP health probe
//! One blocking ureq GET per call, moved off the runtime with spawn_blocking

use crate::domain::ports::HealthProbe;
use crate::domain::HealthStatus;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error};

pub struct UreqHealthProbe;

impl UreqHealthProbe {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UreqHealthProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HealthProbe for UreqHealthProbe {
    async fn probe_url(&self, url: &str, timeout: Duration) -> HealthStatus {
        let endpoint = url.to_string();

        let result = tokio::task::spawn_blocking(move || {
            let agent = ureq::AgentBuilder::new().timeout(timeout).build();

            match agent.get(&endpoint).call() {
                Ok(resp) => {
                    let status = resp.status();
                    debug!(url = %endpoint, status = status, "Health probe response");
                    if (200..300).contains(&status) {
                        HealthStatus::Up
                    } else {
                        HealthStatus::Down
                    }
                }
                Err(ureq::Error::Status(code, _)) => {
                    debug!(url = %endpoint, status = code, "Health probe got error status");
                    HealthStatus::Down
                }
                Err(e) => {
                    debug!(url = %endpoint, error = %e, "Health probe failed");
                    HealthStatus::Down
                }
            }
        })
        .await;

        match result {
            Ok(status) => status,
            Err(e) => {
                error!(url = %url, error = %e, "Health probe task failed");
                HealthStatus::Unknown
            }
        }
    }
}
