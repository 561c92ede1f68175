//! HTTP client for the service endpoints
//! Blocking ureq calls moved off the runtime with spawn_blocking

use crate::domain::ports::{AskRequest, SearchRequest, ServiceClient};
use crate::domain::{DomainError, ServiceSpec};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub struct UreqServiceClient;

impl UreqServiceClient {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UreqServiceClient {
    fn default() -> Self {
        Self::new()
    }
}

/// `None` body means GET
async fn call_json(
    url: String,
    body: Option<Value>,
    timeout: Duration,
) -> Result<Value, DomainError> {
    let task_url = url.clone();
    let result = tokio::task::spawn_blocking(move || {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        let response = match body {
            Some(body) => agent.post(&task_url).send_json(body),
            None => agent.get(&task_url).call(),
        };

        match response {
            Ok(resp) => {
                debug!(url = %task_url, status = resp.status(), "Service responded");
                resp.into_json::<Value>()
                    .map_err(|e| format!("invalid JSON body: {}", e))
            }
            Err(ureq::Error::Status(code, _)) => Err(format!("HTTP status {}", code)),
            Err(e) => Err(e.to_string()),
        }
    })
    .await;

    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(reason)) => Err(DomainError::Http { url, reason }),
        Err(e) => Err(DomainError::Http {
            url,
            reason: format!("request task failed: {}", e),
        }),
    }
}

fn to_body<T: serde::Serialize>(url: &str, request: &T) -> Result<Value, DomainError> {
    serde_json::to_value(request).map_err(|e| DomainError::Http {
        url: url.to_string(),
        reason: format!("cannot encode request: {}", e),
    })
}

#[async_trait]
impl ServiceClient for UreqServiceClient {
    async fn search(
        &self,
        spec: &ServiceSpec,
        request: &SearchRequest,
        timeout: Duration,
    ) -> Result<Value, DomainError> {
        let url = spec.endpoint_url("/search");
        let body = to_body(&url, request)?;
        call_json(url, Some(body), timeout).await
    }

    async fn ask(
        &self,
        spec: &ServiceSpec,
        request: &AskRequest,
        timeout: Duration,
    ) -> Result<Value, DomainError> {
        let url = spec.endpoint_url("/ask");
        let body = to_body(&url, request)?;
        call_json(url, Some(body), timeout).await
    }

    async fn stats(&self, spec: &ServiceSpec, timeout: Duration) -> Result<Value, DomainError> {
        call_json(spec.endpoint_url("/stats"), None, timeout).await
    }
}
