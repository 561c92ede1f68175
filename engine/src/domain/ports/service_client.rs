//! Port for the functional endpoints of the managed services

use crate::domain::{DomainError, ServiceSpec};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Body of `POST /search`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub top_k: u32,
}

/// Body of `POST /ask`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AskRequest {
    pub question: String,
    pub top_k: u32,
}

/// Responses are returned as raw JSON; callers decide which fields they need.
/// A non-2xx status is an error.
#[async_trait]
pub trait ServiceClient: Send + Sync {
    async fn search(
        &self,
        spec: &ServiceSpec,
        request: &SearchRequest,
        timeout: Duration,
    ) -> Result<Value, DomainError>;

    async fn ask(
        &self,
        spec: &ServiceSpec,
        request: &AskRequest,
        timeout: Duration,
    ) -> Result<Value, DomainError>;

    async fn stats(&self, spec: &ServiceSpec, timeout: Duration) -> Result<Value, DomainError>;
}
