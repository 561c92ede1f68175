//! PID store port
//! Durable mapping from service name to the pid spawned for it

use crate::domain::{DomainError, PidRecord};
use async_trait::async_trait;

#[async_trait]
pub trait PidStore: Send + Sync {
    /// Create or overwrite the record of a service
    async fn save(&self, record: &PidRecord) -> Result<(), DomainError>;

    /// Load the record of a service, `None` when there is none
    async fn find(&self, service: &str) -> Result<Option<PidRecord>, DomainError>;

    /// Delete the record of a service; deleting a missing record succeeds
    async fn remove(&self, service: &str) -> Result<(), DomainError>;
}
