//! Process scanner port
//! Secondary lookup used by the orphan sweep when the PID store has no record

use crate::domain::DomainError;
use async_trait::async_trait;

#[async_trait]
pub trait ProcessScanner: Send + Sync {
    /// Pids of live processes whose command line contains `signature`
    ///
    /// Implementations never return the calling process itself.
    async fn find_by_signature(&self, signature: &str) -> Result<Vec<u32>, DomainError>;
}
