//! In-Memory PID store
//! Thread-safe implementation of the PidStore port, used by tests and
//! embedders that do not need records to outlive the process

use crate::domain::{ports::PidStore, DomainError, PidRecord};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

#[derive(Clone, Default)]
pub struct InMemoryPidStore {
    records: Arc<RwLock<HashMap<String, u32>>>,
}

impl InMemoryPidStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_error(service: &str) -> DomainError {
        DomainError::PidRecord {
            service: service.to_string(),
            reason: "record table lock poisoned".to_string(),
        }
    }
}

#[async_trait]
impl PidStore for InMemoryPidStore {
    async fn save(&self, record: &PidRecord) -> Result<(), DomainError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| Self::lock_error(&record.service))?;
        records.insert(record.service.clone(), record.pid);

        debug!(
            service = %record.service,
            pid = record.pid,
            total_records = records.len(),
            "Saved PID record"
        );
        Ok(())
    }

    async fn find(&self, service: &str) -> Result<Option<PidRecord>, DomainError> {
        let records = self.records.read().map_err(|_| Self::lock_error(service))?;
        Ok(records.get(service).map(|pid| PidRecord::new(service, *pid)))
    }

    async fn remove(&self, service: &str) -> Result<(), DomainError> {
        let mut records = self.records.write().map_err(|_| Self::lock_error(service))?;
        if records.remove(service).is_some() {
            debug!(service = %service, "Removed PID record");
        }
        Ok(())
    }
}
