//! In-memory test doubles for the domain ports

use super::{
    AskRequest, HealthProbe, ProcessExecutor, ProcessScanner, SearchRequest, ServiceClient,
    SpawnConfig, SpawnResult,
};
use crate::domain::constants::SIGKILL;
use crate::domain::{DomainError, HealthStatus, ServiceSpec};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
struct ExecutorState {
    next_pid: u32,
    running: HashSet<u32>,
    spawned: Vec<(u32, SpawnConfig)>,
    signals: Vec<(u32, i32)>,
    stubborn: HashSet<u32>,
    denied: HashSet<u32>,
}

/// Executor that tracks fake pids instead of real processes
pub struct MockExecutor {
    state: Mutex<ExecutorState>,
    fail_spawn_for: Option<String>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ExecutorState {
                next_pid: 1000,
                ..Default::default()
            }),
            fail_spawn_for: None,
        }
    }

    /// Make `spawn` fail for commands whose arguments contain `needle`
    pub fn failing_spawn_for(needle: &str) -> Self {
        Self {
            fail_spawn_for: Some(needle.to_string()),
            ..Self::new()
        }
    }

    /// Register a pid as alive without spawning it
    pub fn add_running(&self, pid: u32) {
        self.state.lock().unwrap().running.insert(pid);
    }

    /// The pid ignores SIGTERM and only dies on SIGKILL
    pub fn make_stubborn(&self, pid: u32) {
        self.state.lock().unwrap().stubborn.insert(pid);
    }

    /// Signals to the pid fail with a permission error
    pub fn deny_signals(&self, pid: u32) {
        self.state.lock().unwrap().denied.insert(pid);
    }

    pub fn is_alive(&self, pid: u32) -> bool {
        self.state.lock().unwrap().running.contains(&pid)
    }

    pub fn spawned_pids(&self) -> Vec<u32> {
        self.state
            .lock()
            .unwrap()
            .spawned
            .iter()
            .map(|(pid, _)| *pid)
            .collect()
    }

    pub fn spawned_configs(&self) -> Vec<SpawnConfig> {
        self.state
            .lock()
            .unwrap()
            .spawned
            .iter()
            .map(|(_, config)| config.clone())
            .collect()
    }

    pub fn signals(&self) -> Vec<(u32, i32)> {
        self.state.lock().unwrap().signals.clone()
    }
}

#[async_trait]
impl ProcessExecutor for MockExecutor {
    async fn spawn(&self, config: SpawnConfig) -> Result<SpawnResult, DomainError> {
        if let Some(ref needle) = self.fail_spawn_for {
            if config.args.iter().any(|a| a.contains(needle.as_str())) {
                return Err(DomainError::InvalidCommand(format!(
                    "Failed to spawn process: {} not found",
                    needle
                )));
            }
        }

        let mut state = self.state.lock().unwrap();
        state.next_pid += 1;
        let pid = state.next_pid;
        state.running.insert(pid);
        state.spawned.push((pid, config));
        Ok(SpawnResult { pid })
    }

    async fn kill(&self, pid: u32, signal: i32) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        if !state.running.contains(&pid) {
            return Err(DomainError::NotRunning(pid));
        }
        if state.denied.contains(&pid) {
            return Err(DomainError::SignalFailed {
                pid,
                signal,
                reason: "Operation not permitted".to_string(),
            });
        }
        state.signals.push((pid, signal));
        if signal == SIGKILL || !state.stubborn.contains(&pid) {
            state.running.remove(&pid);
        }
        Ok(())
    }

    async fn is_running(&self, pid: u32) -> Result<bool, DomainError> {
        Ok(self.state.lock().unwrap().running.contains(&pid))
    }
}

/// Probe answering from a per-URL table; unknown URLs are `Down`
pub struct MockHealthProbe {
    statuses: Mutex<HashMap<String, HealthStatus>>,
    probes: Mutex<Vec<String>>,
}

impl MockHealthProbe {
    pub fn new() -> Self {
        Self {
            statuses: Mutex::new(HashMap::new()),
            probes: Mutex::new(Vec::new()),
        }
    }

    pub fn set(&self, url: &str, status: HealthStatus) {
        self.statuses
            .lock()
            .unwrap()
            .insert(url.to_string(), status);
    }

    pub fn probe_count(&self, url: &str) -> usize {
        self.probes
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.as_str() == url)
            .count()
    }

    pub fn total_probes(&self) -> usize {
        self.probes.lock().unwrap().len()
    }
}

#[async_trait]
impl HealthProbe for MockHealthProbe {
    async fn probe_url(&self, url: &str, _timeout: Duration) -> HealthStatus {
        self.probes.lock().unwrap().push(url.to_string());
        self.statuses
            .lock()
            .unwrap()
            .get(url)
            .copied()
            .unwrap_or(HealthStatus::Down)
    }
}

/// Scanner answering from a per-signature table
pub struct MockScanner {
    matches: Mutex<HashMap<String, Vec<u32>>>,
    fail: bool,
}

impl MockScanner {
    pub fn new() -> Self {
        Self {
            matches: Mutex::new(HashMap::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn add(&self, signature: &str, pid: u32) {
        self.matches
            .lock()
            .unwrap()
            .entry(signature.to_string())
            .or_default()
            .push(pid);
    }
}

#[async_trait]
impl ProcessScanner for MockScanner {
    async fn find_by_signature(&self, signature: &str) -> Result<Vec<u32>, DomainError> {
        if self.fail {
            return Err(DomainError::Scan("/proc is not mounted".to_string()));
        }
        Ok(self
            .matches
            .lock()
            .unwrap()
            .get(signature)
            .cloned()
            .unwrap_or_default())
    }
}

/// Client returning canned JSON bodies
pub struct MockServiceClient {
    search: Result<Value, DomainError>,
    ask: Result<Value, DomainError>,
    stats: Result<Value, DomainError>,
    calls: Mutex<Vec<String>>,
}

impl MockServiceClient {
    pub fn new(search: Value, ask: Value) -> Self {
        Self {
            search: Ok(search),
            ask: Ok(ask),
            stats: Ok(serde_json::json!({ "total_news": 0 })),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_search(mut self, search: Result<Value, DomainError>) -> Self {
        self.search = search;
        self
    }

    pub fn with_ask(mut self, ask: Result<Value, DomainError>) -> Self {
        self.ask = ask;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ServiceClient for MockServiceClient {
    async fn search(
        &self,
        spec: &ServiceSpec,
        request: &SearchRequest,
        _timeout: Duration,
    ) -> Result<Value, DomainError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("search {} top_k={}", spec.name(), request.top_k));
        self.search.clone()
    }

    async fn ask(
        &self,
        spec: &ServiceSpec,
        request: &AskRequest,
        _timeout: Duration,
    ) -> Result<Value, DomainError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("ask {} top_k={}", spec.name(), request.top_k));
        self.ask.clone()
    }

    async fn stats(&self, spec: &ServiceSpec, _timeout: Duration) -> Result<Value, DomainError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("stats {}", spec.name()));
        self.stats.clone()
    }
}
