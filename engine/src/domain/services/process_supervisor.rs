//! Process supervisor
//! Brings an ordered list of services to a verified running state, or fails
//! cleanly, and tears them down again idempotently.

use crate::constants::timing;
use crate::domain::constants::{signal_to_name, SIGKILL, SIGTERM};
use crate::domain::ports::{HealthProbe, PidStore, ProcessExecutor, ProcessScanner, SpawnConfig};
use crate::domain::{
    DependencySpec, DomainError, HealthStatus, OrphanKill, PidRecord, ReadinessPolicy,
    ServiceHandle, ServiceSpec, ServiceStatus, StartError, StopEntry, StopOutcome, StopReport,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

pub struct ProcessSupervisor {
    executor: Arc<dyn ProcessExecutor>,
    pid_store: Arc<dyn PidStore>,
    probe: Arc<dyn HealthProbe>,
    scanner: Arc<dyn ProcessScanner>,
    dependency: Option<DependencySpec>,
    readiness: ReadinessPolicy,
    stop_timeout: Duration,
}

impl ProcessSupervisor {
    pub fn new(
        executor: Arc<dyn ProcessExecutor>,
        pid_store: Arc<dyn PidStore>,
        probe: Arc<dyn HealthProbe>,
        scanner: Arc<dyn ProcessScanner>,
    ) -> Self {
        Self {
            executor,
            pid_store,
            probe,
            scanner,
            dependency: None,
            readiness: ReadinessPolicy::default(),
            stop_timeout: Duration::from_secs(timing::DEFAULT_STOP_TIMEOUT_SECS),
        }
    }

    /// External endpoint that must answer before anything is spawned
    pub fn with_dependency(mut self, dependency: DependencySpec) -> Self {
        self.dependency = Some(dependency);
        self
    }

    pub fn with_readiness(mut self, readiness: ReadinessPolicy) -> Self {
        self.readiness = readiness;
        self
    }

    /// Grace period between SIGTERM and SIGKILL
    pub fn with_stop_timeout(mut self, stop_timeout: Duration) -> Self {
        self.stop_timeout = stop_timeout;
        self
    }

    // ========================================================================
    // Start
    // ========================================================================

    /// Start every service in order
    ///
    /// On success each service has a PID record and answered its health
    /// endpoint at least once. On failure nothing spawned by this call is left
    /// running and no record written by this call remains.
    pub async fn start(&self, specs: &[ServiceSpec]) -> Result<Vec<ServiceHandle>, StartError> {
        // Pre-flight first: a refused start leaves the run directory untouched
        self.check_dependency().await?;
        self.ensure_not_running(specs).await?;

        let mut handles: Vec<ServiceHandle> = Vec::with_capacity(specs.len());
        for spec in specs {
            match self.start_one(spec).await {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    warn!(
                        service = %spec.name(),
                        error = %e,
                        started = handles.len(),
                        "Startup failed, rolling back started services"
                    );
                    self.rollback(&handles).await;
                    return Err(e);
                }
            }
        }

        info!(count = handles.len(), "All services started");
        Ok(handles)
    }

    /// Stop then start
    pub async fn restart(
        &self,
        specs: &[ServiceSpec],
    ) -> Result<(StopReport, Vec<ServiceHandle>), StartError> {
        let report = self.stop(specs).await;
        let handles = self.start(specs).await?;
        Ok((report, handles))
    }

    /// Refuse to start over a live recorded process; drop stale records
    async fn ensure_not_running(&self, specs: &[ServiceSpec]) -> Result<(), StartError> {
        for spec in specs {
            let record = match self.pid_store.find(spec.name()).await {
                Ok(Some(record)) => record,
                Ok(None) => continue,
                Err(e) => {
                    warn!(service = %spec.name(), error = %e, "Discarding unreadable PID record");
                    self.discard_record(spec.name()).await;
                    continue;
                }
            };

            if self.executor.is_running(record.pid).await? {
                return Err(StartError::AlreadyRunning {
                    service: spec.name().to_string(),
                    pid: record.pid,
                });
            }

            info!(
                service = %spec.name(),
                pid = record.pid,
                "Removing stale PID record"
            );
            self.discard_record(spec.name()).await;
        }
        Ok(())
    }

    async fn check_dependency(&self) -> Result<(), StartError> {
        let Some(ref dependency) = self.dependency else {
            return Ok(());
        };

        let status = self
            .probe
            .probe_url(&dependency.url, self.readiness.probe_timeout)
            .await;
        if status.is_up() {
            debug!(dependency = %dependency.name, url = %dependency.url, "Dependency is available");
            return Ok(());
        }

        warn!(
            dependency = %dependency.name,
            url = %dependency.url,
            status = %status,
            "Dependency unavailable, nothing started"
        );
        Err(StartError::DependencyUnavailable {
            name: dependency.name.clone(),
            url: dependency.url.clone(),
        })
    }

    /// Spawn, record and gate one service; cleans up after itself on failure
    async fn start_one(&self, spec: &ServiceSpec) -> Result<ServiceHandle, StartError> {
        info!(
            service = %spec.name(),
            command = %spec.command(),
            log = %spec.log_path().display(),
            "Starting service"
        );

        let spawned = self
            .executor
            .spawn(SpawnConfig::from_spec(spec))
            .await
            .map_err(|e| StartError::SpawnFailed {
                service: spec.name().to_string(),
                reason: e.to_string(),
            })?;
        let pid = spawned.pid;
        let started_at = SystemTime::now();

        // Recorded before the gate so an interrupted start can still be stopped
        if let Err(e) = self.pid_store.save(&PidRecord::new(spec.name(), pid)).await {
            self.abandon(spec, pid).await;
            return Err(e.into());
        }

        let status = self
            .poll_health(
                spec,
                Some(pid),
                self.readiness.max_wait,
                self.readiness.poll_interval,
            )
            .await;
        if !status.is_up() {
            warn!(
                service = %spec.name(),
                pid = pid,
                max_wait_ms = self.readiness.max_wait.as_millis() as u64,
                "Service did not become healthy"
            );
            self.abandon(spec, pid).await;
            return Err(StartError::StartupHealthFailure {
                failed_service: spec.name().to_string(),
            });
        }

        info!(service = %spec.name(), pid = pid, url = %spec.base_url(), "Service is healthy");
        Ok(ServiceHandle {
            spec: spec.clone(),
            pid,
            started_at,
        })
    }

    /// Best-effort teardown of services started earlier in a failed sequence
    async fn rollback(&self, handles: &[ServiceHandle]) {
        for handle in handles.iter().rev() {
            self.abandon(&handle.spec, handle.pid).await;
        }
    }

    async fn abandon(&self, spec: &ServiceSpec, pid: u32) {
        if let Err(e) = self.terminate(pid).await {
            warn!(service = %spec.name(), pid = pid, error = %e, "Failed to terminate during rollback");
        }
        self.discard_record(spec.name()).await;
    }

    // ========================================================================
    // Readiness
    // ========================================================================

    /// Poll the health endpoint until it answers `Up` or `max_wait` elapses
    pub async fn wait_until_healthy(
        &self,
        spec: &ServiceSpec,
        max_wait: Duration,
        poll_interval: Duration,
    ) -> HealthStatus {
        self.poll_health(spec, None, max_wait, poll_interval).await
    }

    /// Readiness loop; with a pid, an exited process fails the gate immediately
    async fn poll_health(
        &self,
        spec: &ServiceSpec,
        pid: Option<u32>,
        max_wait: Duration,
        poll_interval: Duration,
    ) -> HealthStatus {
        let deadline = Instant::now() + max_wait;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let status = self.probe.check(spec, self.readiness.probe_timeout).await;
            if status.is_up() {
                debug!(service = %spec.name(), attempts = attempts, "Readiness probe succeeded");
                return status;
            }

            if let Some(pid) = pid {
                if let Ok(false) = self.executor.is_running(pid).await {
                    warn!(
                        service = %spec.name(),
                        pid = pid,
                        "Process exited before becoming healthy, see its log"
                    );
                    return HealthStatus::Down;
                }
            }

            let now = Instant::now();
            if now >= deadline {
                debug!(service = %spec.name(), attempts = attempts, status = %status, "Readiness deadline reached");
                return HealthStatus::Down;
            }
            sleep(poll_interval.min(deadline - now)).await;
        }
    }

    // ========================================================================
    // Stop
    // ========================================================================

    /// Stop every service in reverse start order, then sweep orphans
    ///
    /// Never fails: every per-service problem ends up in the report.
    pub async fn stop(&self, specs: &[ServiceSpec]) -> StopReport {
        let mut report = StopReport::default();
        let mut handled: HashSet<u32> = HashSet::new();

        for spec in specs.iter().rev() {
            let entry = self.stop_one(spec).await;
            if let Some(pid) = entry.pid {
                handled.insert(pid);
            }
            report.entries.push(entry);
        }

        self.sweep_orphans(specs, &mut handled, &mut report).await;

        info!(
            services = report.entries.len(),
            orphans = report.orphans.len(),
            "Stop completed"
        );
        report
    }

    async fn stop_one(&self, spec: &ServiceSpec) -> StopEntry {
        let service = spec.name().to_string();

        let record = match self.pid_store.find(spec.name()).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(service = %service, "No PID record, service not tracked");
                return StopEntry {
                    service,
                    pid: None,
                    outcome: StopOutcome::NotTracked,
                };
            }
            Err(e) => {
                warn!(service = %service, error = %e, "Discarding unreadable PID record");
                self.discard_record(spec.name()).await;
                return StopEntry {
                    service,
                    pid: None,
                    outcome: StopOutcome::NotTracked,
                };
            }
        };

        let outcome = match self.terminate(record.pid).await {
            Ok(true) => {
                info!(service = %service, pid = record.pid, "Service stopped");
                StopOutcome::Stopped
            }
            Ok(false) => {
                info!(service = %service, pid = record.pid, "Service was already stopped");
                StopOutcome::AlreadyStopped
            }
            Err(e) => {
                warn!(service = %service, pid = record.pid, error = %e, "Failed to stop service");
                StopOutcome::Failed(e.to_string())
            }
        };

        // Stale regardless of the outcome
        self.discard_record(spec.name()).await;

        StopEntry {
            service,
            pid: Some(record.pid),
            outcome,
        }
    }

    /// Terminate processes matching a service signature that no record accounted for
    async fn sweep_orphans(
        &self,
        specs: &[ServiceSpec],
        handled: &mut HashSet<u32>,
        report: &mut StopReport,
    ) {
        let own_pid = std::process::id();

        for spec in specs.iter().rev() {
            let pids = match self.scanner.find_by_signature(spec.match_signature()).await {
                Ok(pids) => pids,
                Err(e) => {
                    debug!(service = %spec.name(), error = %e, "Orphan scan failed, skipping");
                    continue;
                }
            };

            for pid in pids {
                if pid == own_pid || !handled.insert(pid) {
                    continue;
                }
                match self.terminate(pid).await {
                    Ok(true) => {
                        info!(service = %spec.name(), pid = pid, "Terminated orphan process");
                        report.orphans.push(OrphanKill {
                            service: spec.name().to_string(),
                            pid,
                        });
                    }
                    Ok(false) => {}
                    Err(e) => {
                        debug!(service = %spec.name(), pid = pid, error = %e, "Failed to terminate orphan");
                    }
                }
            }
        }
    }

    /// SIGTERM, wait up to the stop timeout, then SIGKILL
    ///
    /// Returns `Ok(false)` when the process was already gone.
    async fn terminate(&self, pid: u32) -> Result<bool, DomainError> {
        match self.executor.kill(pid, SIGTERM).await {
            Ok(()) => {}
            Err(DomainError::NotRunning(_)) => return Ok(false),
            Err(e) => return Err(e),
        }

        let deadline = Instant::now() + self.stop_timeout;
        let poll = Duration::from_millis(timing::STOP_POLL_INTERVAL_MS);
        while Instant::now() < deadline {
            if !self.executor.is_running(pid).await? {
                return Ok(true);
            }
            sleep(poll).await;
        }
        if !self.executor.is_running(pid).await? {
            return Ok(true);
        }

        warn!(
            pid = pid,
            timeout_secs = self.stop_timeout.as_secs(),
            signal = signal_to_name(SIGKILL),
            "Process ignored SIGTERM, forcing kill"
        );
        match self.executor.kill(pid, SIGKILL).await {
            Ok(()) | Err(DomainError::NotRunning(_)) => Ok(true),
            Err(e) => Err(e),
        }
    }

    async fn discard_record(&self, service: &str) {
        if let Err(e) = self.pid_store.remove(service).await {
            warn!(service = %service, error = %e, "Failed to remove PID record");
        }
    }

    // ========================================================================
    // Status
    // ========================================================================

    /// Read-only view: recorded pid, liveness and one health probe per service
    pub async fn status(&self, specs: &[ServiceSpec]) -> Vec<ServiceStatus> {
        let mut statuses = Vec::with_capacity(specs.len());

        for spec in specs {
            let pid = match self.pid_store.find(spec.name()).await {
                Ok(record) => record.map(|r| r.pid),
                Err(e) => {
                    debug!(service = %spec.name(), error = %e, "Unreadable PID record");
                    None
                }
            };

            let alive = match pid {
                Some(pid) => self.executor.is_running(pid).await.unwrap_or(false),
                None => false,
            };
            let health = self.probe.check(spec, self.readiness.probe_timeout).await;

            statuses.push(ServiceStatus {
                service: spec.name().to_string(),
                pid,
                alive,
                health,
                url: spec.base_url(),
            });
        }

        statuses
    }
}
