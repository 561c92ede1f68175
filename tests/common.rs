//! Shared test utilities for E2E tests
//!
//! Services under test are real processes (`sh` running a bounded `sleep`)
//! whose health endpoints are served by in-process axum stubs, so readiness,
//! rollback and stop can be exercised without the Python services.
//!
//! Every spawned command line carries a unique marker that doubles as the
//! service's match signature, so the orphan sweep never touches anything a
//! test did not start itself.

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use ns_engine::domain::ports::{ProcessExecutor, SpawnConfig, SpawnResult};
use ns_engine::domain::{
    DependencySpec, DomainError, LaunchCommand, ProcessSupervisor, ReadinessPolicy, ServiceSpec,
};
use ns_engine::infrastructure::{
    FilePidStore, ProcfsScanner, TokioProcessExecutor, UreqHealthProbe,
};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Upper bound for a test process; keeps leaks short-lived if a test panics
pub const SERVICE_LIFETIME_SECS: u32 = 30;

static MARKER_COUNTER: AtomicU32 = AtomicU32::new(0);

pub fn setup_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Command-line marker unique to this test binary and call
pub fn unique_marker(name: &str) -> String {
    format!(
        "[ns-e2e:{}:{}:{}]",
        name,
        std::process::id(),
        MARKER_COUNTER.fetch_add(1, Ordering::SeqCst)
    )
}

/// A port nothing listens on
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    listener.local_addr().expect("No local addr").port()
}

// ============================================================================
// Stub HTTP services
// ============================================================================

/// Serve `router` on an ephemeral localhost port for the rest of the test
pub async fn spawn_stub(router: Router) -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind stub");
    let port = listener.local_addr().expect("No local addr").port();
    let server = axum::Server::from_tcp(listener)
        .expect("Failed to create stub server")
        .serve(router.into_make_service());
    tokio::spawn(async move {
        let _ = server.await;
    });
    port
}

fn json_route(body: Value) -> impl Fn() -> std::future::Ready<Json<Value>> + Clone + Send + 'static {
    move || std::future::ready(Json(body.clone()))
}

pub fn healthy_router() -> Router {
    Router::new().route("/health", get(|| async { "ok" }))
}

pub fn unhealthy_router() -> Router {
    Router::new().route(
        "/health",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "starting") }),
    )
}

/// LLM runtime readiness endpoint
pub fn llm_router() -> Router {
    Router::new().route("/v1/models", get(json_route(json!({ "data": [] }))))
}

pub fn collector_router(search_body: Value) -> Router {
    healthy_router()
        .route("/stats", get(json_route(json!({ "total_news": 42 }))))
        .route("/search", post(json_route(search_body)))
}

pub fn agent_router(ask_body: Value) -> Router {
    healthy_router().route("/ask", post(json_route(ask_body)))
}

pub fn sample_search_body() -> Value {
    json!({
        "total_found": 3,
        "news": [{ "title": "Ключевая ставка сохранена", "similarity": 0.82 }]
    })
}

pub fn sample_ask_body() -> Value {
    json!({
        "answer": "ЦБ сохранил ключевую ставку.",
        "news_found": 3,
        "top_news": [
            { "title": "Ставка сохранена", "similarity": 0.9126, "critical_keywords": 2 },
            { "title": "Инфляция замедлилась", "similarity": 0.71, "critical_keywords": 0 },
            { "title": "Рубль укрепился", "similarity": 0.64, "critical_keywords": 0 },
            { "title": "Нефть подорожала", "similarity": 0.5, "critical_keywords": 1 }
        ]
    })
}

pub fn llm_dependency(port: u16) -> DependencySpec {
    DependencySpec::new("llm-runtime", format!("http://127.0.0.1:{}/v1/models", port))
}

// ============================================================================
// Service specs
// ============================================================================

/// A service running `script` under `sh`, answering health on `port`
pub fn shell_spec(dir: &Path, name: &str, script: &str, port: u16) -> ServiceSpec {
    shell_spec_marked(dir, name, script, port, &unique_marker(name))
}

/// Like [`shell_spec`] with a caller-chosen marker
pub fn shell_spec_marked(
    dir: &Path,
    name: &str,
    script: &str,
    port: u16,
    marker: &str,
) -> ServiceSpec {
    let command = LaunchCommand::new("sh").args(["-c", script, marker]);

    ServiceSpec::builder(name, command)
        .host("127.0.0.1")
        .port(port)
        .log_path(dir.join("logs").join(format!("{}.log", name)))
        .pid_file(dir.join("run").join(format!("{}.pid", name)))
        .match_signature(marker)
        .build()
        .expect("Invalid test spec")
}

/// Long-running well-behaved service
pub fn sleeper_spec(dir: &Path, name: &str, port: u16) -> ServiceSpec {
    // Trailing `:` keeps sh from exec'ing sleep, so the marker stays visible
    shell_spec(
        dir,
        name,
        &format!("sleep {}; :", SERVICE_LIFETIME_SECS),
        port,
    )
}

// ============================================================================
// Supervisor wiring
// ============================================================================

/// Real executor that remembers every pid it spawned
#[derive(Default)]
pub struct RecordingExecutor {
    inner: TokioProcessExecutor,
    spawned: Mutex<Vec<u32>>,
}

impl RecordingExecutor {
    pub fn spawned(&self) -> Vec<u32> {
        self.spawned.lock().expect("poisoned").clone()
    }
}

#[async_trait]
impl ProcessExecutor for RecordingExecutor {
    async fn spawn(&self, config: SpawnConfig) -> Result<SpawnResult, DomainError> {
        let result = self.inner.spawn(config).await?;
        self.spawned.lock().expect("poisoned").push(result.pid);
        Ok(result)
    }

    async fn kill(&self, pid: u32, signal: i32) -> Result<(), DomainError> {
        self.inner.kill(pid, signal).await
    }

    async fn is_running(&self, pid: u32) -> Result<bool, DomainError> {
        self.inner.is_running(pid).await
    }
}

pub struct TestSupervisor {
    pub supervisor: ProcessSupervisor,
    pub executor: Arc<RecordingExecutor>,
}

pub fn supervisor(dir: &Path, dependency: DependencySpec) -> TestSupervisor {
    supervisor_with_stop_timeout(dir, dependency, Duration::from_secs(3))
}

pub fn supervisor_with_stop_timeout(
    dir: &Path,
    dependency: DependencySpec,
    stop_timeout: Duration,
) -> TestSupervisor {
    let executor = Arc::new(RecordingExecutor::default());
    let supervisor = ProcessSupervisor::new(
        executor.clone(),
        Arc::new(FilePidStore::new(dir.join("run"))),
        Arc::new(UreqHealthProbe::new()),
        Arc::new(ProcfsScanner::new()),
    )
    .with_dependency(dependency)
    .with_readiness(
        ReadinessPolicy::default()
            .with_max_wait(Duration::from_secs(3))
            .with_poll_interval(Duration::from_millis(100))
            .with_probe_timeout(Duration::from_secs(1)),
    )
    .with_stop_timeout(stop_timeout);

    TestSupervisor {
        supervisor,
        executor,
    }
}

pub async fn is_alive(pid: u32) -> bool {
    TokioProcessExecutor::new()
        .is_running(pid)
        .await
        .unwrap_or(false)
}

/// Poll until `pid` is gone, up to two seconds
pub async fn wait_until_dead(pid: u32) -> bool {
    for _ in 0..40 {
        if !is_alive(pid).await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}
