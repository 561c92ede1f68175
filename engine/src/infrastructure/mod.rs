//! Infrastructure Layer
//!
//! Adapters implementing the ports defined in the domain layer.
//!
//! ## Adapters
//!
//! - `TokioProcessExecutor`: detached process spawning and signalling via libc
//! - `FilePidStore` / `InMemoryPidStore`: PID record persistence
//! - `UreqHealthProbe` / `UreqServiceClient`: HTTP via ureq
//! - `ProcfsScanner`: `/proc` command-line scan for the orphan sweep
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ns_engine::domain::ProcessSupervisor;
//! use ns_engine::infrastructure::{
//!     default_services, dependency, FilePidStore, ProcfsScanner, SupervisorConfig,
//!     TokioProcessExecutor, UreqHealthProbe,
//! };
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SupervisorConfig::from_env();
//! let specs = default_services(&config)?;
//! let supervisor = ProcessSupervisor::new(
//!     Arc::new(TokioProcessExecutor::new()),
//!     Arc::new(FilePidStore::from_specs(config.run_path(), &specs)),
//!     Arc::new(UreqHealthProbe::new()),
//!     Arc::new(ProcfsScanner::new()),
//! )
//! .with_dependency(dependency(&config))
//! .with_readiness(config.readiness_policy());
//!
//! supervisor.start(&specs).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod file_pid_store;
pub mod http_health_probe;
pub mod http_service_client;
pub mod in_memory_pid_store;
pub mod procfs_scanner;
pub mod tokio_executor;

pub use config::{default_services, dependency, SupervisorConfig};
pub use file_pid_store::FilePidStore;
pub use http_health_probe::UreqHealthProbe;
pub use http_service_client::UreqServiceClient;
pub use in_memory_pid_store::InMemoryPidStore;
pub use procfs_scanner::ProcfsScanner;
pub use tokio_executor::TokioProcessExecutor;
