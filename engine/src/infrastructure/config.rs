//! Supervisor configuration from environment variables
//!
//! Every setting has an inline default; `NS_*` variables override them.

use crate::constants::{dependency as dep, logging, paths, services, timing};
use crate::domain::{
    DependencySpec, DomainError, LaunchCommand, ReadinessPolicy, Result, ServiceSpec,
};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Supervisor configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Directory holding the service scripts; also their working directory
    pub base_dir: PathBuf,

    /// PID files, relative to `base_dir` unless absolute
    pub run_dir: PathBuf,

    /// Service logs, relative to `base_dir` unless absolute
    pub log_dir: PathBuf,

    /// Interpreter used to launch the services
    pub python: String,

    pub collector_port: u16,
    pub agent_port: u16,

    /// LLM runtime readiness endpoint
    pub llm_url: String,

    pub ready_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub probe_timeout_secs: u64,
    pub stop_timeout_secs: u64,

    pub log_level: String,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(paths::DEFAULT_BASE_DIR),
            run_dir: PathBuf::from(paths::DEFAULT_RUN_DIR),
            log_dir: PathBuf::from(paths::DEFAULT_LOG_DIR),
            python: services::DEFAULT_PYTHON.to_string(),
            collector_port: services::DEFAULT_COLLECTOR_PORT,
            agent_port: services::DEFAULT_AGENT_PORT,
            llm_url: dep::DEFAULT_URL.to_string(),
            ready_timeout_secs: timing::DEFAULT_READY_TIMEOUT_SECS,
            poll_interval_ms: timing::DEFAULT_POLL_INTERVAL_MS,
            probe_timeout_secs: timing::DEFAULT_PROBE_TIMEOUT_SECS,
            stop_timeout_secs: timing::DEFAULT_STOP_TIMEOUT_SECS,
            log_level: logging::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl SupervisorConfig {
    /// Load configuration from environment variables
    ///
    /// Unparseable numeric values fall back to their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_dir: env::var("NS_BASE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.base_dir),
            run_dir: env::var("NS_RUN_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.run_dir),
            log_dir: env::var("NS_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            python: env::var("NS_PYTHON").unwrap_or(defaults.python),
            collector_port: Self::parse_u16("NS_COLLECTOR_PORT")
                .unwrap_or(defaults.collector_port),
            agent_port: Self::parse_u16("NS_AGENT_PORT").unwrap_or(defaults.agent_port),
            llm_url: env::var("NS_LLM_URL").unwrap_or(defaults.llm_url),
            ready_timeout_secs: Self::parse_u64("NS_READY_TIMEOUT_SECS")
                .unwrap_or(defaults.ready_timeout_secs),
            poll_interval_ms: Self::parse_u64("NS_POLL_INTERVAL_MS")
                .unwrap_or(defaults.poll_interval_ms),
            probe_timeout_secs: Self::parse_u64("NS_PROBE_TIMEOUT_SECS")
                .unwrap_or(defaults.probe_timeout_secs),
            stop_timeout_secs: Self::parse_u64("NS_STOP_TIMEOUT_SECS")
                .unwrap_or(defaults.stop_timeout_secs),
            log_level: Self::parse_log_level(),
        }
    }

    fn parse_u16(var_name: &str) -> Option<u16> {
        env::var(var_name).ok().and_then(|s| s.trim().parse().ok())
    }

    fn parse_u64(var_name: &str) -> Option<u64> {
        env::var(var_name).ok().and_then(|s| s.trim().parse().ok())
    }

    fn parse_log_level() -> String {
        // Priority: NS_LOG_LEVEL > RUST_LOG > default
        env::var("NS_LOG_LEVEL")
            .or_else(|_| env::var("RUST_LOG"))
            .unwrap_or_else(|_| logging::DEFAULT_LOG_LEVEL.to_string())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.collector_port == 0 || self.agent_port == 0 {
            return Err(DomainError::InvalidConfiguration(
                "service ports must be non-zero".to_string(),
            ));
        }
        if self.collector_port == self.agent_port {
            return Err(DomainError::InvalidConfiguration(format!(
                "NS_COLLECTOR_PORT and NS_AGENT_PORT are both {}",
                self.collector_port
            )));
        }
        if self.python.trim().is_empty() {
            return Err(DomainError::InvalidConfiguration(
                "NS_PYTHON is empty".to_string(),
            ));
        }
        if !(self.llm_url.starts_with("http://") || self.llm_url.starts_with("https://")) {
            return Err(DomainError::InvalidConfiguration(format!(
                "NS_LLM_URL '{}' is not an http(s) URL",
                self.llm_url
            )));
        }
        if self.ready_timeout_secs == 0 || self.poll_interval_ms == 0 {
            return Err(DomainError::InvalidConfiguration(
                "readiness timeout and poll interval must be non-zero".to_string(),
            ));
        }
        if self.probe_timeout_secs == 0 {
            return Err(DomainError::InvalidConfiguration(
                "NS_PROBE_TIMEOUT_SECS must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Configuration for tearing the stack down regardless of `validate`
    ///
    /// Teardown only needs the PID file paths and the script names. Launch
    /// settings that would keep the service specs from building are replaced
    /// with their defaults.
    pub fn for_teardown(&self) -> Self {
        let defaults = Self::default();
        let mut config = self.clone();
        if config.collector_port == 0 {
            config.collector_port = defaults.collector_port;
        }
        if config.agent_port == 0 {
            config.agent_port = defaults.agent_port;
        }
        if config.python.trim().is_empty() {
            config.python = defaults.python;
        }
        config
    }

    pub fn run_path(&self) -> PathBuf {
        self.base_dir.join(&self.run_dir)
    }

    pub fn log_path(&self) -> PathBuf {
        self.base_dir.join(&self.log_dir)
    }

    pub fn readiness_policy(&self) -> ReadinessPolicy {
        ReadinessPolicy {
            max_wait: Duration::from_secs(self.ready_timeout_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            probe_timeout: Duration::from_secs(self.probe_timeout_secs),
        }
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }

    fn python_service(&self, name: &str, script: &str, port: u16) -> Result<ServiceSpec> {
        let command = LaunchCommand::new(&self.python)
            .arg(script)
            .working_dir(&self.base_dir)
            .env("PYTHONUNBUFFERED", "1");

        ServiceSpec::builder(name, command)
            .port(port)
            .log_path(
                self.log_path()
                    .join(format!("{}.{}", name, paths::LOG_FILE_EXTENSION)),
            )
            .pid_file(
                self.run_path()
                    .join(format!("{}.{}", name, paths::PID_FILE_EXTENSION)),
            )
            .match_signature(script)
            .build()
    }
}

/// The collector and the agent, in start order
pub fn default_services(config: &SupervisorConfig) -> Result<Vec<ServiceSpec>> {
    Ok(vec![
        config.python_service(
            services::COLLECTOR_NAME,
            services::COLLECTOR_SCRIPT,
            config.collector_port,
        )?,
        config.python_service(
            services::AGENT_NAME,
            services::AGENT_SCRIPT,
            config.agent_port,
        )?,
    ])
}

pub fn dependency(config: &SupervisorConfig) -> DependencySpec {
    DependencySpec::new(dep::DEFAULT_NAME, &config.llm_url)
}
