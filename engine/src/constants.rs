//! Application-wide constants and default values
//!
//! Defaults for the managed services, paths, timings and smoke test

/// Managed service defaults
pub mod services {
    /// Name of the news collector service
    pub const COLLECTOR_NAME: &str = "news-collector";

    /// Name of the AI agent service
    pub const AGENT_NAME: &str = "ai-agent";

    /// Entry script of the news collector
    pub const COLLECTOR_SCRIPT: &str = "news_collector_service.py";

    /// Entry script of the AI agent
    pub const AGENT_SCRIPT: &str = "ai_agent_service.py";

    pub const DEFAULT_COLLECTOR_PORT: u16 = 8001;
    pub const DEFAULT_AGENT_PORT: u16 = 8002;

    /// Interpreter used to launch both services
    pub const DEFAULT_PYTHON: &str = "python3";

    pub const DEFAULT_HOST: &str = "localhost";
    pub const DEFAULT_HEALTH_PATH: &str = "/health";
}

/// External dependency (local LLM runtime) defaults
pub mod dependency {
    pub const DEFAULT_NAME: &str = "llm-runtime";

    /// Any successful response from this endpoint means the runtime is usable
    pub const DEFAULT_URL: &str = "http://localhost:1234/v1/models";
}

/// Filesystem layout defaults, relative to the base directory
pub mod paths {
    pub const DEFAULT_BASE_DIR: &str = ".";
    pub const DEFAULT_RUN_DIR: &str = "run";
    pub const DEFAULT_LOG_DIR: &str = "logs";
    pub const PID_FILE_EXTENSION: &str = "pid";
    pub const LOG_FILE_EXTENSION: &str = "log";
}

/// Timing defaults for the lifecycle operations
pub mod timing {
    /// Upper bound for a service to answer its health endpoint after spawn (seconds)
    pub const DEFAULT_READY_TIMEOUT_SECS: u64 = 30;

    /// Delay between readiness probes (milliseconds)
    pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

    /// Timeout of a single health probe (seconds)
    pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

    /// Grace period between SIGTERM and SIGKILL (seconds)
    pub const DEFAULT_STOP_TIMEOUT_SECS: u64 = 10;

    /// Delay between liveness checks while waiting for a process to exit (milliseconds)
    pub const STOP_POLL_INTERVAL_MS: u64 = 100;
}

/// Smoke test defaults
pub mod smoke {
    pub const DEFAULT_SEARCH_QUERY: &str = "Центральный банк ключевая ставка";
    pub const DEFAULT_SEARCH_TOP_K: u32 = 5;
    pub const DEFAULT_QUESTION: &str = "Что происходит с ключевой ставкой ЦБ?";
    pub const DEFAULT_ASK_TOP_K: u32 = 5;

    pub const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 5;
    pub const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 30;

    /// The ask endpoint runs LLM inference downstream
    pub const DEFAULT_ASK_TIMEOUT_SECS: u64 = 120;

    /// Number of top results echoed in the report
    pub const HIGHLIGHT_COUNT: usize = 3;
}

/// Logging defaults
pub mod logging {
    /// The CLI prints its own output, engine logs stay quiet unless asked for
    pub const DEFAULT_LOG_LEVEL: &str = "warn";
}
