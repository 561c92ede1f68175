//! Supervisor engine for the news stack
//!
//! The engine follows a ports-and-adapters layout:
//!
//! - `domain`: value objects, ports (traits) and the services that drive them
//!   (`ProcessSupervisor`, `SmokeTestRunner`)
//! - `infrastructure`: real adapters (process spawning via libc, PID files,
//!   `/proc` scanning, HTTP via ureq) and environment-based configuration

pub mod constants;
pub mod domain;
pub mod infrastructure;
