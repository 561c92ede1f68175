pub mod constants;
pub mod error;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use error::{DomainError, Result, StartError};
pub use services::{ProcessSupervisor, SmokeTestConfig, SmokeTestRunner};
pub use value_objects::{
    DependencySpec, HealthStatus, LaunchCommand, NewsHighlight, OrphanKill, PidRecord,
    ReadinessPolicy, ServiceHandle, ServiceSpec, ServiceStatus, SmokeTestReport, StopEntry,
    StopOutcome, StopReport, TestStepResult,
};
