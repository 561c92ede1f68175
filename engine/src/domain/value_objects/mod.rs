pub mod health_status;
pub mod lifecycle;
pub mod pid_record;
pub mod readiness_policy;
pub mod service_spec;
pub mod smoke_report;

pub use health_status::HealthStatus;
pub use lifecycle::{
    OrphanKill, ServiceHandle, ServiceStatus, StopEntry, StopOutcome, StopReport,
};
pub use pid_record::PidRecord;
pub use readiness_policy::ReadinessPolicy;
pub use service_spec::{DependencySpec, LaunchCommand, ServiceSpec, ServiceSpecBuilder};
pub use smoke_report::{NewsHighlight, SmokeTestReport, TestStepResult};
