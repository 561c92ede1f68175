pub mod process_supervisor;
pub mod smoke_test_runner;

pub use process_supervisor::ProcessSupervisor;
pub use smoke_test_runner::{extract_highlights, SmokeTestConfig, SmokeTestRunner};
