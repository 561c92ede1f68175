pub mod health_probe;
pub mod pid_store;
pub mod process_executor;
pub mod process_scanner;
pub mod service_client;

#[cfg(test)]
pub mod mock_ports;

pub use health_probe::HealthProbe;
pub use pid_store::PidStore;
pub use process_executor::{ProcessExecutor, SpawnConfig, SpawnResult};
pub use process_scanner::ProcessScanner;
pub use service_client::{AskRequest, SearchRequest, ServiceClient};
