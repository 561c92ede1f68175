//! Domain Constants
//!
//! Signal numbers used by the lifecycle operations

/// Graceful termination request
pub const SIGTERM: i32 = 15;

/// Forced termination after the stop timeout
pub const SIGKILL: i32 = 9;

/// Convert signal number to name (for logging)
pub fn signal_to_name(signal: i32) -> &'static str {
    match signal {
        SIGTERM => "SIGTERM",
        SIGKILL => "SIGKILL",
        _ => "UNKNOWN",
    }
}
