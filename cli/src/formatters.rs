//! Output formatting utilities

use chrono::{Local, TimeZone};
use colored::*;
use ns_engine::domain::{HealthStatus, StopOutcome};
use std::time::{SystemTime, UNIX_EPOCH};

/// Format a Unix timestamp to human-readable date/time
pub fn format_timestamp(ts: i64) -> String {
    if ts == 0 {
        return "-".to_string();
    }
    match Local.timestamp_opt(ts, 0) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        _ => "invalid".to_string(),
    }
}

pub fn format_system_time(time: SystemTime) -> String {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    format_timestamp(secs)
}

/// Format a stop outcome with appropriate color
pub fn format_outcome(outcome: &StopOutcome) -> ColoredString {
    let text = outcome.to_string();
    match outcome {
        StopOutcome::Stopped => text.green(),
        StopOutcome::AlreadyStopped => text.yellow(),
        StopOutcome::NotTracked => text.normal(),
        StopOutcome::Failed(_) => text.red(),
    }
}

pub fn format_health(health: HealthStatus) -> ColoredString {
    let text = health.to_string();
    match health {
        HealthStatus::Up => text.green(),
        HealthStatus::Down => text.red(),
        HealthStatus::Unknown => text.yellow(),
    }
}

pub fn format_pass(passed: bool) -> ColoredString {
    if passed {
        "PASS".green()
    } else {
        "FAIL".red()
    }
}

pub fn format_pid(pid: Option<u32>) -> String {
    pid.map_or_else(|| "-".to_string(), |p| p.to_string())
}
