//! Tokio Process Executor
//! Real implementation of the ProcessExecutor port
//!
//! Services are spawned detached: each child leads its own session and process
//! group, so it survives the supervisor and can be signalled as a group.

use crate::domain::ports::{ProcessExecutor, SpawnConfig, SpawnResult};
use crate::domain::DomainError;
use async_trait::async_trait;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, error, info, warn};

#[cfg(unix)]
use std::os::unix::process::CommandExt;

/// Tokio-based process executor
pub struct TokioProcessExecutor;

impl TokioProcessExecutor {
    pub fn new() -> Self {
        Self
    }

    /// stdout and stderr share one append-mode handle on the log file
    fn configure_output(log_file: Option<&Path>) -> Result<(Stdio, Stdio), DomainError> {
        let Some(path) = log_file else {
            return Ok((Stdio::null(), Stdio::null()));
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                DomainError::InvalidCommand(format!(
                    "Failed to create log directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                DomainError::InvalidCommand(format!(
                    "Failed to open log file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        let stderr = file.try_clone().map_err(|e| {
            DomainError::InvalidCommand(format!(
                "Failed to duplicate log handle '{}': {}",
                path.display(),
                e
            ))
        })?;

        Ok((Stdio::from(file), Stdio::from(stderr)))
    }
}

impl Default for TokioProcessExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Pids 0 and 1 and anything above `pid_t::MAX` would address whole groups,
/// init or every process the user owns once cast
#[cfg(unix)]
fn signalable_pid(pid: u32) -> Result<libc::pid_t, DomainError> {
    match libc::pid_t::try_from(pid) {
        Ok(target) if target > 1 => Ok(target),
        _ => Err(DomainError::InvalidPid(pid)),
    }
}

#[async_trait]
impl ProcessExecutor for TokioProcessExecutor {
    async fn spawn(&self, config: SpawnConfig) -> Result<SpawnResult, DomainError> {
        info!(
            command = %config.command,
            args = ?config.args,
            "Spawning process"
        );

        if config.command.is_empty() {
            return Err(DomainError::InvalidCommand("Empty command".to_string()));
        }

        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args);

        if let Some(ref dir) = config.working_dir {
            debug!(working_dir = %dir.display(), "Setting working directory");
            cmd.current_dir(dir);
        }

        if !config.env_vars.is_empty() {
            debug!(count = config.env_vars.len(), "Setting environment variables");
            for (key, value) in &config.env_vars {
                cmd.env(key, value);
            }
        }

        let (stdout, stderr) = Self::configure_output(config.log_file.as_deref())?;
        cmd.stdin(Stdio::null());
        cmd.stdout(stdout);
        cmd.stderr(stderr);

        #[cfg(unix)]
        unsafe {
            cmd.pre_exec(|| {
                if libc::setsid() < 0 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(())
            });
        }

        let child = cmd.spawn().map_err(|e| {
            error!(
                command = %config.command,
                error = %e,
                "Failed to spawn process"
            );
            DomainError::InvalidCommand(format!("Failed to spawn process: {}", e))
        })?;

        let pid = child.id();
        info!(pid = pid, "Process spawned successfully");

        // Not waited on here: is_running reaps it once it exits
        drop(child);

        Ok(SpawnResult { pid })
    }

    async fn kill(&self, pid: u32, signal: i32) -> Result<(), DomainError> {
        info!(pid = pid, signal = signal, "Killing process");

        #[cfg(unix)]
        {
            let target = signalable_pid(pid)?;

            // Group only when the pid leads it, as every service spawned here does;
            // a recycled pid that merely belongs to a group gets the signal alone
            if unsafe { libc::getpgid(target) } == target {
                let group = unsafe { libc::kill(-target, signal) };
                if group == 0 {
                    debug!(pid = pid, signal = signal, "Signal sent to process group");
                    return Ok(());
                }
            }

            let result = unsafe { libc::kill(target, signal) };
            if result == 0 {
                debug!(pid = pid, signal = signal, "Signal sent successfully");
                return Ok(());
            }

            let err = std::io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::ESRCH) {
                return Err(DomainError::NotRunning(pid));
            }
            warn!(
                pid = pid,
                signal = signal,
                error = %err,
                "Failed to send signal to process"
            );
            Err(DomainError::SignalFailed {
                pid,
                signal,
                reason: err.to_string(),
            })
        }

        #[cfg(not(unix))]
        {
            Err(DomainError::Unsupported(format!(
                "sending signal {} to PID {}",
                signal, pid
            )))
        }
    }

    async fn is_running(&self, pid: u32) -> Result<bool, DomainError> {
        #[cfg(unix)]
        {
            let target = signalable_pid(pid)?;

            // Reap our own exited children so they do not linger as zombies
            let mut status: libc::c_int = 0;
            let reaped = unsafe { libc::waitpid(target, &mut status, libc::WNOHANG) };
            if reaped == target {
                debug!(pid = pid, "Reaped exited child");
                return Ok(false);
            }

            let result = unsafe { libc::kill(target, 0) };
            if result == 0 {
                return Ok(true);
            }
            let err = std::io::Error::last_os_error();
            Ok(err.raw_os_error() == Some(libc::EPERM))
        }

        #[cfg(not(unix))]
        {
            Err(DomainError::Unsupported(format!(
                "checking liveness of PID {}",
                pid
            )))
        }
    }
}
