//! Service specification value objects
//! Immutable description of a managed service and of the external dependency

use crate::constants::{paths, services};
use crate::domain::DomainError;
use std::fmt;
use std::path::{Path, PathBuf};

/// How a service process is launched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

impl LaunchCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// A managed service
///
/// Built once at configuration time and never mutated. The order of a
/// `&[ServiceSpec]` slice is the start order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSpec {
    name: String,
    command: LaunchCommand,
    host: String,
    listen_port: u16,
    health_path: String,
    log_path: PathBuf,
    pid_file_path: PathBuf,
    match_signature: String,
}

impl ServiceSpec {
    pub fn builder(name: impl Into<String>, command: LaunchCommand) -> ServiceSpecBuilder {
        ServiceSpecBuilder::new(name.into(), command)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn command(&self) -> &LaunchCommand {
        &self.command
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn listen_port(&self) -> u16 {
        self.listen_port
    }

    pub fn health_path(&self) -> &str {
        &self.health_path
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn pid_file_path(&self) -> &Path {
        &self.pid_file_path
    }

    /// Command-line substring identifying this service's processes
    pub fn match_signature(&self) -> &str {
        &self.match_signature
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.listen_port)
    }

    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    pub fn health_url(&self) -> String {
        self.endpoint_url(&self.health_path)
    }
}

/// Builder for [`ServiceSpec`]
///
/// Log and PID paths default to `<name>.log` / `<name>.pid` in the current
/// directory; the match signature defaults to the last launch argument (the
/// script name for interpreted services) or the program itself.
#[derive(Debug)]
pub struct ServiceSpecBuilder {
    name: String,
    command: LaunchCommand,
    host: String,
    listen_port: Option<u16>,
    health_path: String,
    log_path: Option<PathBuf>,
    pid_file_path: Option<PathBuf>,
    match_signature: Option<String>,
}

impl ServiceSpecBuilder {
    fn new(name: String, command: LaunchCommand) -> Self {
        Self {
            name,
            command,
            host: services::DEFAULT_HOST.to_string(),
            listen_port: None,
            health_path: services::DEFAULT_HEALTH_PATH.to_string(),
            log_path: None,
            pid_file_path: None,
            match_signature: None,
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.listen_port = Some(port);
        self
    }

    pub fn health_path(mut self, path: impl Into<String>) -> Self {
        self.health_path = path.into();
        self
    }

    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    pub fn pid_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.pid_file_path = Some(path.into());
        self
    }

    pub fn match_signature(mut self, signature: impl Into<String>) -> Self {
        self.match_signature = Some(signature.into());
        self
    }

    pub fn build(self) -> Result<ServiceSpec, DomainError> {
        validate_name(&self.name)?;

        if self.command.program.trim().is_empty() {
            return Err(DomainError::InvalidSpec(format!(
                "service '{}' has an empty command",
                self.name
            )));
        }

        let listen_port = match self.listen_port {
            Some(0) | None => {
                return Err(DomainError::InvalidSpec(format!(
                    "service '{}' needs a non-zero listen port",
                    self.name
                )))
            }
            Some(port) => port,
        };

        if !self.health_path.starts_with('/') {
            return Err(DomainError::InvalidSpec(format!(
                "health path '{}' must start with '/'",
                self.health_path
            )));
        }

        let match_signature = self
            .match_signature
            .or_else(|| self.command.args.last().cloned())
            .unwrap_or_else(|| self.command.program.clone());
        if match_signature.trim().is_empty() {
            return Err(DomainError::InvalidSpec(format!(
                "service '{}' has an empty match signature",
                self.name
            )));
        }

        let log_path = self.log_path.unwrap_or_else(|| {
            PathBuf::from(format!("{}.{}", self.name, paths::LOG_FILE_EXTENSION))
        });
        let pid_file_path = self.pid_file_path.unwrap_or_else(|| {
            PathBuf::from(format!("{}.{}", self.name, paths::PID_FILE_EXTENSION))
        });

        Ok(ServiceSpec {
            name: self.name,
            command: self.command,
            host: self.host,
            listen_port,
            health_path: self.health_path,
            log_path,
            pid_file_path,
            match_signature,
        })
    }
}

/// Service names end up in file names and log fields
fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.is_empty() {
        return Err(DomainError::InvalidSpec("service name is empty".to_string()));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(DomainError::InvalidSpec(format!(
            "service name '{}' may only contain letters, digits, '-' and '_'",
            name
        )));
    }
    Ok(())
}

/// External dependency probed before anything is spawned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    pub name: String,
    pub url: String,
}

impl DependencySpec {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}
