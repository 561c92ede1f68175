//! Health status value object

/// Result of a single probe attempt, always recomputed and never persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HealthStatus {
    Up,
    Down,
    #[default]
    Unknown, // Probe could not be carried out
}

impl HealthStatus {
    pub fn is_up(self) -> bool {
        self == Self::Up
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}
