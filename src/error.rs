use thiserror::Error;

/// Main error type for the replay environment
///
/// Only construction-time problems surface here. Per-step conditions
/// (unknown actions, ledger refusals, tape exhaustion) are recovered inside
/// the environment and reported through [`crate::rl::ActionOutcome`].
#[derive(Error, Debug)]
pub enum TapeGymError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),

    // Market data errors
    #[error("Invalid tape: {0}")]
    InvalidTape(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for TapeGymError
pub type Result<T> = std::result::Result<T, TapeGymError>;

impl TapeGymError {
    /// Collapse a list of validation problems into one misconfiguration error
    pub fn from_problems(problems: Vec<String>) -> Self {
        TapeGymError::Misconfiguration(problems.join("; "))
    }
}
