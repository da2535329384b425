// File: src/error.rs
use crate::core::types::DietProfile;
use thiserror::Error;

/// Failure of a single generation call.
#[derive(Debug, Error)]
pub enum MenuError {
    /// A category cannot supply enough dishes for its stations under this profile.
    /// Retrying never helps, so no sampling attempt is made.
    #[error("infeasible profile {profile}: category '{category}' has {eligible} eligible dishes, needs {required}")]
    InfeasibleProfile {
        profile: DietProfile,
        category: String,
        eligible: usize,
        required: usize,
    },
    #[error("search budget exhausted for profile {profile} after {attempts} attempts")]
    BudgetExhausted { profile: DietProfile, attempts: usize },
    #[error("persistence failure: {0}")]
    Persistence(#[from] PersistenceError),
}

impl MenuError {
    /// True for the outcomes a caller renders as "no combination available".
    /// Persistence failures are hard errors and return false.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            MenuError::InfeasibleProfile { .. } | MenuError::BudgetExhausted { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ledger encoding error: {0}")]
    Encode(#[from] bincode::Error),
    #[error("log record error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not commit {path}: {source}")]
    Commit {
        path: String,
        #[source]
        source: tempfile::PersistError,
    },
    #[error("unsupported ledger version {0}")]
    Version(u32),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
    #[error("diet rules give no accepted tags for profile {0}")]
    MissingDietRule(DietProfile),
    #[error("invalid value for {var}: '{value}'")]
    Env { var: &'static str, value: String },
}

/// Failure while loading configuration or durable state at startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not load stored state: {0}")]
    Persistence(#[from] PersistenceError),
}
