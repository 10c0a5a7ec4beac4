use serde::Serialize;
use thiserror::Error;

use crate::StrategyKind;

/// A selected route's parameters are structurally invalid.
///
/// This is never a fault that aborts the caller: the selector reports it and
/// the dispatch call ends with no route selected.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    /// The offending conditions field.
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Route table construction failures. Fatal at process start: the bot must
/// refuse to run with an ambiguous table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTableError {
    #[error("duplicate route for strategy '{0}'")]
    DuplicateStrategy(StrategyKind),

    #[error("routes must be declared in non-increasing priority order")]
    UnsortedPriorities,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Route table error: {0}")]
    RouteTable(#[from] RouteTableError),

    #[error("Execution backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
