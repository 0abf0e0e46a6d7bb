use thiserror::Error;

use crate::models::ValidationError;

/// All the ways a trendboard command can go wrong
///
/// Per-repository fetch failures are deliberately not in here: they live in
/// [`crate::fetch::FetchError`] and never escape the update orchestrator.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Store(#[from] trendboard_store::StoreError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Task execution failed: {0}")]
    Execution(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// True when a snapshot or target list simply doesn't exist yet
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Store(e) if e.is_not_found())
    }
}

impl From<::config::ConfigError> for Error {
    fn from(e: ::config::ConfigError) -> Self {
        Error::ConfigError(e.to_string())
    }
}

impl From<askama::Error> for Error {
    fn from(e: askama::Error) -> Self {
        Error::RenderError(e.to_string())
    }
}
