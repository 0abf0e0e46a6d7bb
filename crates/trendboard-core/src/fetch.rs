use crate::models::{Repository, ValidationError};
use std::fmt;
use thiserror::Error;

/// Coarse classification of a failed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    RateLimited,
    NotFound,
    Cancelled,
    Other,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FetchErrorKind::RateLimited => "rate limited",
            FetchErrorKind::NotFound => "not found",
            FetchErrorKind::Cancelled => "cancelled",
            FetchErrorKind::Other => "other",
        };
        f.write_str(label)
    }
}

/// A single repository could not be fetched
///
/// These are per-item: the orchestrator logs and records them, and they never
/// fail a whole update.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("rate limit exceeded while fetching repository '{name}'")]
    RateLimited { name: String, message: String },

    #[error("repository '{name}' not found")]
    NotFound { name: String },

    #[error("cannot fetch '{name}': {source}")]
    InvalidName {
        name: String,
        #[source]
        source: ValidationError,
    },

    #[error("fetch of '{name}' was cancelled")]
    Cancelled { name: String },

    #[error("failed to fetch repository '{name}': {message}")]
    Other { name: String, message: String },
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::RateLimited { .. } => FetchErrorKind::RateLimited,
            FetchError::NotFound { .. } => FetchErrorKind::NotFound,
            FetchError::Cancelled { .. } => FetchErrorKind::Cancelled,
            FetchError::InvalidName { .. } | FetchError::Other { .. } => FetchErrorKind::Other,
        }
    }

    /// The target name this failure belongs to
    pub fn name(&self) -> &str {
        match self {
            FetchError::RateLimited { name, .. }
            | FetchError::NotFound { name }
            | FetchError::InvalidName { name, .. }
            | FetchError::Cancelled { name }
            | FetchError::Other { name, .. } => name,
        }
    }
}

/// Anything that can tell us how many stars a repository has right now
///
/// Implementations must be safe to call concurrently with distinct names.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait StarFetcher: Send + Sync {
    async fn fetch_stars(&self, full_name: &str) -> Result<Repository, FetchError>;
}
