// Core business logic lives here - the brain of the operation
pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod models;
pub mod providers;
pub mod store;
pub mod trending;
pub mod update;
pub mod workflow;

pub use config::Config;
pub use error::Error;
pub use export::{renderer_for, HtmlRenderer, MarkdownRenderer, Renderer, ReportFormat};
pub use fetch::{FetchError, FetchErrorKind, StarFetcher};
pub use models::{Repository, Trend, TrendPeriod, ValidationError};
pub use providers::GitHubFetcher;
pub use store::SnapshotStore;
pub use trending::{compute_trends, rank_trends};
pub use update::{Shutdown, ShutdownTrigger, UpdateOrchestrator, UpdateReport};
pub use workflow::Workflow;

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
