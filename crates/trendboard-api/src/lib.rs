// GitHub API client - the only place that talks HTTP
pub mod github;

// Re-export common types
pub use github::{GitHubClient, GitHubError, GitHubRepo, GITHUB_API_BASE};
