// Fetch capability implementations
pub mod github;

pub use github::GitHubFetcher;
