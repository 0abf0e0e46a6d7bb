// GitHub provider - bridges the API client with the StarFetcher trait
use async_trait::async_trait;
use trendboard_api::{GitHubClient, GitHubError, GitHubRepo, GITHUB_API_BASE};
use tracing::debug;

use crate::{
    config::GitHubConfig,
    fetch::{FetchError, StarFetcher},
    models::{split_full_name, Repository, ValidationError},
    Error, Result,
};

/// Wrapper around GitHubClient that implements StarFetcher
pub struct GitHubFetcher {
    client: GitHubClient,
}

impl GitHubFetcher {
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let token = config.token.clone();
        let client = if config.api_url.trim_end_matches('/') == GITHUB_API_BASE {
            GitHubClient::new(token)
        } else {
            debug!(api_url = %config.api_url, "Using custom GitHub API endpoint");
            GitHubClient::with_base_url(token, config.api_url.clone())
        }
        .map_err(|e| Error::ConfigError(format!("Failed to build GitHub client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn api_url(&self) -> &str {
        self.client.base_url()
    }

    pub fn from_client(client: GitHubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StarFetcher for GitHubFetcher {
    async fn fetch_stars(&self, full_name: &str) -> std::result::Result<Repository, FetchError> {
        // bad names never reach the network
        let (owner, name) = split_full_name(full_name).ok_or_else(|| FetchError::InvalidName {
            name: full_name.to_string(),
            source: ValidationError::InvalidFullName(full_name.to_string()),
        })?;

        debug!(repo = full_name, "Fetching stars");
        let gh = self
            .client
            .get_repository(owner, name)
            .await
            .map_err(|e| api_to_fetch_error(full_name, e))?;

        github_to_repo(full_name, gh)
    }
}

/// We key on the name we were asked for, not GitHub's canonical one, so a
/// renamed repository still lines up with its history.
fn github_to_repo(full_name: &str, gh: GitHubRepo) -> std::result::Result<Repository, FetchError> {
    Repository::new(full_name, gh.stargazers_count).map_err(|source| FetchError::InvalidName {
        name: full_name.to_string(),
        source,
    })
}

fn api_to_fetch_error(full_name: &str, err: GitHubError) -> FetchError {
    let name = full_name.to_string();
    match err {
        GitHubError::RateLimited(message) => FetchError::RateLimited { name, message },
        GitHubError::NotFound(_) => FetchError::NotFound { name },
        other => FetchError::Other {
            name,
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchErrorKind;

    fn gh(full_name: &str, stars: i64) -> GitHubRepo {
        GitHubRepo {
            full_name: full_name.to_string(),
            stargazers_count: stars,
        }
    }

    #[test]
    fn test_requested_name_is_kept() {
        let repo = github_to_repo("old-owner/repo", gh("new-owner/repo", 12)).unwrap();
        assert_eq!(repo.full_name(), "old-owner/repo");
        assert_eq!(repo.stars(), 12);
    }

    #[test]
    fn test_new_picks_endpoint_from_config() {
        let fetcher = GitHubFetcher::new(&GitHubConfig::default()).unwrap();
        assert_eq!(fetcher.api_url(), GITHUB_API_BASE);

        let config = GitHubConfig {
            token: Some("t".to_string()),
            api_url: "https://ghe.example.com/api/v3/".to_string(),
        };
        let fetcher = GitHubFetcher::new(&config).unwrap();
        assert_eq!(fetcher.api_url(), "https://ghe.example.com/api/v3");
    }

    #[test]
    fn test_error_classification() {
        let err = api_to_fetch_error("o/r", GitHubError::RateLimited("o/r".into()));
        assert_eq!(err.kind(), FetchErrorKind::RateLimited);

        let err = api_to_fetch_error("o/r", GitHubError::NotFound("o/r".into()));
        assert_eq!(err.kind(), FetchErrorKind::NotFound);

        let err = api_to_fetch_error("o/r", GitHubError::AuthRequired("o/r".into()));
        assert_eq!(err.kind(), FetchErrorKind::Other);
        assert_eq!(err.name(), "o/r");
    }

    #[tokio::test]
    async fn test_invalid_name_skips_network() {
        // nothing listens here; a request would fail with a network error instead
        let client =
            GitHubClient::with_base_url(None, "http://127.0.0.1:9".to_string()).unwrap();
        let fetcher = GitHubFetcher::from_client(client);

        let err = fetcher.fetch_stars("invalid-repo-name").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidName { .. }));
        assert!(err.to_string().contains("invalid repository full name format"));
    }
}
