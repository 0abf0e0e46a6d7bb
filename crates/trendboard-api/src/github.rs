use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Public github.com REST endpoint
pub const GITHUB_API_BASE: &str = "https://api.github.com";

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("API rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Repository not found: {0}")]
    NotFound(String),

    #[error("Authentication failed: {0}")]
    AuthRequired(String),

    #[error("API request failed with status {status}: {body}")]
    RequestFailed { status: StatusCode, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GitHubError>;

/// The slice of GitHub's repository payload we actually care about
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepo {
    pub full_name: String,
    pub stargazers_count: i64,
}

pub struct GitHubClient {
    client: reqwest::Client,
    token: Option<String>,
    base_url: String,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Result<Self> {
        Self::with_base_url(token, GITHUB_API_BASE.to_string())
    }

    /// For GitHub Enterprise, or a local server in tests
    pub fn with_base_url(token: Option<String>, base_url: String) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("trendboard/0.1.0"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch a single repository. No retries here; callers decide what a
    /// failure means for them.
    pub async fn get_repository(&self, owner: &str, name: &str) -> Result<GitHubRepo> {
        let url = format!("{}/repos/{}/{}", self.base_url, owner, name);
        debug!("GET {}", url);

        let mut request = self.client.get(&url);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let remaining = response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(
                status,
                remaining.as_deref(),
                &format!("{}/{}", owner, name),
                body,
            ));
        }

        let body = response.text().await?;
        let repo: GitHubRepo = serde_json::from_str(&body)?;
        Ok(repo)
    }
}

/// Map a non-success response onto our error taxonomy.
///
/// GitHub signals primary rate limits with 403 + `x-ratelimit-remaining: 0`,
/// secondary limits with 403/429 and a message mentioning the rate limit.
pub fn classify_failure(
    status: StatusCode,
    rate_limit_remaining: Option<&str>,
    repo: &str,
    body: String,
) -> GitHubError {
    let mentions_rate_limit = body.to_lowercase().contains("rate limit");

    match status {
        StatusCode::TOO_MANY_REQUESTS => GitHubError::RateLimited(repo.to_string()),
        StatusCode::FORBIDDEN
            if rate_limit_remaining.map(str::trim) == Some("0") || mentions_rate_limit =>
        {
            GitHubError::RateLimited(repo.to_string())
        }
        StatusCode::NOT_FOUND => GitHubError::NotFound(repo.to_string()),
        StatusCode::UNAUTHORIZED => GitHubError::AuthRequired(repo.to_string()),
        _ => GitHubError::RequestFailed { status, body },
    }
}
