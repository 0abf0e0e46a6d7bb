use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{export::ReportFormat, models::TrendPeriod, update::DEFAULT_MAX_PARALLEL};

/// Prefix for environment overrides, e.g. `TRENDBOARD_UPDATE__MAX_PARALLEL=4`
pub const ENV_PREFIX: &str = "TRENDBOARD";

/// Main configuration structure
///
/// Built once at startup and handed down; nothing below `main` reads the
/// environment. Priority: CLI > Env > File > Defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub github: GitHubConfig,
    pub storage: StorageConfig,
    pub update: UpdateConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config from `path` (or the default location), then apply
    /// `TRENDBOARD_*` environment overrides.
    ///
    /// An explicitly given file must exist; the default one is optional.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let (file, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path()?, false),
        };

        let mut config: Config = ::config::Config::builder()
            .add_source(
                ::config::File::new(&file.to_string_lossy(), ::config::FileFormat::Toml)
                    .required(required),
            )
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        // the conventional variable, if nothing more specific was set
        if config.github.token.is_none() {
            config.github.token = std::env::var("GITHUB_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty());
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse config from a TOML string, no environment involved
    pub fn from_toml(contents: &str) -> crate::Result<Self> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to disk. The token is never written.
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.update.max_parallel == 0 {
            return Err(crate::Error::ConfigError(
                "update.max_parallel must be at least 1".into(),
            ));
        }
        if self.report.title.trim().is_empty() {
            return Err(crate::Error::ConfigError(
                "report.title must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// `<config dir>/trendboard/config.toml`
    pub fn default_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?
            .join("trendboard");

        Ok(config_dir.join("config.toml"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GitHub personal access token; falls back to `GITHUB_TOKEN`
    #[serde(skip_serializing)]
    pub token: Option<String>,

    /// API URL (for GitHub Enterprise)
    pub api_url: String,
}

fn default_github_url() -> String {
    trendboard_api::GITHUB_API_BASE.to_string()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_github_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON array of `owner/name` strings to track
    pub repos_file: PathBuf,

    /// One `<YYYY-MM-DD>.json` snapshot per day lands here
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            repos_file: PathBuf::from("repos.json"),
            data_dir: PathBuf::from("data"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    /// Hard cap on concurrent GitHub requests
    pub max_parallel: usize,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            max_parallel: DEFAULT_MAX_PARALLEL,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_path: PathBuf,
    pub format: ReportFormat,
    pub period: TrendPeriod,
    pub title: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("dashboard.md"),
            format: ReportFormat::Md,
            period: TrendPeriod::Weekly,
            title: "OSS Star Trends".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Any `EnvFilter` directive; `RUST_LOG` still wins
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}
