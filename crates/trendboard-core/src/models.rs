use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Why a repository value could not be built
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid repository full name format: {0}")]
    InvalidFullName(String),

    #[error("stars count cannot be negative: {0}")]
    NegativeStars(i64),
}

/// A tracked GitHub repository and its star count at one point in time
///
/// The only way to get one is through [`Repository::new`] (deserialization
/// goes through it too), so an `owner/name` identity and a non-negative star
/// count are guaranteed everywhere downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RepositoryRecord", into = "RepositoryRecord")]
pub struct Repository {
    full_name: String,
    stars: u64,
}

impl Repository {
    pub fn new(full_name: impl Into<String>, stars: i64) -> Result<Self, ValidationError> {
        let full_name = full_name.into();

        if split_full_name(&full_name).is_none() {
            return Err(ValidationError::InvalidFullName(full_name));
        }
        if stars < 0 {
            return Err(ValidationError::NegativeStars(stars));
        }

        Ok(Self {
            full_name,
            stars: stars as u64,
        })
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn stars(&self) -> u64 {
        self.stars
    }

    pub fn owner(&self) -> &str {
        self.parts().0
    }

    pub fn name(&self) -> &str {
        self.parts().1
    }

    pub fn url(&self) -> String {
        format!("https://github.com/{}", self.full_name)
    }

    fn parts(&self) -> (&str, &str) {
        // validated in new()
        self.full_name
            .split_once('/')
            .unwrap_or((self.full_name.as_str(), ""))
    }
}

/// Split `owner/name` into its halves, `None` unless both are non-empty and
/// there is exactly one slash
pub fn split_full_name(full_name: &str) -> Option<(&str, &str)> {
    let (owner, name) = full_name.split_once('/')?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }
    Some((owner, name))
}

/// On-disk shape of a snapshot entry
///
/// Older data files used `FullName`/`Stars` keys, so those are accepted too.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RepositoryRecord {
    #[serde(alias = "FullName")]
    full_name: String,
    #[serde(alias = "Stars")]
    stars: i64,
}

impl TryFrom<RepositoryRecord> for Repository {
    type Error = ValidationError;

    fn try_from(record: RepositoryRecord) -> Result<Self, Self::Error> {
        Repository::new(record.full_name, record.stars)
    }
}

impl From<Repository> for RepositoryRecord {
    fn from(repo: Repository) -> Self {
        Self {
            full_name: repo.full_name,
            stars: i64::try_from(repo.stars).unwrap_or(i64::MAX),
        }
    }
}

/// Which window a trend covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendPeriod {
    Daily,
    #[default]
    Weekly,
    Monthly,
}

impl TrendPeriod {
    /// How far back the baseline snapshot sits
    pub fn lookback_days(&self) -> u64 {
        match self {
            TrendPeriod::Daily => 1,
            TrendPeriod::Weekly => 7,
            TrendPeriod::Monthly => 30,
        }
    }

    /// Short window label used in report column headers
    pub fn window_label(&self) -> &'static str {
        match self {
            TrendPeriod::Daily => "24h",
            TrendPeriod::Weekly => "7d",
            TrendPeriod::Monthly => "30d",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TrendPeriod::Daily => "Daily",
            TrendPeriod::Weekly => "Weekly",
            TrendPeriod::Monthly => "Monthly",
        }
    }
}

impl fmt::Display for TrendPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for TrendPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" | "day" => Ok(TrendPeriod::Daily),
            "weekly" | "week" => Ok(TrendPeriod::Weekly),
            "monthly" | "month" => Ok(TrendPeriod::Monthly),
            other => Err(format!(
                "unknown trend period '{}', expected daily, weekly or monthly",
                other
            )),
        }
    }
}

/// Star movement of one repository over a period
///
/// Built by [`crate::trending::compute_trends`]; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trend {
    repository: Repository,
    diff: i64,
    period: TrendPeriod,
}

impl Trend {
    pub fn new(repository: Repository, diff: i64, period: TrendPeriod) -> Self {
        Self {
            repository,
            diff,
            period,
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn diff(&self) -> i64 {
        self.diff
    }

    pub fn period(&self) -> TrendPeriod {
        self.period
    }
}
