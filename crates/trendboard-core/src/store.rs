use chrono::NaiveDate;
use trendboard_store::JsonStore;

use crate::{models::Repository, Result};

/// Persistence seam for target lists and dated snapshots
///
/// `load_*` return a store NotFound error (see [`crate::Error::is_not_found`])
/// when nothing has been saved yet, so callers can tell "missing" apart from
/// "broken".
#[cfg_attr(test, mockall::automock)]
pub trait SnapshotStore: Send + Sync {
    fn targets_exist(&self) -> bool;
    fn load_targets(&self) -> Result<Vec<String>>;
    fn save_targets(&self, targets: &[String]) -> Result<()>;
    fn load_snapshot(&self, date: NaiveDate) -> Result<Vec<Repository>>;
    fn save_snapshot(&self, date: NaiveDate, repos: &[Repository]) -> Result<()>;
}

impl SnapshotStore for JsonStore {
    fn targets_exist(&self) -> bool {
        JsonStore::targets_exist(self)
    }

    fn load_targets(&self) -> Result<Vec<String>> {
        Ok(JsonStore::load_targets(self)?)
    }

    fn save_targets(&self, targets: &[String]) -> Result<()> {
        Ok(JsonStore::save_targets(self, targets)?)
    }

    fn load_snapshot(&self, date: NaiveDate) -> Result<Vec<Repository>> {
        Ok(JsonStore::load_snapshot(self, date)?)
    }

    fn save_snapshot(&self, date: NaiveDate, repos: &[Repository]) -> Result<()> {
        Ok(JsonStore::save_snapshot(self, date, repos)?)
    }
}
