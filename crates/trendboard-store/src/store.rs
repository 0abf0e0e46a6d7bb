use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// File-backed store
///
/// Layout on disk:
/// - `<data_dir>/<YYYY-MM-DD>.json` - one snapshot per UTC day
/// - `<targets_path>` - flat JSON array of `owner/name` strings
#[derive(Debug, Clone)]
pub struct JsonStore {
    targets_path: PathBuf,
    data_dir: PathBuf,
}

impl JsonStore {
    pub fn new(targets_path: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            targets_path: targets_path.into(),
            data_dir: data_dir.into(),
        }
    }

    pub fn targets_path(&self) -> &Path {
        &self.targets_path
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the snapshot file for a given day
    pub fn snapshot_path(&self, date: NaiveDate) -> PathBuf {
        self.data_dir
            .join(format!("{}.json", date.format("%Y-%m-%d")))
    }

    pub fn targets_exist(&self) -> bool {
        self.targets_path.exists()
    }

    pub fn load_targets(&self) -> Result<Vec<String>> {
        let targets: Vec<String> = read_json(&self.targets_path)?;
        info!(path = %self.targets_path.display(), count = targets.len(), "Loaded target repos");
        Ok(targets)
    }

    pub fn save_targets(&self, targets: &[String]) -> Result<()> {
        write_json(&self.targets_path, &targets)?;
        info!(path = %self.targets_path.display(), count = targets.len(), "Saved target repos");
        Ok(())
    }

    pub fn load_snapshot<T: DeserializeOwned>(&self, date: NaiveDate) -> Result<Vec<T>> {
        let path = self.snapshot_path(date);
        let items: Vec<T> = read_json(&path)?;
        debug!(path = %path.display(), count = items.len(), "Loaded snapshot");
        Ok(items)
    }

    pub fn save_snapshot<T: Serialize>(&self, date: NaiveDate, items: &[T]) -> Result<()> {
        let path = self.snapshot_path(date);
        write_json(&path, &items)?;
        info!(path = %path.display(), count = items.len(), "Saved snapshot");
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "File not found");
            return Err(StoreError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&contents).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut contents = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    contents.push('\n');

    std::fs::write(path, contents).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
