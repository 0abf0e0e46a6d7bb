// The three commands - init, update, generate - wired to their collaborators
use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};
use tracing::{info, warn};

use crate::{
    config::Config,
    export::{renderer_for, write_report},
    fetch::StarFetcher,
    models::Trend,
    store::SnapshotStore,
    trending::compute_trends,
    update::{Shutdown, UpdateOrchestrator, UpdateReport},
    Error, Result,
};

/// Starter target list written by `init`
pub const DEFAULT_TARGETS: &[&str] = &[
    "tokio-rs/tokio",
    "tokio-rs/axum",
    "serde-rs/serde",
    "clap-rs/clap",
    "dtolnay/anyhow",
    "tokio-rs/tracing",
    "BurntSushi/ripgrep",
    "rust-lang/cargo",
];

pub struct Workflow<S> {
    config: Config,
    store: S,
}

impl<S: SnapshotStore> Workflow<S> {
    pub fn new(config: Config, store: S) -> Self {
        Self { config, store }
    }

    /// Write the default target list unless one already exists.
    /// Returns whether anything was written.
    pub fn initialize(&self) -> Result<bool> {
        if self.store.targets_exist() {
            info!(
                path = %self.config.storage.repos_file.display(),
                "Target list already exists, leaving it alone"
            );
            return Ok(false);
        }

        let targets: Vec<String> = DEFAULT_TARGETS.iter().map(|s| s.to_string()).collect();
        self.store.save_targets(&targets)?;
        info!(
            path = %self.config.storage.repos_file.display(),
            count = targets.len(),
            "Created default target list"
        );
        Ok(true)
    }

    /// Fetch every target's star count and save it as `today`'s snapshot.
    ///
    /// Nothing is saved when no fetch succeeded or when the run was cancelled;
    /// the report says which.
    pub async fn update(
        &self,
        fetcher: Arc<dyn StarFetcher>,
        shutdown: &Shutdown,
        today: NaiveDate,
    ) -> Result<UpdateReport> {
        let targets = self.store.load_targets()?;

        let orchestrator = UpdateOrchestrator::new(fetcher, self.config.update.max_parallel)?;
        let report = orchestrator.run(&targets, shutdown).await?;

        if report.cancelled {
            warn!(
                fetched = report.repositories.len(),
                "Update cancelled, snapshot not saved"
            );
            return Ok(report);
        }

        if report.repositories.is_empty() {
            warn!("No repository data was successfully updated");
            return Ok(report);
        }

        self.store.save_snapshot(today, &report.repositories)?;
        info!(
            date = %today,
            count = report.repositories.len(),
            failed = report.failures.len(),
            "Saved snapshot"
        );
        Ok(report)
    }

    /// Compare `today` against the snapshot one period back, rank, render
    /// and write the dashboard. Returns the ranked trends.
    pub fn generate(&self, today: NaiveDate, generated_at: DateTime<Utc>) -> Result<Vec<Trend>> {
        let trends = self.compute(today)?;

        let report = &self.config.report;
        let content = renderer_for(report.format, &report.title, generated_at).render(&trends)?;
        write_report(&report.output_path, &content)?;

        info!(
            path = %report.output_path.display(),
            format = %report.format,
            count = trends.len(),
            "Generated trend dashboard"
        );
        Ok(trends)
    }

    /// The ranking half of [`Workflow::generate`], without touching the output file
    pub fn compute(&self, today: NaiveDate) -> Result<Vec<Trend>> {
        let period = self.config.report.period;
        let lookback = period.lookback_days();
        let baseline_date = today
            .checked_sub_days(Days::new(lookback))
            .ok_or_else(|| {
                Error::ConfigError(format!("no date {} days before {}", lookback, today))
            })?;

        let current = self.store.load_snapshot(today).map_err(|e| {
            if e.is_not_found() {
                warn!(date = %today, "No snapshot for this date, run `update` first");
            }
            e
        })?;

        let baseline = match self.store.load_snapshot(baseline_date) {
            Ok(repos) => repos,
            Err(e) if e.is_not_found() => {
                warn!(
                    date = %baseline_date,
                    "No baseline snapshot, trends are computed against 0"
                );
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        Ok(compute_trends(&current, &baseline, period))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchError, MockStarFetcher};
    use crate::models::Repository;
    use crate::store::MockSnapshotStore;
    use trendboard_store::StoreError;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn not_found() -> Error {
        Error::Store(StoreError::NotFound {
            path: "missing.json".into(),
        })
    }

    #[test]
    fn test_initialize_skips_existing_list() {
        let mut store = MockSnapshotStore::new();
        store.expect_targets_exist().return_const(true);
        store.expect_save_targets().never();

        let workflow = Workflow::new(Config::default(), store);
        assert!(!workflow.initialize().unwrap());
    }

    #[test]
    fn test_initialize_writes_defaults() {
        let mut store = MockSnapshotStore::new();
        store.expect_targets_exist().return_const(false);
        store
            .expect_save_targets()
            .withf(|targets| {
                targets.len() == DEFAULT_TARGETS.len() && targets[0] == "tokio-rs/tokio"
            })
            .times(1)
            .returning(|_| Ok(()));

        let workflow = Workflow::new(Config::default(), store);
        assert!(workflow.initialize().unwrap());
    }

    #[tokio::test]
    async fn test_update_without_targets_is_fatal() {
        let mut store = MockSnapshotStore::new();
        store.expect_load_targets().returning(|| Err(not_found()));
        store.expect_save_snapshot().never();

        let mut fetcher = MockStarFetcher::new();
        fetcher.expect_fetch_stars().never();

        let workflow = Workflow::new(Config::default(), store);
        let err = workflow
            .update(Arc::new(fetcher), &Shutdown::never(), day(2024, 1, 1))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_saves_successes_only() {
        let mut store = MockSnapshotStore::new();
        store
            .expect_load_targets()
            .returning(|| Ok(vec!["o/a".to_string(), "o/b".to_string()]));
        store
            .expect_save_snapshot()
            .withf(|date, repos| {
                *date == NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    && repos.len() == 1
                    && repos[0].full_name() == "o/a"
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let mut fetcher = MockStarFetcher::new();
        fetcher.expect_fetch_stars().returning(|name| match name {
            "o/a" => Ok(Repository::new(name, 3).unwrap()),
            _ => Err(FetchError::Other {
                name: name.to_string(),
                message: "boom".to_string(),
            }),
        });

        let workflow = Workflow::new(Config::default(), store);
        let report = workflow
            .update(Arc::new(fetcher), &Shutdown::never(), day(2024, 1, 1))
            .await
            .unwrap();
        assert_eq!(report.repositories.len(), 1);
        assert_eq!(report.failures.len(), 1);
    }

    #[tokio::test]
    async fn test_update_with_nothing_fetched_saves_nothing() {
        let mut store = MockSnapshotStore::new();
        store
            .expect_load_targets()
            .returning(|| Ok(vec!["o/a".to_string()]));
        store.expect_save_snapshot().never();

        let mut fetcher = MockStarFetcher::new();
        fetcher.expect_fetch_stars().returning(|name| {
            Err(FetchError::NotFound {
                name: name.to_string(),
            })
        });

        let workflow = Workflow::new(Config::default(), store);
        let report = workflow
            .update(Arc::new(fetcher), &Shutdown::never(), day(2024, 1, 1))
            .await
            .unwrap();
        assert!(report.repositories.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_update_is_not_saved() {
        let mut store = MockSnapshotStore::new();
        store
            .expect_load_targets()
            .returning(|| Ok(vec!["o/a".to_string()]));
        store.expect_save_snapshot().never();

        let mut fetcher = MockStarFetcher::new();
        fetcher.expect_fetch_stars().never();

        let (trigger, shutdown) = Shutdown::new();
        trigger.trigger();

        let workflow = Workflow::new(Config::default(), store);
        let report = workflow
            .update(Arc::new(fetcher), &shutdown, day(2024, 1, 1))
            .await
            .unwrap();
        assert!(report.cancelled);
    }

    #[test]
    fn test_compute_uses_period_lookback() {
        let mut config = Config::default();
        config.report.period = crate::models::TrendPeriod::Monthly;

        let mut store = MockSnapshotStore::new();
        store
            .expect_load_snapshot()
            .withf(|date| *date == NaiveDate::from_ymd_opt(2024, 3, 31).unwrap())
            .returning(|_| Ok(vec![Repository::new("o/a", 50).unwrap()]));
        store
            .expect_load_snapshot()
            .withf(|date| *date == NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
            .returning(|_| Ok(vec![Repository::new("o/a", 20).unwrap()]));

        let workflow = Workflow::new(config, store);
        let trends = workflow.compute(day(2024, 3, 31)).unwrap();
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].diff(), 30);
    }

    #[test]
    fn test_compute_missing_current_is_fatal() {
        let mut store = MockSnapshotStore::new();
        store.expect_load_snapshot().returning(|_| Err(not_found()));

        let workflow = Workflow::new(Config::default(), store);
        assert!(workflow.compute(day(2024, 1, 8)).unwrap_err().is_not_found());
    }

    #[test]
    fn test_compute_broken_baseline_propagates() {
        let mut store = MockSnapshotStore::new();
        store
            .expect_load_snapshot()
            .withf(|date| *date == NaiveDate::from_ymd_opt(2024, 1, 8).unwrap())
            .returning(|_| Ok(vec![Repository::new("o/a", 1).unwrap()]));
        store.expect_load_snapshot().returning(|_| {
            Err(Error::Store(StoreError::Io {
                path: "data/2024-01-01.json".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            }))
        });

        let workflow = Workflow::new(Config::default(), store);
        let err = workflow.compute(day(2024, 1, 8)).unwrap_err();
        assert!(!err.is_not_found());
        assert!(matches!(err, Error::Store(StoreError::Io { .. })));
    }
}
