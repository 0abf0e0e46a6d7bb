// Concurrent update - fan out star fetches, collect whatever succeeds
use std::sync::Arc;

use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::{
    fetch::{FetchError, StarFetcher},
    models::Repository,
    Error, Result,
};

/// Default cap on concurrent fetches - enough to be quick, low enough to stay
/// friendly with GitHub's rate limits
pub const DEFAULT_MAX_PARALLEL: usize = 8;

/// Cooperative cancellation signal shared by everything in one update run
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

/// The sending half of [`Shutdown`]
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> (ShutdownTrigger, Shutdown) {
        let (tx, rx) = watch::channel(false);
        (ShutdownTrigger { tx }, Shutdown { rx })
    }

    /// A signal that never fires
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Shutdown { rx }
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the signal fires; pends forever if it never can
    pub async fn triggered(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|stop| *stop).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

/// What an update run produced
#[derive(Debug, Default)]
pub struct UpdateReport {
    /// Successful fetches, in completion order
    pub repositories: Vec<Repository>,
    /// Per-repository failures; these never fail the run
    pub failures: Vec<FetchError>,
    /// The shutdown signal fired before every target was fetched
    pub cancelled: bool,
    /// Targets that were never dispatched because of cancellation
    pub not_dispatched: usize,
}

impl UpdateReport {
    pub fn attempted(&self) -> usize {
        self.repositories.len() + self.failures.len()
    }
}

/// Drives bounded-parallel fetches for a list of targets
///
/// A permit is taken from the semaphore *before* a fetch task is spawned and
/// released when the task ends, so at most `max_parallel` fetches ever exist
/// at once. Results are funneled through one `JoinSet` and collected here.
pub struct UpdateOrchestrator {
    fetcher: Arc<dyn StarFetcher>,
    max_parallel: usize,
}

impl UpdateOrchestrator {
    pub fn new(fetcher: Arc<dyn StarFetcher>, max_parallel: usize) -> Result<Self> {
        if max_parallel == 0 {
            return Err(Error::ConfigError(
                "max_parallel must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            fetcher,
            max_parallel,
        })
    }

    /// Fetch every target, isolating failures.
    ///
    /// Only a broken execution mechanism (closed semaphore) is an error; an
    /// individual fetch failing, or even all of them failing, is not.
    pub async fn run(&self, targets: &[String], shutdown: &Shutdown) -> Result<UpdateReport> {
        let mut report = UpdateReport::default();
        if targets.is_empty() {
            debug!("No targets to fetch");
            return Ok(report);
        }

        info!(
            count = targets.len(),
            max_parallel = self.max_parallel,
            "Fetching star counts"
        );

        let semaphore = Arc::new(Semaphore::new(self.max_parallel));
        let mut tasks = JoinSet::new();

        for (index, name) in targets.iter().enumerate() {
            let permit = tokio::select! {
                biased;
                _ = shutdown.triggered() => {
                    report.cancelled = true;
                    report.not_dispatched = targets.len() - index;
                    break;
                }
                permit = Arc::clone(&semaphore).acquire_owned() => permit.map_err(|_| {
                    Error::Execution("fetch semaphore closed unexpectedly".to_string())
                })?,
            };

            let fetcher = Arc::clone(&self.fetcher);
            let shutdown = shutdown.clone();
            let name = name.clone();

            tasks.spawn(async move {
                let _permit = permit;
                let result = tokio::select! {
                    result = fetcher.fetch_stars(&name) => result,
                    _ = shutdown.triggered() => Err(FetchError::Cancelled { name: name.clone() }),
                };
                (name, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(repo))) => {
                    debug!(repo = repo.full_name(), stars = repo.stars(), "Fetched stars");
                    report.repositories.push(repo);
                }
                Ok((name, Err(err))) => {
                    warn!(
                        repo = %name,
                        kind = %err.kind(),
                        error = %err,
                        "Failed to fetch stars for repository"
                    );
                    report.failures.push(err);
                }
                Err(join_err) => {
                    // the task's name went down with it
                    warn!(error = %join_err, "Fetch task panicked");
                    report.failures.push(FetchError::Other {
                        name: String::from("<unknown>"),
                        message: format!("fetch task failed: {}", join_err),
                    });
                }
            }
        }

        if report.cancelled || shutdown.is_triggered() {
            report.cancelled = true;
            warn!(
                fetched = report.repositories.len(),
                not_dispatched = report.not_dispatched,
                "Update cancelled, returning partial results"
            );
        }

        info!(
            fetched = report.repositories.len(),
            failed = report.failures.len(),
            "Finished fetching star counts"
        );
        Ok(report)
    }
}
