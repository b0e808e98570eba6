use std::sync::Arc;

use niagara_progress::ProgressReporter;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::backoff::AdaptiveBackoff;
use crate::config::DownloadConfig;
use crate::error::Result;
use crate::fetch::{FetchError, PointFetcher, PointRequest};
use crate::stats::{DownloadStats, ItemOutcome};
use crate::ui::{BatchFinished, BatchObserver, BatchStarted, ItemFinished};

/// Errors listed one by one in the log before switching to a count
const MAX_LOGGED_ERRORS: usize = 10;

/// Runs a fetcher over a list of points with bounded concurrency and keeps
/// the console progress line current as results come back.
pub struct BatchRunner {
    fetcher: Arc<dyn PointFetcher>,
    config: DownloadConfig,
    district: Option<String>,
    observers: Vec<Arc<dyn BatchObserver>>,
    backoff: Arc<AdaptiveBackoff>,
}

impl std::fmt::Debug for BatchRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchRunner")
            .field("config", &self.config)
            .field("district", &self.district)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl BatchRunner {
    pub fn new(fetcher: Arc<dyn PointFetcher>, config: DownloadConfig) -> Self {
        Self {
            fetcher,
            config,
            district: None,
            observers: Vec::new(),
            backoff: Arc::new(AdaptiveBackoff::new()),
        }
    }

    /// Name of the district being pulled, used in logs and events
    pub fn with_district<S: Into<String>>(mut self, district: S) -> Self {
        self.district = Some(district.into());
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn BatchObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Current pause multiplier of the adaptive backoff
    pub fn backoff_multiplier(&self) -> f64 {
        self.backoff.multiplier()
    }

    /// Run the batch with a progress line on stdout
    pub async fn run(&self, items: Vec<PointRequest>) -> Result<DownloadStats> {
        let reporter = ProgressReporter::new(self.config.progress.clone());
        self.run_with_reporter(items, &reporter).await
    }

    /// Run the batch, drawing progress through `reporter`.
    ///
    /// The reporter must be fresh; it is begun and finished here. An empty
    /// batch returns zeroed stats without drawing anything.
    pub async fn run_with_reporter(
        &self,
        items: Vec<PointRequest>,
        reporter: &ProgressReporter,
    ) -> Result<DownloadStats> {
        let total = items.len() as u64;
        let mut stats = DownloadStats::new(total);
        if items.is_empty() {
            stats.finish();
            return Ok(stats);
        }

        tracing::info!(
            district = self.district.as_deref().unwrap_or("-"),
            "downloading {} points with {} workers",
            total,
            self.config.max_workers
        );
        reporter.begin(total)?;
        self.notify(|o| {
            o.on_batch_started(&BatchStarted {
                district: self.district.clone(),
                total,
                max_workers: self.config.max_workers,
            })
        });

        let collected = self.collect(items, reporter, &mut stats).await;
        // Leave the console on a fresh line even if the batch broke off
        let finished = reporter.finish();
        collected?;
        finished?;

        stats.finish();
        self.log_outcome(&stats);
        self.notify(|o| {
            o.on_batch_finished(&BatchFinished {
                district: self.district.clone(),
                stats: stats.clone(),
            })
        });
        Ok(stats)
    }

    async fn collect(
        &self,
        items: Vec<PointRequest>,
        reporter: &ProgressReporter,
        stats: &mut DownloadStats,
    ) -> Result<()> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_workers));
        let base_delay = self.config.throttle_delay();
        let mut tasks = JoinSet::new();

        for request in items {
            let semaphore = semaphore.clone();
            let fetcher = self.fetcher.clone();
            let backoff = self.backoff.clone();

            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (request, Err(FetchError::Cancelled));
                };

                let pause = backoff.delay(base_delay);
                if !pause.is_zero() {
                    tokio::time::sleep(pause).await;
                }

                let result = fetcher.fetch(&request).await;
                match result {
                    Ok(_) => backoff.record_success(),
                    Err(_) => backoff.record_failure(),
                }
                (request, result)
            });
        }

        let drained = self.drain(&mut tasks, reporter, stats).await;
        if drained.is_err() {
            // No fetch may outlive the batch: queued points give up their
            // permit wait and in-flight ones are aborted before returning.
            semaphore.close();
            tasks.abort_all();
            let mut abandoned = 0usize;
            while tasks.join_next().await.is_some() {
                abandoned += 1;
            }
            tracing::warn!(
                district = self.district.as_deref().unwrap_or("-"),
                "batch broke off, {} points abandoned",
                abandoned
            );
        }
        drained
    }

    async fn drain(
        &self,
        tasks: &mut JoinSet<(PointRequest, std::result::Result<u64, FetchError>)>,
        reporter: &ProgressReporter,
        stats: &mut DownloadStats,
    ) -> Result<()> {
        let mut completed = 0u64;
        while let Some(joined) = tasks.join_next().await {
            let (request, result) = joined?;
            let outcome = ItemOutcome::classify(&result, self.config.min_content_size);
            completed += 1;

            stats.record(&request.point, &outcome);
            reporter.report(outcome.kind)?;

            self.notify(|o| {
                o.on_item_finished(&ItemFinished {
                    point: request.point.clone(),
                    outcome: outcome.kind,
                    bytes: outcome.bytes,
                    error: outcome.error.clone(),
                    completed,
                    total: stats.total,
                })
            });
        }
        Ok(())
    }

    fn log_outcome(&self, stats: &DownloadStats) {
        let district = self.district.as_deref().unwrap_or("-");
        tracing::info!(district, "{}", stats.summary());
        tracing::info!(district, "downloaded {}", stats.volume());

        if stats.errors.len() <= MAX_LOGGED_ERRORS {
            for error in &stats.errors {
                tracing::warn!(district, point = %error.point, "{}", error.message);
            }
        } else {
            tracing::warn!(district, "{} download errors", stats.errors.len());
        }
    }

    fn notify<F: Fn(&dyn BatchObserver)>(&self, event: F) {
        for observer in &self.observers {
            event(observer.as_ref());
        }
    }
}
