use niagara_progress::OutcomeKind;

use crate::stats::DownloadStats;

#[derive(Debug, Clone)]
pub struct BatchStarted {
    pub district: Option<String>,
    pub total: u64,
    pub max_workers: usize,
}

#[derive(Debug, Clone)]
pub struct ItemFinished {
    pub point: String,
    pub outcome: OutcomeKind,
    pub bytes: u64,
    pub error: Option<String>,
    pub completed: u64,
    pub total: u64,
}

#[derive(Debug, Clone)]
pub struct BatchFinished {
    pub district: Option<String>,
    pub stats: DownloadStats,
}

/// Hooks for watching a batch besides the console progress line
pub trait BatchObserver: Send + Sync {
    fn on_batch_started(&self, _event: &BatchStarted) {}
    fn on_item_finished(&self, _event: &ItemFinished) {}
    fn on_batch_finished(&self, _event: &BatchFinished) {}
}

/// Sends every event to `tracing` at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl BatchObserver for TracingObserver {
    fn on_batch_started(&self, event: &BatchStarted) {
        tracing::debug!(
            district = event.district.as_deref().unwrap_or("-"),
            total = event.total,
            workers = event.max_workers,
            "batch started"
        );
    }

    fn on_item_finished(&self, event: &ItemFinished) {
        match &event.error {
            Some(error) => tracing::debug!(point = %event.point, %error, "point failed"),
            None => tracing::debug!(
                point = %event.point,
                outcome = %event.outcome,
                bytes = event.bytes,
                "point done"
            ),
        }
    }

    fn on_batch_finished(&self, event: &BatchFinished) {
        tracing::debug!(
            district = event.district.as_deref().unwrap_or("-"),
            "batch finished: {}",
            event.stats.summary()
        );
    }
}
