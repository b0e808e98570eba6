//! Batch download glue for Niagara BAS history points.
//!
//! [`BatchRunner`] drives a caller-supplied [`PointFetcher`] over a list of
//! points with bounded concurrency, sorts every result into OK / EMPTY /
//! FAIL, keeps the console progress line from `niagara-progress` current and
//! returns [`DownloadStats`] for the batch.

pub use niagara_progress as progress;

pub mod backoff;
pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod stats;
pub mod ui;

pub use backoff::AdaptiveBackoff;
pub use config::DownloadConfig;
pub use engine::BatchRunner;
pub use error::{DownloadError, Result};
pub use fetch::{FetchError, PointFetcher, PointRequest};
pub use logging::init_logging;
pub use stats::{DownloadStats, DownloadTotals, ItemOutcome, PointError};
pub use ui::{BatchFinished, BatchObserver, BatchStarted, ItemFinished, TracingObserver};
