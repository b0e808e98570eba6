use std::time::{Duration, Instant};

use indicatif::{HumanBytes, HumanDuration};
use niagara_progress::OutcomeKind;
use serde::Serialize;

use crate::error::Result;
use crate::fetch::FetchError;

/// Longest failure message kept per point
pub const MAX_ERROR_CHARS: usize = 50;

/// Classified result of one fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome {
    pub kind: OutcomeKind,
    pub bytes: u64,
    pub error: Option<String>,
}

impl ItemOutcome {
    /// Payloads below `min_content_size` are empty; errors are failures
    pub fn classify(result: &std::result::Result<u64, FetchError>, min_content_size: u64) -> Self {
        match result {
            Ok(bytes) if *bytes < min_content_size => Self {
                kind: OutcomeKind::Empty,
                bytes: *bytes,
                error: None,
            },
            Ok(bytes) => Self {
                kind: OutcomeKind::Ok,
                bytes: *bytes,
                error: None,
            },
            Err(err) => Self {
                kind: OutcomeKind::Fail,
                bytes: 0,
                error: Some(err.to_string().chars().take(MAX_ERROR_CHARS).collect()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointError {
    pub point: String,
    pub message: String,
}

/// Counters for one download batch
#[derive(Debug, Clone, Serialize)]
pub struct DownloadStats {
    pub total: u64,
    pub success: u64,
    pub failed: u64,
    pub empty: u64,
    pub skipped: u64,
    pub bytes_downloaded: u64,
    pub errors: Vec<PointError>,
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    elapsed: Option<Duration>,
    #[serde(skip)]
    started: Instant,
}

fn serialize_secs<S: serde::Serializer>(
    elapsed: &Option<Duration>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.map_or(0.0, |d| d.as_secs_f64()))
}

impl DownloadStats {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            success: 0,
            failed: 0,
            empty: 0,
            skipped: 0,
            bytes_downloaded: 0,
            errors: Vec::new(),
            elapsed: None,
            started: Instant::now(),
        }
    }

    /// Stats for a batch whose points were all filtered out beforehand
    pub fn skipped_only(skipped: u64) -> Self {
        let mut stats = Self::new(0);
        stats.skipped = skipped;
        stats.finish();
        stats
    }

    pub fn with_skipped(mut self, skipped: u64) -> Self {
        self.skipped = skipped;
        self
    }

    /// Fold one finished point into the counters
    pub fn record(&mut self, point: &str, outcome: &ItemOutcome) {
        match outcome.kind {
            OutcomeKind::Ok => {
                self.success += 1;
                self.bytes_downloaded += outcome.bytes;
            }
            OutcomeKind::Empty => {
                self.empty += 1;
                self.bytes_downloaded += outcome.bytes;
            }
            OutcomeKind::Fail => {
                self.failed += 1;
                if let Some(message) = &outcome.error {
                    self.errors.push(PointError {
                        point: point.to_string(),
                        message: message.clone(),
                    });
                }
            }
        }
    }

    /// Freeze the elapsed time
    pub fn finish(&mut self) {
        if self.elapsed.is_none() {
            self.elapsed = Some(self.started.elapsed());
        }
    }

    /// Override the elapsed time, e.g. when rebuilding stats from a report
    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed = Some(elapsed);
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed.unwrap_or_else(|| self.started.elapsed())
    }

    pub fn processed(&self) -> u64 {
        self.success + self.failed + self.empty
    }

    /// Points per second
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            self.processed() as f64 / secs
        } else {
            0.0
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    pub fn summary(&self) -> String {
        format!(
            "Total: {} | Success: {} | Failed: {} | Empty: {} | Skipped: {} | Time: {:.1}s | Rate: {:.1}/s",
            self.total,
            self.success,
            self.failed,
            self.empty,
            self.skipped,
            self.elapsed().as_secs_f64(),
            self.rate(),
        )
    }

    /// e.g. `12.40 MiB in 3 minutes`
    pub fn volume(&self) -> String {
        format!("{} in {}", HumanBytes(self.bytes_downloaded), HumanDuration(self.elapsed()))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Stats of several batches, one per district
#[derive(Debug, Clone, Default, Serialize)]
pub struct DownloadTotals {
    pub districts: Vec<(String, DownloadStats)>,
}

impl DownloadTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<S: Into<String>>(&mut self, district: S, stats: DownloadStats) {
        self.districts.push((district.into(), stats));
    }

    pub fn success(&self) -> u64 {
        self.districts.iter().map(|(_, s)| s.success).sum()
    }

    pub fn failed(&self) -> u64 {
        self.districts.iter().map(|(_, s)| s.failed).sum()
    }

    pub fn skipped(&self) -> u64 {
        self.districts.iter().map(|(_, s)| s.skipped).sum()
    }

    pub fn bytes_downloaded(&self) -> u64 {
        self.districts.iter().map(|(_, s)| s.bytes_downloaded).sum()
    }

    pub fn all_clean(&self) -> bool {
        self.districts.iter().all(|(_, s)| s.is_clean())
    }

    /// Process exit code: 0 when no district had failures
    pub fn exit_code(&self) -> i32 {
        if self.all_clean() { 0 } else { 1 }
    }

    /// One aligned line per district followed by a grand total
    pub fn report_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .districts
            .iter()
            .map(|(district, s)| {
                format!(
                    "{:25} | OK:{:4} | Fail:{:3} | Skip:{:4}",
                    district, s.success, s.failed, s.skipped
                )
            })
            .collect();
        lines.push(format!(
            "{:25} | OK:{:4} | Fail:{:3} | Skip:{:4} | {}",
            "TOTAL",
            self.success(),
            self.failed(),
            self.skipped(),
            HumanBytes(self.bytes_downloaded()),
        ));
        lines
    }
}
