use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default number of cells in the progress bar
pub const DEFAULT_BAR_WIDTH: usize = 20;

/// Number of renders a run aims for when the item step is derived from the total
pub const TARGET_RENDERS: u64 = 100;

/// Decides when a `report()` call is allowed to redraw the line.
///
/// A render fires when either threshold is crossed, whichever comes first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottlePolicy {
    /// Minimum completed items between renders. `None` derives
    /// `max(1, total / 100)` when the run begins.
    pub every_items: Option<u64>,
    /// Minimum time between renders, in milliseconds. Zero disables the
    /// time-based trigger.
    pub min_interval_ms: u64,
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self {
            every_items: None,
            min_interval_ms: 250,
        }
    }
}

impl ThrottlePolicy {
    /// Item step for a run of `total` items
    pub fn item_step(&self, total: u64) -> u64 {
        self.every_items
            .unwrap_or(total / TARGET_RENDERS)
            .max(1)
    }

    /// Time-based trigger, if enabled
    pub fn min_interval(&self) -> Option<Duration> {
        (self.min_interval_ms > 0).then(|| Duration::from_millis(self.min_interval_ms))
    }

    /// Render only on item count
    pub fn items_only(every_items: u64) -> Self {
        Self {
            every_items: Some(every_items),
            min_interval_ms: 0,
        }
    }

    /// Render on every report
    pub fn every_report() -> Self {
        Self::items_only(1)
    }
}

/// Configuration for the console progress line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// Fixed number of bar cells
    pub bar_width: usize,
    /// Render cadence
    pub throttle: ThrottlePolicy,
    /// When false the reporter still tracks state but never writes
    pub enabled: bool,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            bar_width: DEFAULT_BAR_WIDTH,
            throttle: ThrottlePolicy::default(),
            enabled: true,
        }
    }
}

impl ProgressConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, with rendering disabled when `NO_PROGRESS` is set
    pub fn from_env() -> Self {
        Self::default().with_enabled(std::env::var("NO_PROGRESS").is_err())
    }

    /// Set the bar width
    pub fn with_bar_width(mut self, width: usize) -> Self {
        self.bar_width = width.max(1);
        self
    }

    /// Set the render cadence
    pub fn with_throttle(mut self, throttle: ThrottlePolicy) -> Self {
        self.throttle = throttle;
        self
    }

    /// Enable or disable rendering
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}
