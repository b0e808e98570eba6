//! Formatting of the progress line.
//!
//! Produces `[<bar>] <completed>/<total>  <percent>%  OK:<n> EMPTY:<n>  FAIL:<n>  <rate>/s`.

use std::time::Duration;

use serde::Serialize;

use crate::outcome::Tallies;

pub const FILLED_CELL: char = '\u{2588}';
pub const EMPTY_CELL: char = '\u{2591}';

/// Point-in-time copy of a run's counters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub total: u64,
    pub completed: u64,
    pub tallies: Tallies,
    pub elapsed: Duration,
}

impl ProgressSnapshot {
    /// Completed share in `0.0..=1.0`. An empty run counts as done.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            (self.completed as f64 / self.total as f64).min(1.0)
        }
    }

    pub fn percent(&self) -> f64 {
        self.fraction() * 100.0
    }

    /// Items per second since the run began
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if self.completed == 0 || secs <= 0.0 {
            0.0
        } else {
            self.completed as f64 / secs
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }
}

/// Bar of `width` cells, filled in proportion to `fraction` (rounded down)
pub fn render_bar(fraction: f64, width: usize) -> String {
    let filled = ((width as f64) * fraction.clamp(0.0, 1.0)).floor() as usize;
    let filled = filled.min(width);

    let mut bar = String::with_capacity(width * FILLED_CELL.len_utf8());
    bar.extend(std::iter::repeat_n(FILLED_CELL, filled));
    bar.extend(std::iter::repeat_n(EMPTY_CELL, width - filled));
    bar
}

/// Full progress line, without carriage return or padding
pub fn render_line(snapshot: &ProgressSnapshot, bar_width: usize) -> String {
    let count_width = snapshot.total.to_string().len();
    format!(
        "[{bar}] {completed:>count_width$}/{total}  {percent:5.1}%  OK:{ok} EMPTY:{empty}  FAIL:{fail}  {rate:.1}/s",
        bar = render_bar(snapshot.fraction(), bar_width),
        completed = snapshot.completed,
        total = snapshot.total,
        percent = snapshot.percent(),
        ok = snapshot.tallies.ok,
        empty = snapshot.tallies.empty,
        fail = snapshot.tallies.fail,
        rate = snapshot.rate(),
    )
}
