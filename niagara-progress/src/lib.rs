//! Live, in-place console progress for batch downloads from a Niagara BAS
//! station.
//!
//! A [`ProgressReporter`] is told the number of points up front, receives one
//! [`OutcomeKind`] per finished point and keeps a single line like
//!
//! ```text
//! [██████░░░░░░░░░░░░░░] 2048/6272   32.7%  OK:1890 EMPTY:158  FAIL:0  41.2/s
//! ```
//!
//! up to date on the console without printing a line per point.

pub mod clock;
pub mod config;
pub mod error;
pub mod outcome;
pub mod render;
pub mod reporter;
pub mod sink;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{DEFAULT_BAR_WIDTH, ProgressConfig, ThrottlePolicy};
pub use error::{ProgressError, Result};
pub use outcome::{OutcomeKind, Tallies};
pub use render::{ProgressSnapshot, render_bar, render_line};
pub use reporter::{ProgressReporter, RunState};
pub use sink::{ConsoleSink, MemorySink, NullSink, ProgressSink, WriterSink};
