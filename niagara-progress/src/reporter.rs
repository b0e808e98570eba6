use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use crate::clock::{Clock, SystemClock};
use crate::config::ProgressConfig;
use crate::error::{ProgressError, Result};
use crate::outcome::{OutcomeKind, Tallies};
use crate::render::{ProgressSnapshot, render_line};
use crate::sink::{ConsoleSink, NullSink, ProgressSink};

/// Lifecycle of a reporter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Uninitialized,
    Running,
    Finished,
}

/// Counters for the active run
#[derive(Debug)]
struct ProgressState {
    total: u64,
    completed: u64,
    tallies: Tallies,
    start_time: Instant,
    last_render_time: Instant,
    last_render_completed: u64,
    item_step: u64,
}

struct Inner {
    run: RunState,
    state: Option<ProgressState>,
    sink: Box<dyn ProgressSink>,
    /// Character width of the last line drawn, so a shorter line can blank it out
    last_width: usize,
    write_failed: bool,
}

/// Single-line console progress for a batch of items.
///
/// All methods take `&self`; one mutex covers the counter update and the
/// optional redraw, so an `Arc<ProgressReporter>` can be shared by concurrent
/// workers without tallies drifting or frames interleaving.
///
/// ```rust
/// use niagara_progress::{MemorySink, OutcomeKind, ProgressConfig, ProgressReporter};
///
/// let sink = MemorySink::new();
/// let reporter = ProgressReporter::with_sink(ProgressConfig::default(), sink.clone());
/// reporter.begin(2)?;
/// reporter.report(OutcomeKind::Ok)?;
/// reporter.report(OutcomeKind::Empty)?;
/// reporter.finish()?;
/// assert!(sink.contents().ends_with('\n'));
/// # Ok::<(), niagara_progress::ProgressError>(())
/// ```
pub struct ProgressReporter {
    config: ProgressConfig,
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("config", &self.config)
            .field("run_state", &self.run_state())
            .finish()
    }
}

impl ProgressReporter {
    /// Reporter drawing to stdout, or to nowhere when the config is disabled
    pub fn new(config: ProgressConfig) -> Self {
        if config.enabled {
            Self::with_sink(config, ConsoleSink::new())
        } else {
            Self::with_sink(config, NullSink)
        }
    }

    /// Reporter drawing to stdout with defaults, honouring `NO_PROGRESS`
    pub fn console() -> Self {
        Self::new(ProgressConfig::from_env())
    }

    /// Reporter drawing to a custom sink
    pub fn with_sink<S: ProgressSink + 'static>(config: ProgressConfig, sink: S) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            inner: Mutex::new(Inner {
                run: RunState::Uninitialized,
                state: None,
                sink: Box::new(sink),
                last_width: 0,
                write_failed: false,
            }),
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &ProgressConfig {
        &self.config
    }

    pub fn run_state(&self) -> RunState {
        self.lock().run
    }

    /// Counters of the current or finished run
    pub fn snapshot(&self) -> Option<ProgressSnapshot> {
        let now = self.clock.now();
        self.lock().state.as_ref().map(|state| snapshot_of(state, now))
    }

    /// Start a run of `total` items and draw the empty bar.
    ///
    /// Fails with `InvalidArgument` when `total` is negative and with
    /// `InvalidState` when a run was already started on this reporter.
    pub fn begin<T: TryInto<u64>>(&self, total: T) -> Result<()> {
        let total: u64 = total
            .try_into()
            .map_err(|_| ProgressError::invalid_argument("total must be a non-negative integer"))?;

        let mut inner = self.lock();
        if inner.run != RunState::Uninitialized {
            return Err(ProgressError::invalid_state(format!(
                "begin() called while {:?}",
                inner.run
            )));
        }

        let now = self.clock.now();
        let state = ProgressState {
            total,
            completed: 0,
            tallies: Tallies::default(),
            start_time: now,
            last_render_time: now,
            last_render_completed: 0,
            item_step: self.config.throttle.item_step(total),
        };
        tracing::debug!(total, item_step = state.item_step, "progress run started");

        inner.state = Some(state);
        inner.run = RunState::Running;
        self.draw(&mut inner, now, false);
        Ok(())
    }

    /// Record one finished item and redraw if the throttle allows it
    pub fn report(&self, outcome: OutcomeKind) -> Result<()> {
        let mut inner = self.lock();
        if inner.run != RunState::Running {
            return Err(ProgressError::invalid_state(format!(
                "report() called while {:?}",
                inner.run
            )));
        }

        let now = self.clock.now();
        let min_interval = self.config.throttle.min_interval();
        let due = {
            let Some(state) = inner.state.as_mut() else {
                return Err(ProgressError::invalid_state("running without progress state"));
            };
            if state.completed >= state.total {
                return Err(ProgressError::invalid_state(format!(
                    "all {} items were already reported",
                    state.total
                )));
            }

            state.completed += 1;
            state.tallies.record(outcome);

            state.completed == state.total
                || state.completed - state.last_render_completed >= state.item_step
                || min_interval.is_some_and(|interval| {
                    now.saturating_duration_since(state.last_render_time) >= interval
                })
        };

        if due {
            self.draw(&mut inner, now, false);
        }
        Ok(())
    }

    /// Draw the final line and move the cursor to the next line.
    ///
    /// A second call is a no-op.
    pub fn finish(&self) -> Result<()> {
        let mut inner = self.lock();
        match inner.run {
            RunState::Uninitialized => {
                Err(ProgressError::invalid_state("finish() called before begin()"))
            }
            RunState::Finished => Ok(()),
            RunState::Running => {
                let now = self.clock.now();
                inner.run = RunState::Finished;
                self.draw(&mut inner, now, true);
                if let Some(state) = inner.state.as_ref() {
                    tracing::debug!(
                        total = state.total,
                        completed = state.completed,
                        ok = state.tallies.ok,
                        empty = state.tallies.empty,
                        fail = state.tallies.fail,
                        "progress run finished"
                    );
                }
                Ok(())
            }
        }
    }

    fn draw(&self, inner: &mut Inner, now: Instant, last: bool) {
        let Some(state) = inner.state.as_mut() else {
            return;
        };
        state.last_render_time = now;
        state.last_render_completed = state.completed;

        if !self.config.enabled {
            return;
        }

        let line = render_line(&snapshot_of(state, now), self.config.bar_width);
        let width = line.chars().count();
        let pad = inner.last_width.saturating_sub(width);

        let mut frame = String::with_capacity(line.len() + pad + 2);
        frame.push('\r');
        frame.push_str(&line);
        frame.extend(std::iter::repeat_n(' ', pad));
        if last {
            frame.push('\n');
        }

        match inner.sink.write_frame(&frame) {
            Ok(()) => inner.last_width = width,
            Err(err) => {
                if !inner.write_failed {
                    tracing::debug!("progress render skipped: {err}");
                    inner.write_failed = true;
                }
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn snapshot_of(state: &ProgressState, now: Instant) -> ProgressSnapshot {
    ProgressSnapshot {
        total: state.total,
        completed: state.completed,
        tallies: state.tallies,
        elapsed: now.saturating_duration_since(state.start_time),
    }
}
