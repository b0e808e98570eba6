use std::sync::Mutex;
use std::time::Duration;

/// Failures in a row before the pause starts growing
pub const FAILURE_STREAK: u32 = 5;
pub const MAX_MULTIPLIER: f64 = 5.0;
const GROWTH: f64 = 1.5;
const DECAY: f64 = 0.9;

#[derive(Debug)]
struct BackoffState {
    consecutive_failures: u32,
    multiplier: f64,
}

/// Scales the per-fetch pause while the station keeps failing and eases it
/// back as fetches succeed again.
#[derive(Debug)]
pub struct AdaptiveBackoff {
    state: Mutex<BackoffState>,
}

impl AdaptiveBackoff {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BackoffState {
                consecutive_failures: 0,
                multiplier: 1.0,
            }),
        }
    }

    pub fn record_success(&self) {
        let mut state = self.lock();
        state.consecutive_failures = 0;
        state.multiplier = (state.multiplier * DECAY).max(1.0);
    }

    pub fn record_failure(&self) {
        let mut state = self.lock();
        state.consecutive_failures += 1;
        if state.consecutive_failures > FAILURE_STREAK {
            let grown = (state.multiplier * GROWTH).min(MAX_MULTIPLIER);
            if grown > state.multiplier {
                tracing::debug!(
                    failures = state.consecutive_failures,
                    multiplier = grown,
                    "slowing down fetches"
                );
            }
            state.multiplier = grown;
        }
    }

    pub fn multiplier(&self) -> f64 {
        self.lock().multiplier
    }

    /// Pause to take before the next fetch
    pub fn delay(&self, base: Duration) -> Duration {
        if base.is_zero() {
            return Duration::ZERO;
        }
        base.mul_f64(self.multiplier())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BackoffState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for AdaptiveBackoff {
    fn default() -> Self {
        Self::new()
    }
}
