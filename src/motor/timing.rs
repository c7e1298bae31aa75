// Waiting: settle policy, injectable clock, cancellation of timed moves

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Source of the blocking waits used by the exchange and the session
pub trait Clock {
    fn sleep(&mut self, duration: Duration);
}

/// Real wall-clock sleeping
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// How long the exchange waits after a write before its single read attempt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlePolicy {
    /// Always wait the full duration
    Fixed(Duration),
    /// Poll for pending bytes every `poll`, giving up after `max`
    UntilPending { poll: Duration, max: Duration },
}

impl SettlePolicy {
    /// Upper bound on the time one settle can take
    pub fn max_wait(&self) -> Duration {
        match *self {
            SettlePolicy::Fixed(d) => d,
            SettlePolicy::UntilPending { max, .. } => max,
        }
    }
}

/// Shared flag that ends a timed move early
///
/// Clones observe the same flag, so one can be handed to another thread while
/// the session blocks inside `move_for`.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear the flag and report whether it was set
    pub fn reset(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

/// Sleep for `total` in `slice` steps, stopping early once `token` is cancelled
///
/// Returns `true` when the wait was cut short.
pub fn sleep_cancellable<C: Clock>(
    clock: &mut C,
    total: Duration,
    slice: Duration,
    token: &CancelToken,
) -> bool {
    let slice = if slice.is_zero() { total } else { slice };
    let mut remaining = total;

    while !remaining.is_zero() {
        if token.is_cancelled() {
            return true;
        }
        let step = remaining.min(slice);
        clock.sleep(step);
        remaining -= step;
    }
    token.is_cancelled()
}
