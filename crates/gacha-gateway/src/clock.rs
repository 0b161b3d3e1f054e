//! Clock trait abstraction for mocking time in tests.
//!
//! - `SystemClock`: delegates to `chrono` and real `tokio::time`
//! - `MockClock`: returns a controllable timestamp, `sleep()` is a no-op
//!
//! Cooldown arithmetic works on wall-clock timestamps, so `now()` hands out
//! a `DateTime<Utc>` rather than a monotonic instant.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Abstraction over the system clock.
/// Implement this trait to control time in tests.
///
/// `sleep` returns a `Send` future so engine tasks built over a generic
/// clock can be spawned onto the runtime.
pub trait Clock: Clone + Send + Sync + 'static {
    /// Return the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Sleep for the given duration (no-op in mock implementations).
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Live implementation: delegates to chrono and real tokio time.
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Mock clock for unit tests.
/// - `now()` returns a fixed time that advances only when you call `advance()`
/// - `sleep()` is a no-op (returns immediately without real delay)
#[derive(Clone)]
pub struct MockClock {
    inner: Arc<Mutex<MockClockInner>>,
}

struct MockClockInner {
    current: DateTime<Utc>,
}

impl MockClock {
    /// Create a new mock clock fixed at `Utc::now()` at construction time.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockClockInner {
                current: Utc::now(),
            })),
        }
    }

    /// Advance the mock clock by `duration`.
    /// Subsequent `now()` calls will reflect the new time.
    pub fn advance(&self, duration: chrono::Duration) {
        self.inner.lock().unwrap().current += duration;
    }

    /// Return the current mocked time.
    pub fn current(&self) -> DateTime<Utc> {
        self.inner.lock().unwrap().current
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        self.inner.lock().unwrap().current
    }

    async fn sleep(&self, _duration: Duration) {
        // No-op: tests don't want real sleeps
    }
}
