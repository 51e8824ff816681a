//! Timer abstraction used by the debounce buffer and the worker.
//!
//! Components never call `tokio::time` directly. They go through [`Timer`],
//! so the clock driving them can be substituted. In production this is
//! [`TokioTimer`], which reads tokio's monotonic clock; tests run the same
//! code under a paused tokio clock (`#[tokio::test(start_paused = true)]`)
//! and get deterministic timings without real sleeping.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::Instant;

/// Boxed future returned by timer operations.
pub type TimerFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Trait for timing operations (clock reads and delays).
pub trait Timer: Send + Sync + 'static {
    /// Returns the current instant on this timer's monotonic clock.
    fn now(&self) -> Instant;

    /// Sleeps until the given deadline.
    ///
    /// Returns immediately if the deadline has already passed.
    fn sleep_until(&self, deadline: Instant) -> TimerFuture;

    /// Sleeps for the specified duration.
    fn sleep(&self, duration: Duration) -> TimerFuture {
        self.sleep_until(self.now() + duration)
    }
}

/// Tokio-based implementation of [`Timer`].
///
/// This is the production implementation that delegates to Tokio's
/// time driver. Under `tokio::time::pause()` it follows the paused clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl TokioTimer {
    pub fn new() -> Self {
        Self
    }
}

impl Timer for TokioTimer {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep_until(&self, deadline: Instant) -> TimerFuture {
        Box::pin(async move {
            tokio::time::sleep_until(deadline).await;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_sleep_advances_paused_clock_exactly() {
        let timer = TokioTimer::new();
        let start = timer.now();

        timer.sleep(Duration::from_millis(250)).await;

        assert_eq!(timer.now() - start, Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_until_past_deadline_returns_immediately() {
        let timer = TokioTimer::new();
        let start = timer.now();

        timer.sleep(Duration::from_secs(1)).await;
        timer.sleep_until(start).await;

        assert_eq!(timer.now() - start, Duration::from_secs(1));
    }

    #[test]
    fn test_timer_is_object_safe() {
        let timer: std::sync::Arc<dyn Timer> = std::sync::Arc::new(TokioTimer);
        let _ = timer;
    }
}
