//! Trailing-edge, non-resetting debounce buffer.
//!
//! Clipboard change events arrive in bursts: a single drag-select fires many
//! selection changes, and a copy often fires more than one notification. The
//! [`DebounceBuffer`] collapses such a burst into one downstream call.
//!
//! # Semantics
//!
//! ```text
//! invoke(a) ──┐                      ┌── fires target(c)
//! invoke(b)   │<────── buftime ─────>│
//! invoke(c) ──┘                      │
//! ```
//!
//! - Each `invoke` overwrites the pending call (last write wins).
//! - The first `invoke` of a burst arms the timer; later calls do **not**
//!   re-arm it, so the call fires `buftime` after the first call of the burst.
//! - A `buftime` of zero disables buffering: the call runs immediately on
//!   the caller's thread, and a call still pending from an earlier burst is
//!   discarded along with its timer.
//!
//! # Thread Safety
//!
//! `invoke` may be called from any thread. The pending slot and the
//! "timer running" flag live behind a single mutex; the timer task itself is
//! spawned on the runtime handle supplied at construction.

use crate::callback::panic_message;
use crate::time::Timer;
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::Instant;

/// Default buffering time.
pub const DEFAULT_BUFTIME: Duration = Duration::from_millis(500);

/// The single call a buffer is holding.
struct PendingCall {
    call: Box<dyn FnOnce() + Send>,
    arrived_at: Instant,
}

#[derive(Default)]
struct DebounceState {
    pending: Option<PendingCall>,
    timer_running: bool,
    /// Bumped when an armed timer is abandoned; a stale timer does not fire.
    generation: u64,
}

struct DebounceInner {
    buftime: Mutex<Duration>,
    state: Mutex<DebounceState>,
    timer: Arc<dyn Timer>,
    runtime: Handle,
}

/// Collapses bursts of calls into one trailing call.
///
/// Cloning is cheap and yields a handle to the same buffer.
///
/// # Example
///
/// ```no_run
/// use cliptrans::debounce::DebounceBuffer;
/// use cliptrans::time::TokioTimer;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # async fn demo() {
/// let buffer = DebounceBuffer::new(
///     Duration::from_millis(500),
///     Arc::new(TokioTimer),
///     tokio::runtime::Handle::current(),
/// );
/// buffer.invoke(|text: String| println!("{text}"), "first".to_string());
/// buffer.invoke(|text: String| println!("{text}"), "second".to_string());
/// // ~500ms later only "second" is printed
/// # }
/// ```
#[derive(Clone)]
pub struct DebounceBuffer {
    inner: Arc<DebounceInner>,
}

impl DebounceBuffer {
    /// Create a buffer that fires `buftime` after the first call of a burst.
    pub fn new(buftime: Duration, timer: Arc<dyn Timer>, runtime: Handle) -> Self {
        Self {
            inner: Arc::new(DebounceInner {
                buftime: Mutex::new(buftime),
                state: Mutex::new(DebounceState::default()),
                timer,
                runtime,
            }),
        }
    }

    /// Get the buffering time.
    pub fn buftime(&self) -> Duration {
        *self.inner.buftime.lock()
    }

    /// Set the buffering time.
    ///
    /// Takes effect for the next burst; an already armed timer keeps its deadline.
    pub fn set_buftime(&self, buftime: Duration) {
        *self.inner.buftime.lock() = buftime;
    }

    /// Returns true while a call is waiting for its timer.
    pub fn is_pending(&self) -> bool {
        self.inner.state.lock().pending.is_some()
    }

    /// Record `target(args)` as the pending call, replacing any previous one.
    pub fn invoke<A, F>(&self, target: F, args: A)
    where
        A: Send + 'static,
        F: FnOnce(A) + Send + 'static,
    {
        let buftime = self.buftime();
        if buftime.is_zero() {
            let discarded = {
                let mut state = self.inner.state.lock();
                state.generation = state.generation.wrapping_add(1);
                state.timer_running = false;
                state.pending.take()
            };
            if discarded.is_some() {
                tracing::trace!("Debounce: pending call superseded by unbuffered call");
            }
            run_guarded(Box::new(move || target(args)));
            return;
        }

        let now = self.inner.timer.now();
        let (arm, generation) = {
            let mut state = self.inner.state.lock();
            let replaced = state
                .pending
                .replace(PendingCall {
                    call: Box::new(move || target(args)),
                    arrived_at: now,
                })
                .is_some();
            if replaced {
                tracing::trace!("Debounce: pending call superseded");
            }
            let arm = !state.timer_running;
            state.timer_running = true;
            (arm, state.generation)
        };

        if arm {
            let deadline = now + buftime;
            let inner = Arc::clone(&self.inner);
            self.inner.runtime.spawn(async move {
                inner.timer.sleep_until(deadline).await;
                fire(&inner, generation);
            });
        }
    }
}

impl std::fmt::Debug for DebounceBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("DebounceBuffer")
            .field("buftime", &*self.inner.buftime.lock())
            .field("pending", &state.pending.is_some())
            .field("timer_running", &state.timer_running)
            .finish()
    }
}

/// Timer elapsed: take the most recent call and run it.
fn fire(inner: &DebounceInner, generation: u64) {
    let pending = {
        let mut state = inner.state.lock();
        if state.generation != generation {
            tracing::trace!("Debounce: abandoned timer elapsed");
            return;
        }
        state.timer_running = false;
        state.pending.take()
    };

    match pending {
        Some(pending) => {
            tracing::trace!(
                waited_ms = inner.timer.now().duration_since(pending.arrived_at).as_millis() as u64,
                "Debounce: firing buffered call"
            );
            run_guarded(pending.call);
        }
        None => tracing::warn!("Debounce timer fired with no pending call"),
    }
}

fn run_guarded(call: Box<dyn FnOnce() + Send>) {
    if let Err(panic) = catch_unwind(AssertUnwindSafe(call)) {
        tracing::error!(
            panic = panic_message(panic.as_ref()),
            "Buffered call failed, dropping it"
        );
    }
}
