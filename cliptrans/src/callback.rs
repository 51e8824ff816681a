//! Registration slot for downstream callbacks.
//!
//! Both the change monitor and the worker publish to a consumer that is
//! registered after construction. [`CallbackSlot`] holds that consumer and
//! guarantees that a missing or panicking consumer never takes down the
//! context that publishes.

use parking_lot::RwLock;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Shared callback type stored in a [`CallbackSlot`].
pub type Callback<T> = Arc<dyn Fn(T) + Send + Sync>;

/// A replaceable, optional callback.
pub struct CallbackSlot<T> {
    name: &'static str,
    callback: RwLock<Option<Callback<T>>>,
}

impl<T> CallbackSlot<T> {
    /// Create an empty slot. `name` identifies the slot in log output.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            callback: RwLock::new(None),
        }
    }

    /// Register (or replace) the callback.
    pub fn set<F>(&self, callback: F)
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        *self.callback.write() = Some(Arc::new(callback));
    }

    /// Remove the registered callback.
    pub fn clear(&self) {
        *self.callback.write() = None;
    }

    /// Returns true if a callback is registered.
    pub fn is_set(&self) -> bool {
        self.callback.read().is_some()
    }

    /// Invoke the callback with `value`.
    ///
    /// Returns `false` when the value was dropped, either because no callback
    /// is registered or because the callback panicked. Both cases are logged.
    pub fn invoke(&self, value: T) -> bool {
        // Clone out of the lock so the callback may re-register itself.
        let callback = self.callback.read().clone();
        let Some(callback) = callback else {
            tracing::error!(slot = self.name, "Callback is not set, dropping event");
            return false;
        };

        match catch_unwind(AssertUnwindSafe(|| callback(value))) {
            Ok(()) => true,
            Err(panic) => {
                tracing::error!(
                    slot = self.name,
                    panic = panic_message(panic.as_ref()),
                    "Callback panicked, event dropped"
                );
                false
            }
        }
    }
}

impl<T> std::fmt::Debug for CallbackSlot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackSlot")
            .field("name", &self.name)
            .field("is_set", &self.is_set())
            .finish()
    }
}

/// Extract a printable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
