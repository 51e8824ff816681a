//! Clipboard change monitor with a recursion guard.
//!
//! The monitor turns raw "mode X changed" notifications into text events for
//! the pipeline. Two filters apply before an event is forwarded:
//!
//! 1. **Mode filter**: only notifications for the active mode pass.
//! 2. **Suppress token**: [`ChangeMonitor::overwrite`] remembers the text it
//!    is about to write. The next same-mode notification consumes the token;
//!    if the clipboard holds exactly that text, the event is our own echo and
//!    is dropped.
//!
//! The token is single-shot. It is cleared by the first same-mode
//! comparison whether or not the text matched, so a genuine user change that
//! races with our write still gets through.
//!
//! # Locking
//!
//! The active mode and the token share one mutex. It is never held across a
//! backend call, since some backends notify synchronously from inside
//! `write` and the notification re-enters [`ChangeListener::on_change`].

use super::mode::{mode_name, ModeTable};
use super::{ChangeListener, ClipboardBackend, ClipboardError, ClipboardMode};
use crate::callback::CallbackSlot;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

#[derive(Debug, Default)]
struct MonitorState {
    current: Option<ClipboardMode>,
    suppress_token: Option<String>,
}

/// Watches one clipboard mode and forwards genuine text changes.
pub struct ChangeMonitor {
    backend: Arc<dyn ClipboardBackend>,
    table: ModeTable,
    state: Mutex<MonitorState>,
    callback: CallbackSlot<String>,
}

impl ChangeMonitor {
    /// Create a monitor over `backend` starting in `mode`.
    ///
    /// A mode the backend does not support is replaced by `none` (logged).
    pub fn new(backend: Arc<dyn ClipboardBackend>, mode: Option<ClipboardMode>) -> Self {
        let table = ModeTable::new(&backend.supported_modes());
        let current = match mode {
            Some(m) if !table.supports(m) => {
                warn!(mode = %m, "Clipboard mode not supported here, monitoring disabled");
                None
            }
            other => other,
        };

        Self {
            backend,
            table,
            state: Mutex::new(MonitorState {
                current,
                suppress_token: None,
            }),
            callback: CallbackSlot::new("clipboard_change"),
        }
    }

    /// Register the consumer of text change events.
    pub fn set_callback<F>(&self, callback: F)
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.callback.set(callback);
    }

    /// Active mode (`None` when disabled).
    pub fn mode(&self) -> Option<ClipboardMode> {
        self.state.lock().current
    }

    /// Name of the active mode.
    pub fn mode_name(&self) -> &'static str {
        mode_name(self.mode())
    }

    /// Names of all selectable modes, ending with `none`.
    pub fn mode_names(&self) -> Vec<&'static str> {
        self.table.names()
    }

    /// Switch the active mode by name.
    ///
    /// On an invalid name the error is logged, returned, and the previous
    /// mode stays active.
    pub fn set_mode(&self, name: &str) -> Result<(), ClipboardError> {
        match self.table.lookup(name) {
            Ok(mode) => {
                let mut state = self.state.lock();
                state.current = mode;
                state.suppress_token = None;
                info!(mode = mode_name(mode), "Clipboard mode changed");
                Ok(())
            }
            Err(e) => {
                error!(
                    requested = name,
                    current = mode_name(self.mode()),
                    error = %e,
                    "Failed to set clipboard mode"
                );
                Err(e)
            }
        }
    }

    /// Read the active buffer. Returns `""` in `none` mode or on failure.
    pub fn get_text(&self) -> String {
        let Some(mode) = self.mode() else {
            return String::new();
        };
        match self.backend.read(mode) {
            Ok(text) => text,
            Err(e) => {
                warn!(mode = %mode, error = %e, "Failed to read clipboard");
                String::new()
            }
        }
    }

    /// Write the active buffer without arming the recursion guard.
    ///
    /// The resulting change notification is treated like a user change.
    pub fn set_text(&self, text: &str) {
        let Some(mode) = self.mode() else {
            return;
        };
        if let Err(e) = self.backend.write(mode, text) {
            warn!(mode = %mode, error = %e, "Failed to write clipboard");
        }
    }

    /// Write the active buffer and suppress the echo of that write.
    pub fn overwrite(&self, text: &str) {
        let mode = {
            let mut state = self.state.lock();
            let Some(mode) = state.current else {
                return;
            };
            state.suppress_token = Some(text.to_string());
            mode
        };

        debug!(mode = %mode, chars = text.chars().count(), "Overwriting clipboard");
        if let Err(e) = self.backend.write(mode, text) {
            warn!(mode = %mode, error = %e, "Failed to overwrite clipboard");
            // Nothing was written, so there is no echo to suppress
            let mut state = self.state.lock();
            if state.suppress_token.as_deref() == Some(text) {
                state.suppress_token = None;
            }
        }
    }
}

impl ChangeListener for ChangeMonitor {
    fn on_change(&self, observed: ClipboardMode) {
        if self.mode() != Some(observed) {
            trace!(observed = %observed, "Ignoring change for inactive clipboard mode");
            return;
        }

        let text = match self.backend.read(observed) {
            Ok(text) => text,
            Err(e) => {
                warn!(mode = %observed, error = %e, "Failed to read changed clipboard");
                return;
            }
        };

        let token = self.state.lock().suppress_token.take();
        if token.as_deref() == Some(text.as_str()) {
            debug!(mode = %observed, "Suppressed clipboard change caused by overwrite");
            return;
        }

        self.callback.invoke(text);
    }
}

impl std::fmt::Debug for ChangeMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ChangeMonitor")
            .field("mode", &mode_name(state.current))
            .field("suppressing", &state.suppress_token.is_some())
            .field("modes", &self.table.modes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::{ChangeSource, MemoryClipboard};
    use tokio_util::sync::CancellationToken;

    fn recording(monitor: &ChangeMonitor) -> Arc<Mutex<Vec<String>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        monitor.set_callback(move |text| sink.lock().push(text));
        seen
    }

    /// Monitor attached to a clipboard that notifies synchronously.
    fn attached(mode: ClipboardMode) -> (Arc<MemoryClipboard>, Arc<ChangeMonitor>) {
        let clip = Arc::new(MemoryClipboard::with_all_modes());
        let monitor = Arc::new(ChangeMonitor::new(clip.clone(), Some(mode)));
        clip.attach(monitor.clone(), CancellationToken::new());
        (clip, monitor)
    }

    #[test]
    fn test_user_change_is_forwarded() {
        let (clip, monitor) = attached(ClipboardMode::Select);
        let seen = recording(&monitor);

        clip.write(ClipboardMode::Select, "hello").unwrap();

        assert_eq!(*seen.lock(), vec!["hello"]);
    }

    #[test]
    fn test_overwrite_echo_is_suppressed() {
        let (clip, monitor) = attached(ClipboardMode::Select);
        let seen = recording(&monitor);

        monitor.overwrite("X");
        assert!(seen.lock().is_empty());
        assert_eq!(clip.read(ClipboardMode::Select).unwrap(), "X");

        clip.write(ClipboardMode::Select, "Y").unwrap();
        assert_eq!(*seen.lock(), vec!["Y"]);
    }

    #[test]
    fn test_set_text_is_not_suppressed() {
        let (_clip, monitor) = attached(ClipboardMode::Copy);
        let seen = recording(&monitor);

        monitor.set_text("plain write");

        assert_eq!(*seen.lock(), vec!["plain write"]);
    }

    #[test]
    fn test_other_mode_is_discarded_and_keeps_token() {
        // Not attached: notifications are driven by hand
        let clip = Arc::new(MemoryClipboard::with_all_modes());
        let monitor = ChangeMonitor::new(clip.clone(), Some(ClipboardMode::Select));
        let seen = recording(&monitor);

        monitor.overwrite("X");
        clip.write(ClipboardMode::Copy, "copy text").unwrap();
        monitor.on_change(ClipboardMode::Copy);
        assert!(seen.lock().is_empty());

        // Token survived the foreign-mode event and suppresses the echo
        monitor.on_change(ClipboardMode::Select);
        assert!(seen.lock().is_empty());

        // Single-shot: the same text now counts as a change
        monitor.on_change(ClipboardMode::Select);
        assert_eq!(*seen.lock(), vec!["X"]);
    }

    #[test]
    fn test_token_cleared_on_mismatch() {
        let clip = Arc::new(MemoryClipboard::with_all_modes());
        let monitor = ChangeMonitor::new(clip.clone(), Some(ClipboardMode::Copy));
        let seen = recording(&monitor);

        monitor.overwrite("mine");
        clip.write(ClipboardMode::Copy, "user text").unwrap();
        monitor.on_change(ClipboardMode::Copy);
        assert_eq!(*seen.lock(), vec!["user text"]);

        clip.write(ClipboardMode::Copy, "mine").unwrap();
        monitor.on_change(ClipboardMode::Copy);
        assert_eq!(*seen.lock(), vec!["user text", "mine"]);
    }

    #[test]
    fn test_none_mode_is_inert() {
        let clip = Arc::new(MemoryClipboard::with_all_modes());
        clip.write(ClipboardMode::Copy, "present").unwrap();
        let monitor = Arc::new(ChangeMonitor::new(clip.clone(), None));
        clip.attach(monitor.clone(), CancellationToken::new());
        let seen = recording(&monitor);

        assert_eq!(monitor.get_text(), "");
        monitor.set_text("ignored");
        monitor.overwrite("ignored");
        clip.write(ClipboardMode::Copy, "changed").unwrap();

        assert!(seen.lock().is_empty());
        assert_eq!(clip.read(ClipboardMode::Copy).unwrap(), "changed");
        assert_eq!(monitor.mode_name(), "none");
    }

    #[test]
    fn test_set_mode_invalid_keeps_previous() {
        let clip = Arc::new(MemoryClipboard::new(&[ClipboardMode::Copy]));
        let monitor = ChangeMonitor::new(clip, Some(ClipboardMode::Copy));

        assert!(matches!(
            monitor.set_mode("select"),
            Err(ClipboardError::InvalidMode(_))
        ));
        assert!(monitor.set_mode("bogus").is_err());
        assert_eq!(monitor.mode(), Some(ClipboardMode::Copy));

        monitor.set_mode("none").unwrap();
        assert_eq!(monitor.mode(), None);
        assert_eq!(monitor.mode_names(), vec!["copy", "none"]);
    }

    #[test]
    fn test_unsupported_initial_mode_falls_back_to_none() {
        let clip = Arc::new(MemoryClipboard::new(&[ClipboardMode::Copy]));
        let monitor = ChangeMonitor::new(clip, Some(ClipboardMode::FindBuffer));
        assert_eq!(monitor.mode(), None);
    }

    #[test]
    fn test_missing_callback_drops_event() {
        let (clip, _monitor) = attached(ClipboardMode::Copy);
        // Logged and dropped, must not panic
        clip.write(ClipboardMode::Copy, "nobody listening").unwrap();
    }
}
