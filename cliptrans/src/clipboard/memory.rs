//! In-process clipboard backend.

use super::{ChangeListener, ChangeSource, ClipboardBackend, ClipboardError, ClipboardMode};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio_util::sync::CancellationToken;

/// Clipboard held in memory.
///
/// Every successful [`write`](ClipboardBackend::write) synchronously notifies
/// the attached listener, the way a toolkit clipboard emits its `changed`
/// signal from inside `setText`. This makes it both a backend and a
/// [`ChangeSource`], and is used for stdin-driven operation and tests.
///
/// The listener is held weakly so a monitor that owns this backend does not
/// form a reference cycle with it.
pub struct MemoryClipboard {
    modes: Vec<ClipboardMode>,
    buffers: Mutex<HashMap<ClipboardMode, String>>,
    listener: RwLock<Option<Weak<dyn ChangeListener>>>,
}

impl MemoryClipboard {
    /// Create a clipboard supporting the given modes.
    pub fn new(modes: &[ClipboardMode]) -> Self {
        Self {
            modes: modes.to_vec(),
            buffers: Mutex::new(HashMap::new()),
            listener: RwLock::new(None),
        }
    }

    /// Create a clipboard supporting every mode.
    pub fn with_all_modes() -> Self {
        Self::new(&ClipboardMode::ALL)
    }

    fn check(&self, mode: ClipboardMode) -> Result<(), ClipboardError> {
        if self.modes.contains(&mode) {
            Ok(())
        } else {
            Err(ClipboardError::Unsupported(mode))
        }
    }

    fn notify(&self, mode: ClipboardMode) {
        let listener = self.listener.read().as_ref().and_then(Weak::upgrade);
        if let Some(listener) = listener {
            listener.on_change(mode);
        }
    }
}

impl Default for MemoryClipboard {
    fn default() -> Self {
        Self::with_all_modes()
    }
}

impl ClipboardBackend for MemoryClipboard {
    fn supported_modes(&self) -> Vec<ClipboardMode> {
        self.modes.clone()
    }

    fn read(&self, mode: ClipboardMode) -> Result<String, ClipboardError> {
        self.check(mode)?;
        Ok(self.buffers.lock().get(&mode).cloned().unwrap_or_default())
    }

    fn write(&self, mode: ClipboardMode, text: &str) -> Result<(), ClipboardError> {
        self.check(mode)?;
        // Release the buffer lock before notifying; the listener reads back.
        self.buffers.lock().insert(mode, text.to_string());
        self.notify(mode);
        Ok(())
    }
}

impl ChangeSource for MemoryClipboard {
    fn attach(&self, listener: Arc<dyn ChangeListener>, _shutdown: CancellationToken) {
        *self.listener.write() = Some(Arc::downgrade(&listener));
    }
}
