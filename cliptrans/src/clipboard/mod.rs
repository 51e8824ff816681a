//! Clipboard abstraction and change monitoring.
//!
//! # Architecture
//!
//! - [`ClipboardBackend`]: read/write access to the host's clipboard buffers
//! - [`ChangeSource`]: something that reports "mode X changed" to a
//!   [`ChangeListener`]
//! - [`ChangeMonitor`]: the listener that filters by mode, suppresses our own
//!   writes and forwards genuine changes to the pipeline
//!
//! Backends:
//!
//! - [`ArboardClipboard`] + [`ClipboardWatcher`]: the system clipboard, polled
//! - [`MemoryClipboard`]: in-process buffer that notifies synchronously on write

mod arboard_backend;
mod memory;
mod mode;
mod monitor;
mod watcher;

pub use arboard_backend::ArboardClipboard;
pub use memory::MemoryClipboard;
pub use mode::{mode_name, ClipboardMode, ModeTable, NONE_MODE};
pub use monitor::ChangeMonitor;
pub use watcher::{ClipboardWatcher, DEFAULT_POLL_INTERVAL};

use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Clipboard errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
    /// Mode name unknown or not supported on this host
    #[error("Invalid clipboard mode ({0})")]
    InvalidMode(String),

    /// Backend cannot access the requested buffer
    #[error("Clipboard mode {0} is not supported by this backend")]
    Unsupported(ClipboardMode),

    /// Underlying clipboard access failed
    #[error("Clipboard access failed: {0}")]
    Backend(String),
}

/// Read/write access to clipboard buffers.
pub trait ClipboardBackend: Send + Sync {
    /// Modes this backend can read and write on the current host.
    fn supported_modes(&self) -> Vec<ClipboardMode>;

    /// Read the text held in `mode`. An empty buffer reads as `""`.
    fn read(&self, mode: ClipboardMode) -> Result<String, ClipboardError>;

    /// Replace the text held in `mode`.
    fn write(&self, mode: ClipboardMode, text: &str) -> Result<(), ClipboardError>;
}

/// Receiver of clipboard change notifications.
pub trait ChangeListener: Send + Sync {
    /// Called whenever the buffer for `mode` changed, for any mode.
    fn on_change(&self, mode: ClipboardMode);
}

/// Producer of clipboard change notifications.
pub trait ChangeSource: Send + Sync {
    /// Start delivering notifications to `listener` until `shutdown` is cancelled.
    fn attach(&self, listener: Arc<dyn ChangeListener>, shutdown: CancellationToken);
}
