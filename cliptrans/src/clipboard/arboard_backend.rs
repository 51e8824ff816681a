//! System clipboard backend built on `arboard`.

use super::{ClipboardBackend, ClipboardError, ClipboardMode};
use parking_lot::Mutex;

/// The host's clipboard.
///
/// `copy` maps to the regular clipboard on every platform. On Linux `select`
/// maps to the PRIMARY selection. arboard exposes no find pasteboard, so
/// `findbuf` is never reported as supported.
///
/// arboard does not deliver change notifications; pair this backend with a
/// [`ClipboardWatcher`](super::ClipboardWatcher).
pub struct ArboardClipboard {
    clipboard: Mutex<arboard::Clipboard>,
}

impl ArboardClipboard {
    /// Open the system clipboard.
    pub fn new() -> Result<Self, ClipboardError> {
        let clipboard = arboard::Clipboard::new().map_err(backend_error)?;
        tracing::debug!("Opened system clipboard");
        Ok(Self {
            clipboard: Mutex::new(clipboard),
        })
    }
}

impl std::fmt::Debug for ArboardClipboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArboardClipboard")
            .field("modes", &self.supported_modes())
            .finish()
    }
}

impl ClipboardBackend for ArboardClipboard {
    fn supported_modes(&self) -> Vec<ClipboardMode> {
        if cfg!(target_os = "linux") {
            vec![ClipboardMode::Copy, ClipboardMode::Select]
        } else {
            vec![ClipboardMode::Copy]
        }
    }

    fn read(&self, mode: ClipboardMode) -> Result<String, ClipboardError> {
        let mut clipboard = self.clipboard.lock();
        let result = match mode {
            ClipboardMode::Copy => clipboard.get_text(),
            #[cfg(target_os = "linux")]
            ClipboardMode::Select => {
                use arboard::{GetExtLinux, LinuxClipboardKind};
                clipboard
                    .get()
                    .clipboard(LinuxClipboardKind::Primary)
                    .text()
            }
            other => return Err(ClipboardError::Unsupported(other)),
        };

        match result {
            Ok(text) => Ok(text),
            // Empty buffer or non-text content
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(backend_error(e)),
        }
    }

    fn write(&self, mode: ClipboardMode, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard = self.clipboard.lock();
        match mode {
            ClipboardMode::Copy => clipboard.set_text(text).map_err(backend_error),
            #[cfg(target_os = "linux")]
            ClipboardMode::Select => {
                use arboard::{LinuxClipboardKind, SetExtLinux};
                clipboard
                    .set()
                    .clipboard(LinuxClipboardKind::Primary)
                    .text(text)
                    .map_err(backend_error)
            }
            other => Err(ClipboardError::Unsupported(other)),
        }
    }
}

fn backend_error(e: arboard::Error) -> ClipboardError {
    ClipboardError::Backend(e.to_string())
}
