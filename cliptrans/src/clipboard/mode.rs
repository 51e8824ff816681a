//! Clipboard modes (which buffer is observed and written).

use std::fmt;
use std::str::FromStr;

use super::ClipboardError;

/// Name of the sentinel mode that disables clipboard reads and writes.
pub const NONE_MODE: &str = "none";

/// A clipboard buffer the host platform may provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClipboardMode {
    /// The regular copy/paste clipboard (all platforms).
    Copy,
    /// The X11/Wayland primary selection (mostly Linux).
    Select,
    /// The find pasteboard (macOS).
    FindBuffer,
}

impl ClipboardMode {
    /// All modes, in display order.
    pub const ALL: [ClipboardMode; 3] = [
        ClipboardMode::Copy,
        ClipboardMode::Select,
        ClipboardMode::FindBuffer,
    ];

    /// The mode's configuration name.
    pub fn name(&self) -> &'static str {
        match self {
            ClipboardMode::Copy => "copy",
            ClipboardMode::Select => "select",
            ClipboardMode::FindBuffer => "findbuf",
        }
    }

    /// Preferred trigger mode for this platform.
    ///
    /// Selecting text is the natural trigger on Linux; elsewhere only an
    /// explicit copy is available.
    pub fn platform_default() -> Self {
        if cfg!(target_os = "linux") {
            ClipboardMode::Select
        } else {
            ClipboardMode::Copy
        }
    }
}

impl fmt::Display for ClipboardMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ClipboardMode {
    type Err = ClipboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "copy" | "clipboard" => Ok(ClipboardMode::Copy),
            "select" | "selection" | "primary" => Ok(ClipboardMode::Select),
            "findbuf" | "findbuffer" => Ok(ClipboardMode::FindBuffer),
            _ => Err(ClipboardError::InvalidMode(s.to_string())),
        }
    }
}

/// Mapping from mode names to the modes a backend supports.
///
/// Always contains the `none` sentinel, which maps to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeTable {
    modes: Vec<ClipboardMode>,
}

impl ModeTable {
    /// Build a table from a backend's supported modes.
    pub fn new(supported: &[ClipboardMode]) -> Self {
        let mut modes: Vec<ClipboardMode> = supported.to_vec();
        modes.sort();
        modes.dedup();
        Self { modes }
    }

    /// Resolve a mode name.
    ///
    /// Returns `Ok(None)` for the `none` sentinel and
    /// [`ClipboardError::InvalidMode`] for names that are unknown or not
    /// supported by the backend.
    pub fn lookup(&self, name: &str) -> Result<Option<ClipboardMode>, ClipboardError> {
        if name.trim().eq_ignore_ascii_case(NONE_MODE) {
            return Ok(None);
        }
        let mode: ClipboardMode = name.parse()?;
        if self.modes.contains(&mode) {
            Ok(Some(mode))
        } else {
            Err(ClipboardError::InvalidMode(name.to_string()))
        }
    }

    /// Returns true if the backend supports `mode`.
    pub fn supports(&self, mode: ClipboardMode) -> bool {
        self.modes.contains(&mode)
    }

    /// Supported modes (without the sentinel).
    pub fn modes(&self) -> &[ClipboardMode] {
        &self.modes
    }

    /// All selectable names, including `none`.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.modes.iter().map(ClipboardMode::name).collect();
        names.push(NONE_MODE);
        names
    }
}

/// Display name for an optional mode.
pub fn mode_name(mode: Option<ClipboardMode>) -> &'static str {
    mode.map(|m| m.name()).unwrap_or(NONE_MODE)
}
