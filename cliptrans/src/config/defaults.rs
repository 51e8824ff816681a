//! Default values and constants for all configuration settings.
//!
//! Contains all `DEFAULT_*` constants and the `ConfigFile::default()`
//! implementation.

use super::file::config_directory;
use super::settings::*;
use crate::clipboard::ClipboardMode;
use crate::engine::{DEFAULT_GOOGLE_URL, DEFAULT_LIBRETRANSLATE_URL};

// =============================================================================
// [translation]
// =============================================================================

/// Default source language (auto-detect).
pub const DEFAULT_SOURCE_LANG: &str = "auto";

/// Default target language.
pub const DEFAULT_TARGET_LANG: &str = "ja";

/// Default engine preference order.
pub const DEFAULT_ENGINES: &[&str] = &["google", "libretranslate"];

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

// =============================================================================
// [clipboard]
// =============================================================================

/// Default debounce time in milliseconds.
pub const DEFAULT_BUFFER_MS: u64 = 500;

/// Default system clipboard poll interval in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

// =============================================================================
// [worker]
// =============================================================================

/// Default request queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1;

/// Minimum request queue capacity.
pub const MIN_QUEUE_CAPACITY: usize = 1;

/// Default engine restart delay in milliseconds.
pub const DEFAULT_RESTART_DELAY_MS: u64 = 1000;

// =============================================================================
// [logging]
// =============================================================================

/// Default log file name inside the config directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "cliptrans.log";

/// Clamps queue capacity to the minimum and logs a warning if clamped.
pub(super) fn clamp_queue_capacity(value: usize) -> usize {
    if value < MIN_QUEUE_CAPACITY {
        tracing::warn!(
            requested = value,
            min = MIN_QUEUE_CAPACITY,
            "queue_capacity below minimum, clamping to {}",
            MIN_QUEUE_CAPACITY
        );
        MIN_QUEUE_CAPACITY
    } else {
        value
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            translation: TranslationSettings {
                source_lang: DEFAULT_SOURCE_LANG.to_string(),
                target_lang: DEFAULT_TARGET_LANG.to_string(),
                engines: DEFAULT_ENGINES.iter().map(|s| s.to_string()).collect(),
                timeout: DEFAULT_TIMEOUT_SECS,
                google_url: DEFAULT_GOOGLE_URL.to_string(),
                libretranslate_url: DEFAULT_LIBRETRANSLATE_URL.to_string(),
                libretranslate_api_key: None,
            },
            clipboard: ClipboardSettings {
                mode: Some(ClipboardMode::platform_default()),
                buffer_ms: DEFAULT_BUFFER_MS,
                poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
                overwrite: false,
                join_lines: true,
            },
            worker: WorkerSettings {
                queue_capacity: DEFAULT_QUEUE_CAPACITY,
                restart_delay_ms: DEFAULT_RESTART_DELAY_MS,
            },
            logging: LoggingSettings {
                file: config_directory().join(DEFAULT_LOG_FILE_NAME),
            },
        }
    }
}
