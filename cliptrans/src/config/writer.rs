//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;
use crate::clipboard::mode_name;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let api_key = config
        .translation
        .libretranslate_api_key
        .as_deref()
        .unwrap_or("");

    format!(
        r#"[translation]
; Source language code, or auto to detect (e.g. auto, en, ja, de, zh-CN)
source_lang = {}
; Target language code. auto picks en for Japanese sources and ja otherwise
target_lang = {}
; Translation engines to try, in order of preference:
;   google         - Google Translate public web endpoint (no key required)
;   libretranslate - LibreTranslate server (public instances need an API key)
engines = {}
; HTTP timeout in seconds (default: 5)
timeout = {}
; Google endpoint base URL
google_url = {}
; LibreTranslate server base URL (self-hosted servers work too)
libretranslate_url = {}
; LibreTranslate API key (leave empty for servers that do not need one)
libretranslate_api_key = {}

[clipboard]
; Clipboard buffer to watch:
;   copy    - regular clipboard (Ctrl+C)
;   select  - primary selection, translate on select (Linux)
;   findbuf - find pasteboard (macOS)
;   none    - do not watch the clipboard
mode = {}
; Wait this long after the first change of a burst before translating (default: 500)
; 0 translates every change immediately
buffer_ms = {}
; How often the system clipboard is checked for changes (default: 250)
poll_interval_ms = {}
; Write translations back to the clipboard (default: false)
overwrite = {}
; Join multi-line text into one line before translating (default: true)
join_lines = {}

[worker]
; Pending translations kept while one is in flight (default: 1)
; Older pending requests are dropped when the queue is full
queue_capacity = {}
; Delay before reconnecting a failed engine, in milliseconds (default: 1000)
restart_delay_ms = {}

[logging]
; Log file path (cleared at every start)
file = {}
"#,
        config.translation.source_lang,
        config.translation.target_lang,
        config.translation.engines.join(", "),
        config.translation.timeout,
        config.translation.google_url,
        config.translation.libretranslate_url,
        api_key,
        mode_name(config.clipboard.mode),
        config.clipboard.buffer_ms,
        config.clipboard.poll_interval_ms,
        config.clipboard.overwrite,
        config.clipboard.join_lines,
        config.worker.queue_capacity,
        config.worker.restart_delay_ms,
        path_to_string(&config.logging.file),
    )
}

/// Convert path to string, collapsing home dir to ~.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
