//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;
use std::str::FromStr;

use super::defaults::clamp_queue_capacity;
use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::clipboard::{ClipboardMode, NONE_MODE};
use crate::engine::{EngineConfig, ENGINE_NAMES};

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [translation] section
    if let Some(section) = ini.section(Some("translation")) {
        if let Some(v) = section.get("source_lang") {
            config.translation.source_lang = non_empty("translation", "source_lang", v)?;
        }
        if let Some(v) = section.get("target_lang") {
            config.translation.target_lang = non_empty("translation", "target_lang", v)?;
        }
        if let Some(v) = section.get("engines") {
            config.translation.engines = parse_engines(v)?;
        }
        if let Some(v) = section.get("timeout") {
            let timeout: u64 = parse_number(
                "translation",
                "timeout",
                v,
                "must be a positive integer (seconds)",
            )?;
            if timeout == 0 {
                return Err(invalid(
                    "translation",
                    "timeout",
                    v,
                    "must be a positive integer (seconds)",
                ));
            }
            config.translation.timeout = timeout;
        }
        if let Some(v) = section.get("google_url") {
            config.translation.google_url = non_empty("translation", "google_url", v)?;
        }
        if let Some(v) = section.get("libretranslate_url") {
            config.translation.libretranslate_url =
                non_empty("translation", "libretranslate_url", v)?;
        }
        if let Some(v) = section.get("libretranslate_api_key") {
            let v = v.trim();
            if !v.is_empty() {
                config.translation.libretranslate_api_key = Some(v.to_string());
            }
        }
    }

    // [clipboard] section
    if let Some(section) = ini.section(Some("clipboard")) {
        if let Some(v) = section.get("mode") {
            config.clipboard.mode = parse_mode(v)?;
        }
        if let Some(v) = section.get("buffer_ms") {
            config.clipboard.buffer_ms =
                parse_number("clipboard", "buffer_ms", v, "must be a non-negative integer (ms)")?;
        }
        if let Some(v) = section.get("poll_interval_ms") {
            let interval: u64 = parse_number(
                "clipboard",
                "poll_interval_ms",
                v,
                "must be a positive integer (ms)",
            )?;
            if interval == 0 {
                return Err(invalid(
                    "clipboard",
                    "poll_interval_ms",
                    v,
                    "must be a positive integer (ms)",
                ));
            }
            config.clipboard.poll_interval_ms = interval;
        }
        if let Some(v) = section.get("overwrite") {
            config.clipboard.overwrite = parse_bool(v);
        }
        if let Some(v) = section.get("join_lines") {
            config.clipboard.join_lines = parse_bool(v);
        }
    }

    // [worker] section
    if let Some(section) = ini.section(Some("worker")) {
        if let Some(v) = section.get("queue_capacity") {
            let capacity: usize =
                parse_number("worker", "queue_capacity", v, "must be a positive integer")?;
            config.worker.queue_capacity = clamp_queue_capacity(capacity);
        }
        if let Some(v) = section.get("restart_delay_ms") {
            config.worker.restart_delay_ms = parse_number(
                "worker",
                "restart_delay_ms",
                v,
                "must be a non-negative integer (ms)",
            )?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

/// Parse a clipboard mode name, accepting `none`.
fn parse_mode(value: &str) -> Result<Option<ClipboardMode>, ConfigFileError> {
    if value.trim().eq_ignore_ascii_case(NONE_MODE) {
        return Ok(None);
    }
    ClipboardMode::from_str(value).map(Some).map_err(|_| {
        invalid(
            "clipboard",
            "mode",
            value,
            "must be one of: copy, select, findbuf, none",
        )
    })
}

/// Parse a comma-separated engine list, keeping order and dropping duplicates.
fn parse_engines(value: &str) -> Result<Vec<String>, ConfigFileError> {
    let mut engines: Vec<String> = Vec::new();
    for name in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let engine = EngineConfig::from_str(name).map_err(|_| {
            invalid(
                "translation",
                "engines",
                value,
                &format!("unknown engine '{}', expected: {}", name, ENGINE_NAMES.join(", ")),
            )
        })?;
        let canonical = engine.name().to_string();
        if !engines.contains(&canonical) {
            engines.push(canonical);
        }
    }

    if engines.is_empty() {
        return Err(invalid(
            "translation",
            "engines",
            value,
            "at least one engine is required",
        ));
    }
    Ok(engines)
}

fn parse_number<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

fn non_empty(section: &str, key: &str, value: &str) -> Result<String, ConfigFileError> {
    let v = value.trim();
    if v.is_empty() {
        Err(invalid(section, key, value, "must not be empty"))
    } else {
        Ok(v.to_string())
    }
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
