//! Common types and utilities shared across CLI commands.

use cliptrans::clipboard::{ClipboardMode, NONE_MODE};
use cliptrans::config::ConfigFile;
use cliptrans::languages::{language_code, swap};

use crate::error::CliError;

/// Resolve the language pair: CLI > config, then optionally swapped.
///
/// Display names (`English`) are accepted alongside codes; unknown values
/// are passed to the engine unchanged.
pub fn resolve_languages(
    source: Option<&str>,
    target: Option<&str>,
    reverse: bool,
    config: &ConfigFile,
) -> (String, String) {
    let source = normalize_language(source.unwrap_or(&config.translation.source_lang));
    let target = normalize_language(target.unwrap_or(&config.translation.target_lang));
    if reverse {
        swap(&source, &target)
    } else {
        (source, target)
    }
}

fn normalize_language(value: &str) -> String {
    match language_code(value) {
        Some(code) => code.to_string(),
        None => value.trim().to_string(),
    }
}

/// Parse a `--mode` value, accepting `none`.
pub fn parse_mode(value: &str) -> Result<Option<ClipboardMode>, CliError> {
    if value.trim().eq_ignore_ascii_case(NONE_MODE) {
        return Ok(None);
    }
    value.parse::<ClipboardMode>().map(Some).map_err(|_| {
        CliError::Config(format!(
            "Unknown clipboard mode '{}'. Use 'cliptrans modes' to list available modes.",
            value
        ))
    })
}
