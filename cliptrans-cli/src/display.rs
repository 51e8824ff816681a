//! Console display surface.
//!
//! Prints source and target text to stdout so the output can be piped.

use cliptrans::languages::language_name;
use cliptrans::pipeline::DisplaySurface;
use std::io::{self, Write};

/// A [`DisplaySurface`] that writes to stdout with a fixed language pair.
pub struct ConsoleDisplay {
    source_lang: String,
    target_lang: String,
    show_source: bool,
}

impl ConsoleDisplay {
    pub fn new(source_lang: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            show_source: true,
        }
    }

    /// Print only translations.
    pub fn quiet(mut self) -> Self {
        self.show_source = false;
        self
    }

    /// One-line description of the language pair, e.g. `English -> Japanese`.
    pub fn describe(&self) -> String {
        format!(
            "{} -> {}",
            describe_language(&self.source_lang),
            describe_language(&self.target_lang)
        )
    }
}

fn describe_language(code: &str) -> String {
    match language_name(code) {
        Some(name) => name.to_string(),
        None => code.to_string(),
    }
}

fn emit(prefix: &str, text: &str) {
    let mut stdout = io::stdout().lock();
    // A closed pipe is not worth taking the pipeline down for
    let _ = writeln!(stdout, "{}{}", prefix, text);
    let _ = stdout.flush();
}

impl DisplaySurface for ConsoleDisplay {
    fn set_source_text(&self, text: &str) {
        if self.show_source {
            emit("> ", text);
        }
    }

    fn set_target_text(&self, text: &str) {
        if text.is_empty() {
            emit("! ", "(translation failed)");
        } else {
            emit("", text);
        }
    }

    fn languages(&self) -> (String, String) {
        (self.source_lang.clone(), self.target_lang.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_languages_pass_through() {
        let display = ConsoleDisplay::new("auto", "ja");
        assert_eq!(display.languages(), ("auto".to_string(), "ja".to_string()));
    }

    #[test]
    fn test_describe_uses_language_names() {
        let display = ConsoleDisplay::new("en", "xx-unknown");
        assert_eq!(display.describe(), "English -> xx-unknown");
    }
}
