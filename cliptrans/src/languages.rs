//! Language table and language-pair helpers.

/// Code meaning "detect the source language".
pub const AUTO: &str = "auto";

/// Display names and language codes, in menu order.
pub const LANGUAGES: &[(&str, &str)] = &[
    ("Auto", "auto"),
    ("Arabic", "ar"),
    ("Chinese", "zh-CN"),
    ("English", "en"),
    ("Esperanto", "eo"),
    ("French", "fr"),
    ("German", "de"),
    ("Greek", "el"),
    ("Italian", "it"),
    ("Japanese", "ja"),
    ("Korean", "ko"),
    ("Latin", "la"),
    ("Portuguese", "pt-PT"),
    ("Russian", "ru"),
    ("Spanish", "es"),
];

/// Display name for a language code.
pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(_, c)| c.eq_ignore_ascii_case(code))
        .map(|(name, _)| *name)
}

/// Language code for a display name or code (case-insensitive).
pub fn language_code(name_or_code: &str) -> Option<&'static str> {
    let needle = name_or_code.trim();
    LANGUAGES
        .iter()
        .find(|(name, code)| name.eq_ignore_ascii_case(needle) || code.eq_ignore_ascii_case(needle))
        .map(|(_, code)| *code)
}

/// Resolve a target language.
///
/// A target cannot be `auto`; it becomes English for Japanese sources and
/// Japanese otherwise.
pub fn resolve_target<'a>(source: &str, target: &'a str) -> &'a str {
    if target != AUTO {
        target
    } else if source == "ja" {
        "en"
    } else {
        "ja"
    }
}

/// Exchange source and target, re-resolving an `auto` source that lands in
/// the target slot.
pub fn swap(source: &str, target: &str) -> (String, String) {
    let new_target = resolve_target(target, source);
    (target.to_string(), new_target.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_name_lookup() {
        assert_eq!(language_name("ja"), Some("Japanese"));
        assert_eq!(language_name("zh-cn"), Some("Chinese"));
        assert_eq!(language_name("xx"), None);
    }

    #[test]
    fn test_language_code_accepts_names_and_codes() {
        assert_eq!(language_code("German"), Some("de"));
        assert_eq!(language_code("de"), Some("de"));
        assert_eq!(language_code(" portuguese "), Some("pt-PT"));
        assert_eq!(language_code("Klingon"), None);
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("en", "fr"), "fr");
        assert_eq!(resolve_target("ja", "auto"), "en");
        assert_eq!(resolve_target("en", "auto"), "ja");
        assert_eq!(resolve_target("auto", "auto"), "ja");
    }

    #[test]
    fn test_swap() {
        assert_eq!(swap("en", "ja"), ("ja".to_string(), "en".to_string()));
        // auto cannot become a target
        assert_eq!(swap("auto", "ja"), ("ja".to_string(), "en".to_string()));
        assert_eq!(swap("auto", "fr"), ("fr".to_string(), "ja".to_string()));
    }
}
