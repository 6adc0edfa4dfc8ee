//! Stream driver configuration: defaults, overridden from `PGN_*` environment
//! variables.

use std::env;

use tracing::warn;

use crate::annotation::ClockSyntax;
use crate::movetext::TokenizerKind;

/// What happens when one game fails to parse.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Strictness {
    /// Skip malformed header lines; emit games with a failed movetext parse
    /// without moves and with `parse_error` set.
    #[default]
    Lenient,
    /// Surface every failure to the caller as an iterator error.
    Strict,
}

impl Strictness {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "lenient" => Some(Self::Lenient),
            "strict" => Some(Self::Strict),
            other => parse_bool(other).map(|strict| if strict { Self::Strict } else { Self::Lenient }),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReaderConfig {
    pub strictness: Strictness,

    /// Emit a game whose header block is cut off by the end of input.
    pub emit_trailing_headers: bool,

    /// Header lines must close with `]` as well as open with `[`.
    pub require_closing_bracket: bool,

    pub clock_syntax: ClockSyntax,

    pub tokenizer: TokenizerKind,

    /// Games between progress reports; 0 disables them.
    pub progress_interval: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            strictness: Strictness::Lenient,
            emit_trailing_headers: true,
            require_closing_bracket: true,
            clock_syntax: ClockSyntax::Bracketed,
            tokenizer: TokenizerKind::Lexical,
            progress_interval: 10_000,
        }
    }
}

impl ReaderConfig {
    /// Defaults with `PGN_*` environment overrides applied.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            strictness: setting(&lookup, "PGN_STRICT", Strictness::parse)
                .unwrap_or(defaults.strictness),
            emit_trailing_headers: setting(&lookup, "PGN_EMIT_TRAILING_HEADERS", parse_bool)
                .unwrap_or(defaults.emit_trailing_headers),
            require_closing_bracket: setting(&lookup, "PGN_REQUIRE_CLOSING_BRACKET", parse_bool)
                .unwrap_or(defaults.require_closing_bracket),
            clock_syntax: setting(&lookup, "PGN_CLOCK_SYNTAX", ClockSyntax::parse)
                .unwrap_or(defaults.clock_syntax),
            tokenizer: setting(&lookup, "PGN_TOKENIZER", TokenizerKind::parse)
                .unwrap_or(defaults.tokenizer),
            progress_interval: setting(&lookup, "PGN_PROGRESS_INTERVAL", |v| v.trim().parse().ok())
                .unwrap_or(defaults.progress_interval),
        }
    }
}

fn setting<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let raw = lookup(key)?;
    let parsed = parse(&raw);
    if parsed.is_none() {
        warn!(key, value = %raw, "ignoring unrecognized setting");
    }
    parsed
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> ReaderConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ReaderConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        assert_eq!(config_from(&[]), ReaderConfig::default());
    }

    #[test]
    fn test_environment_overrides() {
        let config = config_from(&[
            ("PGN_STRICT", "1"),
            ("PGN_EMIT_TRAILING_HEADERS", "false"),
            ("PGN_REQUIRE_CLOSING_BRACKET", "no"),
            ("PGN_CLOCK_SYNTAX", "inline"),
            ("PGN_TOKENIZER", "library"),
            ("PGN_PROGRESS_INTERVAL", "500"),
        ]);

        assert_eq!(config.strictness, Strictness::Strict);
        assert!(!config.emit_trailing_headers);
        assert!(!config.require_closing_bracket);
        assert_eq!(config.clock_syntax, ClockSyntax::Inline);
        assert_eq!(config.tokenizer, TokenizerKind::Library);
        assert_eq!(config.progress_interval, 500);
    }

    #[test]
    fn test_unparseable_values_fall_back_to_defaults() {
        let config = config_from(&[
            ("PGN_STRICT", "sometimes"),
            ("PGN_PROGRESS_INTERVAL", "-3"),
            ("PGN_TOKENIZER", ""),
        ]);
        assert_eq!(config, ReaderConfig::default());
    }

    #[test]
    fn test_strictness_parse() {
        assert_eq!(Strictness::parse("Strict"), Some(Strictness::Strict));
        assert_eq!(Strictness::parse("lenient"), Some(Strictness::Lenient));
        assert_eq!(Strictness::parse("off"), Some(Strictness::Lenient));
        assert_eq!(Strictness::parse("maybe"), None);
    }
}
