//! Key pattern inference
//!
//! Collapses concrete keys such as `user:123` into patterns such as
//! `user:<*>`. Rules are tried in a fixed order and the first one that
//! applies wins:
//!
//! 1. **Prefix**: the first configured prefix the key starts with gives
//!    `prefix<*>`.
//! 2. **Separator**: the key is cut after the Nth non-overlapping occurrence
//!    of the separator (N = max depth, or fewer if the key has fewer) giving
//!    `head<*>`.
//! 3. **Digits**: every run of ASCII digits is replaced by `<N>`. A key with
//!    no digits is returned unchanged.

use crate::error::ConfigError;
use regex::Regex;
use std::sync::LazyLock;

/// Placeholder appended after a matched prefix or separator
pub const WILDCARD: &str = "<*>";

/// Placeholder substituted for each run of digits
pub const NUMBER_PLACEHOLDER: &str = "<N>";

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("Invalid digit regex"));

/// A non-empty separator with a depth bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Separator {
    token: String,
    max_depth: usize,
}

impl Separator {
    /// Create a separator; empty tokens and a zero depth are rejected
    pub fn new(token: impl Into<String>, max_depth: usize) -> Result<Self, ConfigError> {
        let token = token.into();
        if token.is_empty() {
            return Err(ConfigError::EmptySeparator);
        }
        if max_depth == 0 {
            return Err(ConfigError::InvalidSeparatorDepth { depth: max_depth });
        }
        Ok(Self { token, max_depth })
    }

    /// The separator string
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Maximum number of occurrences kept in the pattern head
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Byte offset just past the last of up to `max_depth` occurrences
    ///
    /// Occurrences are found left to right without overlap. Returns `None`
    /// when the separator does not occur at all.
    pub fn split_point(&self, key: &str) -> Option<usize> {
        key.match_indices(self.token.as_str())
            .take(self.max_depth)
            .last()
            .map(|(idx, m)| idx + m.len())
    }
}

/// Generalization rules for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternRules {
    prefixes: Vec<String>,
    separator: Option<Separator>,
}

impl PatternRules {
    /// Create rules from explicit prefixes (tried in order) and an optional separator
    pub fn new(prefixes: Vec<String>, separator: Option<Separator>) -> Self {
        Self {
            prefixes,
            separator,
        }
    }

    /// Configured prefixes
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Configured separator
    pub fn separator(&self) -> Option<&Separator> {
        self.separator.as_ref()
    }

    /// Derive the pattern for `key`
    pub fn generalize(&self, key: &str) -> String {
        if let Some(prefix) = self.prefixes.iter().find(|p| key.starts_with(p.as_str())) {
            return format!("{}{}", prefix, WILDCARD);
        }

        if let Some(end) = self.separator.as_ref().and_then(|s| s.split_point(key)) {
            return format!("{}{}", &key[..end], WILDCARD);
        }

        replace_numbers(key)
    }
}

/// Replace every maximal run of ASCII digits with `<N>`
pub fn replace_numbers(key: &str) -> String {
    DIGIT_RUN.replace_all(key, NUMBER_PLACEHOLDER).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(prefixes: &[&str], separator: Option<(&str, usize)>) -> PatternRules {
        PatternRules::new(
            prefixes.iter().map(|p| p.to_string()).collect(),
            separator.map(|(token, depth)| Separator::new(token, depth).unwrap()),
        )
    }

    #[test]
    fn test_prefix_wins_over_separator() {
        let rules = rules(&["user:"], Some((":", 1)));
        assert_eq!(rules.generalize("user:123"), "user:<*>");
    }

    #[test]
    fn test_first_matching_prefix_wins() {
        let ordered = rules(&["session", "session:web"], None);
        assert_eq!(ordered.generalize("session:web:9"), "session<*>");

        let reversed = rules(&["session:web", "session"], None);
        assert_eq!(reversed.generalize("session:web:9"), "session:web<*>");
    }

    #[test]
    fn test_numeric_fallback() {
        let rules = PatternRules::default();
        assert_eq!(rules.generalize("session42abc7"), "session<N>abc<N>");
        assert_eq!(rules.generalize("2024-01-15"), "<N>-<N>-<N>");
    }

    #[test]
    fn test_no_digits_unchanged() {
        let rules = PatternRules::default();
        assert_eq!(rules.generalize("config"), "config");
        assert_eq!(rules.generalize(""), "");
    }

    #[test]
    fn test_non_ascii_digits_left_alone() {
        let rules = PatternRules::default();
        assert_eq!(rules.generalize("k٣"), "k٣");
    }

    #[test]
    fn test_bounded_depth() {
        let rules = rules(&[], Some((":", 2)));
        assert_eq!(rules.generalize("a:b:c:d"), "a:b:<*>");
    }

    #[test]
    fn test_fewer_occurrences_than_depth() {
        let rules = rules(&[], Some((":", 3)));
        assert_eq!(rules.generalize("a:b"), "a:<*>");
        assert_eq!(rules.generalize("a:b:"), "a:b:<*>");
    }

    #[test]
    fn test_depth_one_is_first_occurrence() {
        let rules = rules(&[], Some((":", 1)));
        assert_eq!(rules.generalize("order:77:items"), "order:<*>");
        assert_eq!(rules.generalize(":leading"), ":<*>");
    }

    #[test]
    fn test_multichar_separator_no_overlap() {
        let rules = rules(&[], Some(("::", 2)));
        assert_eq!(rules.generalize("a:::b::c"), "a:::b::<*>");
        assert_eq!(rules.generalize("a::::b"), "a::::<*>");
    }

    #[test]
    fn test_separator_miss_falls_back_to_numbers() {
        let rules = rules(&["cache:"], Some((":", 1)));
        assert_eq!(rules.generalize("tmp_file_42"), "tmp_file_<N>");
    }

    #[test]
    fn test_unicode_key_split() {
        let rules = rules(&[], Some(("→", 1)));
        assert_eq!(rules.generalize("ключ→значение"), "ключ→<*>");
    }

    #[test]
    fn test_separator_validation() {
        assert_eq!(Separator::new("", 1), Err(ConfigError::EmptySeparator));
        assert_eq!(
            Separator::new(":", 0),
            Err(ConfigError::InvalidSeparatorDepth { depth: 0 })
        );
        let sep = Separator::new("/", 4).unwrap();
        assert_eq!(sep.token(), "/");
        assert_eq!(sep.max_depth(), 4);
    }

    #[test]
    fn test_split_point() {
        let sep = Separator::new(":", 2).unwrap();
        assert_eq!(sep.split_point("a:b:c"), Some(4));
        assert_eq!(sep.split_point("abc"), None);
    }

    #[test]
    fn test_generalize_is_deterministic() {
        let rules = rules(&["x"], Some((":", 2)));
        for key in ["x1", "a:b:c", "n123m45", "plain"] {
            assert_eq!(rules.generalize(key), rules.generalize(key));
        }
    }
}
