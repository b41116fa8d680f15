//! Text pattern matching implementations

use crate::pattern::traits::TextMatcher;
use regex::Regex;

/// Pattern for case-insensitive substring containment.
///
/// This is the literal variant of a filter pattern: the stored token matches
/// any text that contains it, ignoring case. Lowercasing is Unicode-aware to
/// match the behavior users see in the popup.
#[derive(Debug, Clone)]
pub struct LiteralPattern {
    /// The token to search for
    pub token: String,
    /// Pre-lowercased token, computed once at build time
    lowered: String,
}

impl LiteralPattern {
    /// Create a literal containment pattern from a raw token
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        let lowered = token.to_lowercase();
        Self { token, lowered }
    }
}

impl TextMatcher for LiteralPattern {
    fn text_match(&self, value: &str) -> bool {
        value.to_lowercase().contains(&self.lowered)
    }
}

/// Pattern for regular expression search matching
#[derive(Debug)]
pub struct RegexPattern {
    /// The compiled regular expression
    pub regex: Regex,
}

impl TextMatcher for RegexPattern {
    fn text_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// Collection of text matchers with OR logic.
///
/// An empty collection matches nothing, which is what a user with no filters
/// configured expects from a sweep.
#[derive(Debug, Default)]
pub struct Matchers {
    matchers: Vec<Box<dyn TextMatcher>>,
}

impl Matchers {
    /// Create a new collection of matchers (OR logic)
    pub fn new(matchers: Vec<Box<dyn TextMatcher>>) -> Self {
        Self { matchers }
    }

    /// Number of compiled patterns in the collection
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// Returns true if no patterns are present
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl TextMatcher for Matchers {
    fn text_match(&self, value: &str) -> bool {
        self.matchers.iter().any(|m| m.text_match(value))
    }
}
