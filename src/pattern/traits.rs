//! Core traits for pattern matching

use std::fmt::Debug;

/// Trait for text pattern matchers.
///
/// Implementations must be `Send + Sync` so compiled pattern sets can be
/// handed to spawned confirmation tasks.
pub trait TextMatcher: Debug + Send + Sync {
    /// Match a text value against this pattern
    fn text_match(&self, value: &str) -> bool;
}
