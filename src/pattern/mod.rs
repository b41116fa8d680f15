//! Filter pattern parsing and matching
//!
//! A filter pattern is a plain string with two interpretations: a literal
//! matched by case-insensitive containment, or — when written `/body/flags` —
//! a regular expression compiled case-insensitive by default.

pub mod factory;
pub mod matcher;
pub mod traits;

pub use factory::{compile_pattern, compile_patterns, parse_regex_form};
pub use matcher::{LiteralPattern, Matchers, RegexPattern};
pub use traits::TextMatcher;
