//! Factory functions for creating pattern matchers
//!
//! Raw filter strings come straight from user input. A string shaped like
//! `/body/` or `/body/flags` compiles to a regular expression; everything else
//! is a case-insensitive literal. Both variants match case-insensitively by
//! default.

use crate::error::Result;
use crate::pattern::matcher::{LiteralPattern, Matchers, RegexPattern};
use crate::pattern::traits::TextMatcher;
use regex::RegexBuilder;
use tracing::{debug, warn};

/// Flag letters accepted after the closing `/` of a regex-form pattern.
///
/// `i`, `m`, `s`, `x` map to engine options; `g`, `u`, `y` exist only in
/// JavaScript regexes and are accepted but ignored.
const KNOWN_FLAGS: &str = "imsxguy";

/// Minimum length for a string to qualify as a regex-form pattern.
/// `"/"` and `"//"` are treated as (pathological) literals.
const MIN_REGEX_FORM_LEN: usize = 3;

/// Split a raw pattern into regex body and flags if it has regex form.
///
/// Regex form requires a leading `/`, a later `/` with a non-empty body
/// between, and a trailing segment consisting only of known flag letters
/// (possibly empty). Returns `None` for anything else, which makes the
/// pattern a literal.
pub fn parse_regex_form(raw: &str) -> Option<(&str, &str)> {
    if raw.len() < MIN_REGEX_FORM_LEN || !raw.starts_with('/') {
        return None;
    }
    let rest = &raw[1..];
    let idx = rest.rfind('/')?;
    if idx == 0 {
        // Empty body, e.g. "//i"
        return None;
    }
    let (body, flags) = (&rest[..idx], &rest[idx + 1..]);
    if !flags.chars().all(|c| KNOWN_FLAGS.contains(c)) {
        return None;
    }
    Some((body, flags))
}

/// Compile a single raw pattern string into a matcher.
///
/// Returns an error only for a regex-form pattern whose body fails to
/// compile; literals cannot fail.
pub fn compile_pattern(raw: &str) -> Result<Box<dyn TextMatcher>> {
    match parse_regex_form(raw) {
        Some((body, flags)) => {
            let mut builder = RegexBuilder::new(body);
            // Case-insensitive by default, like the literal variant
            builder.case_insensitive(true);
            for flag in flags.chars() {
                match flag {
                    'i' => {
                        builder.case_insensitive(true);
                    }
                    'm' => {
                        builder.multi_line(true);
                    }
                    's' => {
                        builder.dot_matches_new_line(true);
                    }
                    'x' => {
                        builder.ignore_whitespace(true);
                    }
                    other => {
                        debug!(pattern = raw, flag = %other, "ignoring JavaScript-only regex flag");
                    }
                }
            }
            let regex = builder.build()?;
            Ok(Box::new(RegexPattern { regex }))
        }
        None => Ok(Box::new(LiteralPattern::new(raw))),
    }
}

/// Compile a list of raw patterns into an OR-collection.
///
/// An individually invalid regex is logged and skipped so one bad filter
/// never disables the rest of the list.
pub fn compile_patterns(raw_patterns: &[String]) -> Matchers {
    let mut matchers: Vec<Box<dyn TextMatcher>> = Vec::with_capacity(raw_patterns.len());
    for raw in raw_patterns {
        match compile_pattern(raw) {
            Ok(matcher) => matchers.push(matcher),
            Err(e) => {
                warn!(pattern = %raw, error = %e, "skipping invalid filter pattern");
            }
        }
    }
    Matchers::new(matchers)
}
