//! Input Validation
//!
//! Cleans and checks user-supplied name fields.

use once_cell::sync::Lazy;
use regex::Regex;

/// Longest name accepted, in characters
pub const MAX_NAME_LENGTH: usize = 50;

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z\s\-']{1,50}$").expect("name pattern is valid"));

/// Trims surrounding whitespace and truncates to [`MAX_NAME_LENGTH`] characters.
pub fn sanitize_input(text: &str) -> String {
    text.trim().chars().take(MAX_NAME_LENGTH).collect()
}

/// Returns true if `text` is 1 to 50 letters, spaces, hyphens or apostrophes.
pub fn validate_input(text: &str) -> bool {
    NAME_PATTERN.is_match(text)
}
