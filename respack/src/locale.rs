//! Locale code validation.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LOCALE_PATTERN: Regex =
        Regex::new(r"^(?:default|[a-z]{2}(?:_[A-Z]{2})?)$").unwrap();
}

/// Marker for the unsuffixed, default-locale resource file.
pub const DEFAULT_LOCALE: &str = "default";

/// Determines whether `locale` is a valid locale code: a two-letter lowercase
/// language code, optionally qualified by an underscore and a two-letter
/// uppercase region code, or the literal default marker.
pub fn is_valid_locale(locale: &str) -> bool {
    LOCALE_PATTERN.is_match(locale)
}
