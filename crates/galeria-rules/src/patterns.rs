//! Text shapes recognised by the format rules.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `local@domain.tld`, no whitespace and a single `@`
    pub static ref EMAIL: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();

    /// Optional leading `+`, then at least 9 digits, spaces, hyphens or parentheses
    pub static ref PHONE: Regex = Regex::new(r"^[+]?[0-9\s\-\(\)]{9,}$").unwrap();

    /// Leading signed integer, the way browsers read `<input type=number>`
    static ref LEADING_INT: Regex = Regex::new(r"^[+-]?[0-9]+").unwrap();
}

pub fn is_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

pub fn is_phone(value: &str) -> bool {
    PHONE.is_match(value)
}

/// Integer prefix of `value`: `"17"` and `"17.9"` both give 17, `"abc"` gives `None`.
///
/// A digit run too long for `i64` saturates towards its sign.
pub fn leading_integer(value: &str) -> Option<i64> {
    let digits = LEADING_INT.find(value.trim())?.as_str();
    match digits.parse() {
        Ok(n) => Some(n),
        Err(_) if digits.starts_with('-') => Some(i64::MIN),
        Err(_) => Some(i64::MAX),
    }
}
