use chrono::{Datelike, NaiveDate};

/// Password prefix; the rest is the zero-padded month and day.
const PREFIX: &str = "meeting";

/// Compute the expected password for a date, e.g. 2024-02-03 -> "meeting0203".
///
/// The format is date-derived and predictable. The configured seed is not
/// mixed in yet; it is reserved for future obfuscation, and the trade-off
/// (simplicity over secrecy) is deliberate for this bot.
pub fn expected_password(date: NaiveDate) -> String {
    format!("{}{:02}{:02}", PREFIX, date.month(), date.day())
}

/// Exact, case-sensitive comparison. Malformed input simply fails equality.
pub fn validate(candidate: &str, date: NaiveDate) -> bool {
    candidate == expected_password(date)
}
