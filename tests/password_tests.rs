// Tests for the daily-rotating password.
//
// The password is a pure function of the date: "meeting" + zero-padded
// month + zero-padded day. Validation is exact and case-sensitive.

use chrono::NaiveDate;
use voice_minutes::auth::{expected_password, validate};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn password_follows_meeting_mmdd_format() {
    assert_eq!(expected_password(date(2024, 2, 3)), "meeting0203");
    assert_eq!(expected_password(date(2024, 8, 15)), "meeting0815");
    assert_eq!(expected_password(date(2024, 12, 31)), "meeting1231");
}

#[test]
fn password_is_twelve_chars_and_prefixed() {
    for (y, m, d) in [(2024, 1, 1), (2024, 6, 9), (2025, 11, 30)] {
        let password = expected_password(date(y, m, d));
        assert_eq!(password.len(), 12, "password for {y}-{m}-{d}");
        assert!(password.starts_with("meeting"));
    }
}

#[test]
fn different_days_yield_different_passwords() {
    assert_ne!(
        expected_password(date(2024, 2, 3)),
        expected_password(date(2024, 2, 4))
    );
    assert_ne!(
        expected_password(date(2024, 2, 3)),
        expected_password(date(2024, 3, 3))
    );
    // Documented limitation: the year is not part of the password
    assert_eq!(
        expected_password(date(2024, 2, 3)),
        expected_password(date(2025, 2, 3))
    );
}

#[test]
fn validate_accepts_todays_password_only() {
    assert!(validate("meeting0203", date(2024, 2, 3)));
    assert!(!validate("meeting0203", date(2024, 2, 4)));
}

#[test]
fn validate_is_case_sensitive_and_exact() {
    assert!(!validate("Meeting0203", date(2024, 2, 3)));
    assert!(!validate("MEETING0203", date(2024, 2, 3)));
    assert!(!validate(" meeting0203", date(2024, 2, 3)));
    assert!(!validate("meeting0203 ", date(2024, 2, 3)));
    assert!(!validate("", date(2024, 2, 3)));
}
