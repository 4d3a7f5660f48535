//! Validation helpers for DTOs.

use time::{Date, Time, macros::format_description};
use validator::ValidationError;

/// Parse a calendar date in `YYYY-MM-DD` form.
pub fn parse_game_date(value: &str) -> Option<Date> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).ok()
}

/// Parse a 24-hour clock time in `HH:MM` form.
pub fn parse_game_time(value: &str) -> Option<Time> {
    Time::parse(
        value.trim(),
        format_description!("[hour repr:24]:[minute]"),
    )
    .ok()
}

/// Rejects chat messages that are blank once surrounding whitespace is removed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use time::macros::{date, time};

    use super::*;

    #[test]
    fn dates_must_be_calendar_valid() {
        assert_eq!(parse_game_date("2025-03-01"), Some(date!(2025 - 03 - 01)));
        assert_eq!(parse_game_date("2025-02-30"), None);
        assert_eq!(parse_game_date("03/01/2025"), None);
        assert_eq!(parse_game_date(""), None);
    }

    #[test]
    fn times_use_twenty_four_hour_clock() {
        assert_eq!(parse_game_time("10:00"), Some(time!(10:00)));
        assert_eq!(parse_game_time("23:59"), Some(time!(23:59)));
        assert_eq!(parse_game_time("24:00"), None);
        assert_eq!(parse_game_time("10am"), None);
        assert_eq!(parse_game_time("10:00:00"), None);
    }

    #[test]
    fn blank_text_is_rejected() {
        assert!(validate_not_blank("hello").is_ok());
        assert!(validate_not_blank("   ").is_err());
    }
}
