use time::{
    Date, OffsetDateTime, Time, format_description::well_known::Rfc3339, macros::format_description,
};

pub mod auth;
pub mod chat;
pub mod court;
pub mod game;
pub mod health;
pub mod search;
pub mod sse;
pub mod validation;

pub(crate) fn format_timestamp(timestamp: OffsetDateTime) -> String {
    timestamp
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

pub(crate) fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| "invalid-date".into())
}

pub(crate) fn format_time(time: Time) -> String {
    time.format(format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_else(|_| "invalid-time".into())
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime, time};

    use super::*;

    #[test]
    fn calendar_values_use_iso_layout() {
        assert_eq!(format_date(date!(2025 - 03 - 01)), "2025-03-01");
        assert_eq!(format_time(time!(9:05)), "09:05:00");
        assert_eq!(
            format_timestamp(datetime!(2025-03-01 10:00:00 UTC)),
            "2025-03-01T10:00:00Z"
        );
    }
}
