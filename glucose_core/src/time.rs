//! Wall-clock helpers.
//!
//! Timestamps are interpreted purely by their `HH:MM` digits. Dates and
//! timezone suffixes are ignored, so all events of a day must share one
//! wall-clock frame.

use chrono::{NaiveDate, NaiveTime, Timelike};

/// Minutes since local midnight for a timestamp string.
///
/// Accepts ISO-like strings (`2024-01-15T14:30:00.000Z`, where characters
/// 11..16 hold `HH:MM`) and bare `HH:MM` strings. Anything else maps to 0.
pub fn minutes_of_day(timestamp: &str) -> i32 {
    let clock = if timestamp.len() >= 16 {
        timestamp.get(11..16)
    } else {
        timestamp.get(0..5)
    };

    match clock.and_then(|hm| NaiveTime::parse_from_str(hm, "%H:%M").ok()) {
        Some(t) => (t.hour() * 60 + t.minute()) as i32,
        None => {
            tracing::trace!("Unparseable timestamp {:?}, using minute 0", timestamp);
            0
        }
    }
}

/// Format minutes since midnight as `HH:MM` (1440 renders as `24:00`)
pub fn format_minutes(minute: i32) -> String {
    format!("{:02}:{:02}", minute.div_euclid(60), minute.rem_euclid(60))
}

/// Combine a calendar date with an `HH:MM` string into a journal timestamp
pub fn build_timestamp(date: NaiveDate, clock: &str) -> Option<String> {
    let time = NaiveTime::parse_from_str(clock.trim(), "%H:%M").ok()?;
    Some(date.and_time(time).format("%Y-%m-%dT%H:%M:00").to_string())
}

/// True if the timestamp's leading `YYYY-MM-DD` matches `date`
pub fn is_on_date(timestamp: &str, date: NaiveDate) -> bool {
    timestamp
        .get(0..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        == Some(date)
}
