use chrono::{DateTime, Datelike, FixedOffset};

/// ISO 8601 calendar date ("YYYY-MM-DD") in the commit's own offset.
pub fn day_key(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.format("%Y-%m-%d").to_string()
}

/// Month bucket ("YYYY-MM") in the commit's own offset.
pub fn month_key(timestamp: &DateTime<FixedOffset>) -> String {
    format!("{:04}-{:02}", timestamp.year(), timestamp.month())
}

/// English weekday name, matching the names used in output and exports.
pub fn weekday_name(timestamp: &DateTime<FixedOffset>) -> &'static str {
    crate::model::WEEKDAY_NAMES[timestamp.weekday().num_days_from_monday() as usize]
}

/// "HH:00" label for an hour-of-day bucket.
pub fn hour_label(hour: u32) -> String {
    format!("{hour:02}:00")
}
