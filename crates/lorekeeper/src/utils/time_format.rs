use chrono::{DateTime, Local, TimeZone};

pub const STANDARD_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time as stored in every `created_at` / `updated_at` column.
pub fn now_standard_string() -> String {
    to_standard_string(Local::now())
}

pub fn to_standard_string<Tz: TimeZone>(time: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format(STANDARD_FORMAT).to_string()
}
