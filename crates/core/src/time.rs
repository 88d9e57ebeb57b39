#![forbid(unsafe_code)]

use chrono::{DateTime, Local, TimeZone, Utc};

pub const READABLE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders event timestamps for display. Absent timestamps render as an empty string.
pub trait TimestampFormatter: Send + Sync {
    fn format(&self, ts: Option<&DateTime<Utc>>) -> String;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTime;

/// UTC wall-clock time; stable output regardless of host timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct UtcTime;

pub fn readable_in<Tz: TimeZone>(ts: Option<&DateTime<Utc>>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match ts {
        Some(t) => t.with_timezone(tz).format(READABLE_FORMAT).to_string(),
        None => String::new(),
    }
}

impl TimestampFormatter for LocalTime {
    fn format(&self, ts: Option<&DateTime<Utc>>) -> String { readable_in(ts, &Local) }
}

impl TimestampFormatter for UtcTime {
    fn format(&self, ts: Option<&DateTime<Utc>>) -> String { readable_in(ts, &Utc) }
}
