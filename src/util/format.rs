// Display helpers for clip metadata

use chrono::{DateTime, Local, Utc};

/// Format a clip length as `"{m}m{s}s"`, or `"{s}s"` under a minute.
/// Fractional seconds are truncated; negative or non-finite input reads as zero.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let mins = total / 60;
    let secs = total % 60;
    if mins > 0 {
        format!("{}m{}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Format a timestamp as local date and time
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
