//! Human-readable formatting for history records.

use chrono::{DateTime, TimeZone};

/// Format a byte count with binary-prefix units and one decimal place.
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.1} {}", size, UNITS[unit_index])
}

/// Timestamp embedded in archive file names, e.g. `2024-03-15_14-30-00`.
pub fn archive_timestamp<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%Y-%m-%d_%H-%M-%S").to_string()
}

/// Date shown in the backup history, e.g. `15.03.2024 14:30`.
pub fn display_date<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%d.%m.%Y %H:%M").to_string()
}
