//! Centralized duration formatting utilities.
//!
//! All cooldown/countdown display formatting goes through this module to
//! keep the status table and notification lines consistent.

/// Format a duration as `M:SS`.
///
/// # Examples
/// ```
/// use keywatch_types::formatting::format_duration;
/// assert_eq!(format_duration(125), "2:05");
/// assert_eq!(format_duration(59), "0:59");
/// assert_eq!(format_duration(0), "0:00");
/// ```
pub fn format_duration(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Format a duration as `H:MM:SS`.
///
/// # Examples
/// ```
/// use keywatch_types::formatting::format_hms;
/// assert_eq!(format_hms(3_725), "1:02:05");
/// assert_eq!(format_hms(59), "0:00:59");
/// ```
pub fn format_hms(secs: u64) -> String {
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Format a long remaining time for the status table.
///
/// - Values >= 1 day: `Xd H:MM:SS`
/// - Values >= 1 hour: `H:MM:SS`
/// - Values below 1 hour: `M:SS`
///
/// # Examples
/// ```
/// use keywatch_types::formatting::format_remaining;
/// assert_eq!(format_remaining(216_000), "2d 12:00:00");
/// assert_eq!(format_remaining(3_725), "1:02:05");
/// assert_eq!(format_remaining(125), "2:05");
/// ```
pub fn format_remaining(secs: u64) -> String {
    if secs >= 86_400 {
        format!("{}d {}", secs / 86_400, format_hms(secs % 86_400))
    } else if secs >= 3_600 {
        format_hms(secs)
    } else {
        format_duration(secs)
    }
}

/// Format a countdown, substituting a label once it reaches zero.
///
/// # Examples
/// ```
/// use keywatch_types::formatting::format_countdown;
/// assert_eq!(format_countdown(90_125, "Ready"), "1d 1:02:05");
/// assert_eq!(format_countdown(125, "Ready"), "2:05");
/// assert_eq!(format_countdown(0, "Ready"), "Ready");
/// ```
pub fn format_countdown(secs: u64, zero_label: &str) -> String {
    if secs == 0 {
        zero_label.to_string()
    } else {
        format_remaining(secs)
    }
}
