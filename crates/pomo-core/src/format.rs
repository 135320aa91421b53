//! Formatting utilities

use chrono::{DateTime, Duration, Local};

/// Format remaining seconds as a zero-padded `mm:ss` clock face
pub fn clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Format a duration in human-readable form
pub fn duration(seconds: u32) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        let mins = seconds / 60;
        let secs = seconds % 60;
        if secs == 0 {
            format!("{}m", mins)
        } else {
            format!("{}m {}s", mins, secs)
        }
    } else {
        let hours = seconds / 3600;
        let mins = (seconds % 3600) / 60;
        format!("{}h {}m", hours, mins)
    }
}

/// Wall-clock time (HH:MM) at which `remaining` seconds from `now` elapse
pub fn ends_at(now: DateTime<Local>, remaining: u32) -> String {
    (now + Duration::seconds(remaining as i64))
        .format("%H:%M")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_clock() {
        assert_eq!(clock(0), "00:00");
        assert_eq!(clock(59), "00:59");
        assert_eq!(clock(1500), "25:00");
        assert_eq!(clock(3600), "60:00");
    }

    #[test]
    fn test_duration() {
        assert_eq!(duration(45), "45s");
        assert_eq!(duration(300), "5m");
        assert_eq!(duration(90), "1m 30s");
        assert_eq!(duration(5400), "1h 30m");
    }

    #[test]
    fn test_ends_at() {
        let now = Local.with_ymd_and_hms(2024, 3, 1, 9, 50, 0).unwrap();
        assert_eq!(ends_at(now, 1500), "10:15");
    }
}
