//! Time utilities for punchd
//!
//! Work sessions are keyed by local calendar day and reminders fire at
//! fixed wall-clock times, so everything here deals in `chrono::Local`.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `PUNCHD_MOCK_TIME` environment variable can be set
//! to override the system time for all time-sensitive operations. This is
//! useful for exercising reminders without waiting for the real wall clock.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2025-06-16 09:55:00`)

use chrono::{
    DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Weekday,
};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "PUNCHD_MOCK_TIME";

/// Day key format used for session and reminder records
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Cached mock time offset from the real time when the process started.
/// This allows mock time to advance naturally.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(raw) = std::env::var(MOCK_TIME_ENV_VAR) {
                match NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S")
                    .ok()
                    .and_then(|naive| Local.from_local_datetime(&naive).single())
                {
                    Some(mock_dt) => {
                        let offset = mock_dt.signed_duration_since(Local::now());
                        tracing::info!(
                            mock_time = %raw,
                            offset_secs = offset.num_seconds(),
                            "Mock time enabled"
                        );
                        return Some(offset);
                    }
                    None => {
                        tracing::warn!(
                            mock_time = %raw,
                            expected_format = "%Y-%m-%d %H:%M:%S",
                            "Invalid mock time, ignoring"
                        );
                    }
                }
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Get the current local time, respecting mock time settings in debug builds.
///
/// In release builds, this always returns the real system time.
pub fn now() -> DateTime<Local> {
    let real_now = Local::now();

    if let Some(offset) = get_mock_time_offset() {
        real_now + offset
    } else {
        real_now
    }
}

/// Format a date as a stable day key (`YYYY-MM-DD`)
pub fn day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

/// Parse a day key back into a date
pub fn parse_day_key(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DAY_KEY_FORMAT).ok()
}

/// Format a year and month as a month key (`YYYY-MM`)
pub fn year_month(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

/// The (year, month) immediately before the given one, rolling over January
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 { (year - 1, 12) } else { (year, month - 1) }
}

/// First and last day of the given month, or `None` for an invalid month
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_first.pred_opt()?))
}

/// Whole minutes elapsed from `start` to `end`, truncating seconds
pub fn minutes_between(start: DateTime<Local>, end: DateTime<Local>) -> i64 {
    end.signed_duration_since(start).num_minutes()
}

/// Wall-clock time of day for reminder triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallClock {
    pub hour: u8,
    pub minute: u8,
}

impl WallClock {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour as u32, self.minute as u32, 0).unwrap()
    }

    pub fn from_naive_time(time: NaiveTime) -> Self {
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        }
    }

    /// Returns seconds since midnight
    pub fn as_seconds_from_midnight(&self) -> u32 {
        (self.hour as u32) * 3600 + (self.minute as u32) * 60
    }
}

impl PartialOrd for WallClock {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WallClock {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_seconds_from_midnight()
            .cmp(&other.as_seconds_from_midnight())
    }
}

/// Days of the week mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DaysOfWeek(u8);

impl DaysOfWeek {
    pub const MONDAY: u8 = 1 << 0;
    pub const TUESDAY: u8 = 1 << 1;
    pub const WEDNESDAY: u8 = 1 << 2;
    pub const THURSDAY: u8 = 1 << 3;
    pub const FRIDAY: u8 = 1 << 4;
    pub const SATURDAY: u8 = 1 << 5;
    pub const SUNDAY: u8 = 1 << 6;

    pub const WEEKDAYS: DaysOfWeek = DaysOfWeek(
        Self::MONDAY | Self::TUESDAY | Self::WEDNESDAY | Self::THURSDAY | Self::FRIDAY,
    );
    pub const WEEKENDS: DaysOfWeek = DaysOfWeek(Self::SATURDAY | Self::SUNDAY);
    pub const ALL_DAYS: DaysOfWeek = DaysOfWeek(0x7F);
    pub const NONE: DaysOfWeek = DaysOfWeek(0);

    pub fn new(mask: u8) -> Self {
        Self(mask & 0x7F)
    }

    /// Parse a comma-separated list of day names (`"mon,tue,wed,thu,fri"`).
    ///
    /// Accepts short or full English names, case-insensitive. Returns `None`
    /// if any entry is unrecognized. An empty string yields an empty mask.
    pub fn from_csv(s: &str) -> Option<Self> {
        let mut mask = 0u8;
        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            mask |= match part.to_ascii_lowercase().as_str() {
                "mon" | "monday" => Self::MONDAY,
                "tue" | "tuesday" => Self::TUESDAY,
                "wed" | "wednesday" => Self::WEDNESDAY,
                "thu" | "thursday" => Self::THURSDAY,
                "fri" | "friday" => Self::FRIDAY,
                "sat" | "saturday" => Self::SATURDAY,
                "sun" | "sunday" => Self::SUNDAY,
                _ => return None,
            };
        }
        Some(Self(mask))
    }

    pub fn contains(&self, weekday: Weekday) -> bool {
        let bit = match weekday {
            Weekday::Mon => Self::MONDAY,
            Weekday::Tue => Self::TUESDAY,
            Weekday::Wed => Self::WEDNESDAY,
            Weekday::Thu => Self::THURSDAY,
            Weekday::Fri => Self::FRIDAY,
            Weekday::Sat => Self::SATURDAY,
            Weekday::Sun => Self::SUNDAY,
        };
        (self.0 & bit) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for DaysOfWeek {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_wall_clock_ordering() {
        let morning = WallClock::new(9, 55).unwrap();
        let evening = WallClock::new(20, 30).unwrap();
        let late = WallClock::new(21, 30).unwrap();

        assert!(morning < evening);
        assert!(evening < late);
        assert!(morning < late);
    }

    #[test]
    fn test_wall_clock_rejects_invalid() {
        assert!(WallClock::new(24, 0).is_none());
        assert!(WallClock::new(12, 60).is_none());
    }

    #[test]
    fn test_days_of_week() {
        let weekdays = DaysOfWeek::WEEKDAYS;
        assert!(weekdays.contains(Weekday::Mon));
        assert!(weekdays.contains(Weekday::Fri));
        assert!(!weekdays.contains(Weekday::Sat));
        assert!(!weekdays.contains(Weekday::Sun));

        let weekends = DaysOfWeek::WEEKENDS;
        assert!(!weekends.contains(Weekday::Mon));
        assert!(weekends.contains(Weekday::Sat));
        assert!(weekends.contains(Weekday::Sun));

        assert_eq!(weekdays | weekends, DaysOfWeek::ALL_DAYS);
    }

    #[test]
    fn test_days_of_week_from_csv() {
        let parsed = DaysOfWeek::from_csv("mon,tue,wed,thu,fri").unwrap();
        assert_eq!(parsed, DaysOfWeek::WEEKDAYS);

        let mixed = DaysOfWeek::from_csv(" Monday, SAT ").unwrap();
        assert!(mixed.contains(Weekday::Mon));
        assert!(mixed.contains(Weekday::Sat));
        assert!(!mixed.contains(Weekday::Tue));

        assert!(DaysOfWeek::from_csv("").unwrap().is_empty());
        assert!(DaysOfWeek::from_csv("mon,funday").is_none());
    }

    #[test]
    fn test_day_key() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
        assert_eq!(day_key(date), "2025-06-16");
        assert_eq!(parse_day_key("2025-06-16"), Some(date));
        assert_eq!(parse_day_key("16/06/2025"), None);
    }

    #[test]
    fn test_year_month_padding() {
        assert_eq!(year_month(2025, 6), "2025-06");
        assert_eq!(year_month(2024, 12), "2024-12");
    }

    #[test]
    fn test_previous_month_rollover() {
        assert_eq!(previous_month(2025, 6), (2025, 5));
        assert_eq!(previous_month(2025, 1), (2024, 12));
    }

    #[test]
    fn test_month_bounds() {
        let (first, last) = month_bounds(2025, 6).unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());

        // Leap February and the December year boundary
        let (_, leap_last) = month_bounds(2024, 2).unwrap();
        assert_eq!(leap_last, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        let (_, dec_last) = month_bounds(2025, 12).unwrap();
        assert_eq!(dec_last, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());

        assert!(month_bounds(2025, 13).is_none());
    }

    #[test]
    fn test_minutes_between_truncates_seconds() {
        let start = Local.with_ymd_and_hms(2025, 6, 16, 9, 0, 0).unwrap();
        let end = Local.with_ymd_and_hms(2025, 6, 16, 17, 30, 59).unwrap();
        assert_eq!(minutes_between(start, end), 510);
    }

    #[test]
    fn test_minutes_between_signed() {
        let start = Local.with_ymd_and_hms(2025, 6, 16, 17, 0, 0).unwrap();
        let end = Local.with_ymd_and_hms(2025, 6, 16, 15, 0, 0).unwrap();
        assert_eq!(minutes_between(start, end), -120);
    }

    #[test]
    fn test_mock_time_format_parses() {
        let result = NaiveDateTime::parse_from_str("2025-06-16 09:55:00", "%Y-%m-%d %H:%M:%S");
        assert!(result.is_ok());
    }
}
