//! Domain records persisted by the store

use chrono::{DateTime, Duration, Local, NaiveDate};
use punch_api::ConfigResponse;
use punch_util::WallClock;

/// One work session per calendar date.
///
/// `work_minutes` is the daily target captured at the last check-in write,
/// so later config changes do not rewrite history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkSession {
    pub date: NaiveDate,
    pub check_in: DateTime<Local>,
    pub check_out: Option<DateTime<Local>>,
    pub work_minutes: i64,
}

impl WorkSession {
    /// Check-in plus the captured daily target
    pub fn expected_check_out(&self) -> DateTime<Local> {
        self.check_in + Duration::minutes(self.work_minutes)
    }

    /// Whole minutes between check-in and check-out, if checked out
    pub fn worked_minutes(&self) -> Option<i64> {
        self.check_out
            .map(|out| punch_util::minutes_between(self.check_in, out))
    }

    /// Signed overtime: worked minutes minus the captured target
    pub fn overtime_minutes(&self) -> Option<i64> {
        self.worked_minutes()
            .map(|worked| worked - self.work_minutes)
    }

    pub fn is_complete(&self) -> bool {
        self.check_out.is_some()
    }
}

/// Single global configuration record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkConfig {
    /// Daily work target in minutes
    pub work_minutes: i64,
    pub auto_fetch_enabled: bool,
    pub check_in_api_url: String,
    pub p_auth: String,
    pub p_rtoken: String,
    pub check_in_webhook_url: String,
    pub check_out_webhook_url: String,
}

impl Default for WorkConfig {
    fn default() -> Self {
        Self {
            work_minutes: 480,
            auto_fetch_enabled: false,
            check_in_api_url: String::new(),
            p_auth: String::new(),
            p_rtoken: String::new(),
            check_in_webhook_url: String::new(),
            check_out_webhook_url: String::new(),
        }
    }
}

impl WorkConfig {
    /// HR endpoint URL and both credentials are configured
    pub fn has_hr_config(&self) -> bool {
        !self.check_in_api_url.is_empty() && !self.p_auth.is_empty() && !self.p_rtoken.is_empty()
    }

    /// The scheduler may fetch without being asked
    pub fn should_auto_fetch(&self) -> bool {
        self.auto_fetch_enabled && self.has_hr_config()
    }

    /// Webhook URL for the given reminder kind, if configured
    pub fn webhook_url(&self, kind: ReminderKind) -> Option<&str> {
        let url = if kind.is_check_in() {
            &self.check_in_webhook_url
        } else {
            &self.check_out_webhook_url
        };
        if url.is_empty() { None } else { Some(url.as_str()) }
    }
}

impl From<&WorkConfig> for ConfigResponse {
    fn from(config: &WorkConfig) -> Self {
        Self {
            work_hours: config.work_minutes,
            auto_fetch_enabled: config.auto_fetch_enabled,
            check_in_api_url: config.check_in_api_url.clone(),
            p_auth: config.p_auth.clone(),
            p_rtoken: config.p_rtoken.clone(),
            check_in_webhook_url: config.check_in_webhook_url.clone(),
            check_out_webhook_url: config.check_out_webhook_url.clone(),
        }
    }
}

/// The three fixed daily reminder triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReminderKind {
    MorningCheckIn,
    EveningCheckOut,
    LateCheckOut,
}

impl ReminderKind {
    pub const ALL: [ReminderKind; 3] = [
        ReminderKind::MorningCheckIn,
        ReminderKind::EveningCheckOut,
        ReminderKind::LateCheckOut,
    ];

    /// Wall-clock time at which this trigger becomes due
    pub fn trigger(&self) -> WallClock {
        let (hour, minute) = match self {
            ReminderKind::MorningCheckIn => (9, 55),
            ReminderKind::EveningCheckOut => (20, 30),
            ReminderKind::LateCheckOut => (21, 30),
        };
        WallClock { hour, minute }
    }

    /// Stable token used in fire records
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::MorningCheckIn => "check_in_morning",
            ReminderKind::EveningCheckOut => "check_out_evening",
            ReminderKind::LateCheckOut => "check_out_late",
        }
    }

    /// True for the morning check-in reminder
    pub fn is_check_in(&self) -> bool {
        matches!(self, ReminderKind::MorningCheckIn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session_at(hour: u32, minute: u32) -> WorkSession {
        WorkSession {
            date: NaiveDate::from_ymd_opt(2025, 6, 16).unwrap(),
            check_in: Local.with_ymd_and_hms(2025, 6, 16, hour, minute, 0).unwrap(),
            check_out: None,
            work_minutes: 480,
        }
    }

    #[test]
    fn expected_check_out_adds_target() {
        let session = session_at(9, 0);
        let expected = Local.with_ymd_and_hms(2025, 6, 16, 17, 0, 0).unwrap();
        assert_eq!(session.expected_check_out(), expected);
    }

    #[test]
    fn overtime_is_signed() {
        let mut session = session_at(9, 0);
        assert_eq!(session.overtime_minutes(), None);

        session.check_out = Some(Local.with_ymd_and_hms(2025, 6, 16, 19, 30, 0).unwrap());
        assert_eq!(session.overtime_minutes(), Some(150));

        session.check_out = Some(Local.with_ymd_and_hms(2025, 6, 16, 16, 0, 0).unwrap());
        assert_eq!(session.overtime_minutes(), Some(-60));
    }

    #[test]
    fn hr_config_requires_url_and_both_credentials() {
        let mut config = WorkConfig::default();
        assert!(!config.has_hr_config());
        assert!(!config.should_auto_fetch());

        config.check_in_api_url = "https://hr.example.com/attendance".into();
        config.p_auth = "auth".into();
        assert!(!config.has_hr_config());

        config.p_rtoken = "rtoken".into();
        assert!(config.has_hr_config());
        assert!(!config.should_auto_fetch());

        config.auto_fetch_enabled = true;
        assert!(config.should_auto_fetch());
    }

    #[test]
    fn webhook_url_selection() {
        let config = WorkConfig {
            check_in_webhook_url: "https://ntfy.example.com/in".into(),
            ..WorkConfig::default()
        };

        assert_eq!(
            config.webhook_url(ReminderKind::MorningCheckIn),
            Some("https://ntfy.example.com/in")
        );
        // Both check-out reminders share the check-out URL, unset here
        assert_eq!(config.webhook_url(ReminderKind::EveningCheckOut), None);
        assert_eq!(config.webhook_url(ReminderKind::LateCheckOut), None);
    }

    #[test]
    fn reminder_triggers_are_ordered() {
        let morning = ReminderKind::MorningCheckIn.trigger();
        let evening = ReminderKind::EveningCheckOut.trigger();
        let late = ReminderKind::LateCheckOut.trigger();

        assert_eq!((morning.hour, morning.minute), (9, 55));
        assert!(morning < evening);
        assert!(evening < late);
    }

    #[test]
    fn config_response_carries_minutes_in_work_hours() {
        let config = WorkConfig {
            work_minutes: 450,
            ..WorkConfig::default()
        };
        let resp = ConfigResponse::from(&config);
        assert_eq!(resp.work_hours, 450);
        assert!(!resp.auto_fetch_enabled);
    }
}
