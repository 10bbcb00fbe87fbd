//! Response bodies for the punchd HTTP API

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Response for `GET /api/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub has_checked_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in_time: Option<DateTime<Local>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out_time: Option<DateTime<Local>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_check_out_time: Option<DateTime<Local>>,
    pub current_time: DateTime<Local>,
    /// True once `current_time` has reached the expected checkout
    pub is_check_out_time: bool,
    /// Effective daily target in minutes
    pub work_hours: i64,
    /// Signed; 0 until a check-out exists
    pub overtime_minutes: i64,
}

/// Response for `POST /api/checkin`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInResponse {
    pub check_in_time: DateTime<Local>,
    pub expected_check_out_time: DateTime<Local>,
}

/// Response for `POST /api/checkout`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutResponse {
    pub check_out_time: DateTime<Local>,
    /// Signed: negative when leaving before the target
    pub overtime_minutes: i64,
}

/// Response for `GET /api/config` and `POST /api/config`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigResponse {
    /// Daily work target in minutes
    pub work_hours: i64,
    pub auto_fetch_enabled: bool,
    pub check_in_api_url: String,
    pub p_auth: String,
    pub p_rtoken: String,
    pub check_in_webhook_url: String,
    pub check_out_webhook_url: String,
}

/// Response for `POST /api/today-checkin`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodayCheckInResponse {
    pub has_checked_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in_time: Option<DateTime<Local>>,
    /// Whether the scheduler may fetch unprompted (flag plus credentials)
    pub can_auto_fetch: bool,
    pub auto_fetch_enabled: bool,
    /// Upstream failure description; absent when the fetch succeeded or
    /// simply found no data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_error: Option<String>,
}

/// Aggregates for one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// `YYYY-MM`
    pub year_month: String,
    /// Sessions with a check-in
    pub total_days: i64,
    /// Sessions with both check-in and check-out
    pub checked_out_days: i64,
    /// Signed sum over checked-out sessions
    pub overtime_minutes: i64,
}

/// Response for `GET /api/monthly-stats`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyStatsResponse {
    pub current_month: MonthlySummary,
    pub last_month: MonthlySummary,
}
