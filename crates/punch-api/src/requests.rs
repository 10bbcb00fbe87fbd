//! Request bodies for the punchd HTTP API
//!
//! Timestamps arrive as ISO-8601 strings and are validated by the engine
//! rather than the deserializer, so malformed input produces the same
//! error envelope as every other rejection.

use serde::{Deserialize, Serialize};

/// Body for `POST /api/checkin`.
///
/// The same endpoint serves first check-in and corrections; the engine
/// decides which path applies from whether today's session exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInRequest {
    /// ISO-8601 datetime with timezone
    pub check_in_time: String,
}

/// Body for `POST /api/checkout`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutRequest {
    /// ISO-8601 datetime with timezone
    pub check_out_time: String,
}

/// Body for `POST /api/config`. Absent fields keep their stored values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigUpdateRequest {
    /// Daily work target in minutes
    #[serde(default)]
    pub work_hours: Option<i64>,
    #[serde(default)]
    pub auto_fetch_enabled: Option<bool>,
    #[serde(default)]
    pub check_in_api_url: Option<String>,
    #[serde(default)]
    pub p_auth: Option<String>,
    #[serde(default)]
    pub p_rtoken: Option<String>,
    #[serde(default)]
    pub check_in_webhook_url: Option<String>,
    #[serde(default)]
    pub check_out_webhook_url: Option<String>,
}

/// Body for `POST /api/today-checkin`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodayCheckInRequest {
    /// Day key, `YYYY-MM-DD`
    pub date: String,
    /// Apply the fetched time even when today already has a check-in
    #[serde(default)]
    pub re_check_in: bool,
}
