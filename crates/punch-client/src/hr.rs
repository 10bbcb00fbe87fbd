//! HR attendance client
//!
//! Fetches the recorded first clock-in for a date from the company
//! attendance endpoint. The endpoint serves whole months; the requested
//! day is picked out of the returned list.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveTime, TimeZone};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::{ClientError, ClientResult};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Where and how to reach the attendance endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HrEndpoint {
    pub url: String,
    pub p_auth: String,
    pub p_rtoken: String,
}

/// Source of recorded check-in times
#[async_trait]
pub trait AttendanceProvider: Send + Sync {
    /// Look up the recorded check-in for `date`.
    /// `Ok(None)` means the upstream has no data for that day yet.
    async fn fetch_check_in(
        &self,
        endpoint: &HrEndpoint,
        date: NaiveDate,
    ) -> ClientResult<Option<DateTime<Local>>>;
}

/// HTTP client for the company attendance endpoint
pub struct HrApiClient {
    client: Client,
}

impl HrApiClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }
}

impl Default for HrApiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AttendanceProvider for HrApiClient {
    async fn fetch_check_in(
        &self,
        endpoint: &HrEndpoint,
        date: NaiveDate,
    ) -> ClientResult<Option<DateTime<Local>>> {
        let url = monthly_url(&endpoint.url, date);
        debug!(url = %url, date = %date, "Fetching recorded check-in");

        let response = self
            .client
            .get(&url)
            .header("P-Auth", &endpoint.p_auth)
            .header("P-Rtoken", &endpoint.p_rtoken)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        extract_check_in(&body, date)
    }
}

/// Append the `monthly=YYYY-MM` query parameter unless already present
fn monthly_url(base: &str, date: NaiveDate) -> String {
    if base.contains("monthly=") {
        return base.to_string();
    }
    let separator = if base.contains('?') { '&' } else { '?' };
    format!(
        "{}{}monthly={}",
        base,
        separator,
        punch_util::year_month(date.year(), date.month())
    )
}

#[derive(Debug, Deserialize)]
struct AttendanceEnvelope {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    data: Vec<AttendanceDay>,
}

#[derive(Debug, Deserialize)]
struct AttendanceDay {
    #[serde(rename = "attendanceDate", default)]
    attendance_date: String,
    #[serde(rename = "firstClockInTime", default)]
    first_clock_in_time: Option<String>,
}

/// Pick the requested day's first clock-in out of a monthly response body
fn extract_check_in(body: &str, date: NaiveDate) -> ClientResult<Option<DateTime<Local>>> {
    let envelope: AttendanceEnvelope =
        serde_json::from_str(body).map_err(|e| ClientError::Parse(e.to_string()))?;

    let rejected = envelope.success == Some(false)
        || envelope.code.as_deref().is_some_and(|code| code != "200");
    if rejected {
        let reason = envelope
            .message
            .unwrap_or_else(|| "attendance endpoint reported failure".to_string());
        return Err(ClientError::Rejected(reason));
    }

    let wanted = punch_util::day_key(date);
    let Some(day) = envelope.data.iter().find(|d| d.attendance_date == wanted) else {
        return Ok(None);
    };

    let Some(raw) = day.first_clock_in_time.as_deref().filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    let time = parse_clock_time(raw)
        .ok_or_else(|| ClientError::Parse(format!("bad clock-in time {:?}", raw)))?;

    let check_in = Local
        .from_local_datetime(&date.and_time(time))
        .single()
        .ok_or_else(|| ClientError::Parse(format!("ambiguous local time {:?} on {}", raw, date)))?;

    Ok(Some(check_in))
}

/// Clock-in strings are `HH:MM`, seconds tolerated
fn parse_clock_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "code": "200",
        "message": "ok",
        "success": true,
        "data": [
            {"attendanceDate": "2025-06-15", "firstClockInTime": "08:58"},
            {"attendanceDate": "2025-06-16", "firstClockInTime": "09:02"},
            {"attendanceDate": "2025-06-17", "firstClockInTime": null}
        ]
    }"#;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    #[test]
    fn monthly_url_appends_parameter() {
        assert_eq!(
            monthly_url("https://hr.example.com/attendance", date(16)),
            "https://hr.example.com/attendance?monthly=2025-06"
        );
        assert_eq!(
            monthly_url("https://hr.example.com/attendance?dept=eng", date(16)),
            "https://hr.example.com/attendance?dept=eng&monthly=2025-06"
        );
        // Already present, left alone
        assert_eq!(
            monthly_url("https://hr.example.com/attendance?monthly=2025-05", date(16)),
            "https://hr.example.com/attendance?monthly=2025-05"
        );
    }

    #[test]
    fn extracts_the_requested_day() {
        let found = extract_check_in(BODY, date(16)).unwrap().unwrap();
        let expected = Local.with_ymd_and_hms(2025, 6, 16, 9, 2, 0).unwrap();
        assert_eq!(found, expected);
    }

    #[test]
    fn missing_or_null_day_is_no_data() {
        // Day absent from the month
        assert!(extract_check_in(BODY, date(20)).unwrap().is_none());
        // Day present but not clocked in
        assert!(extract_check_in(BODY, date(17)).unwrap().is_none());
    }

    #[test]
    fn upstream_rejection_is_an_error() {
        let body = r#"{"code": "401", "message": "token expired", "success": false, "data": []}"#;
        let err = extract_check_in(body, date(16)).unwrap_err();
        assert!(matches!(err, ClientError::Rejected(msg) if msg == "token expired"));
    }

    #[test]
    fn unexpected_body_is_a_parse_error() {
        assert!(matches!(
            extract_check_in("not json", date(16)),
            Err(ClientError::Parse(_))
        ));

        let bad_time = r#"{"success": true, "data": [
            {"attendanceDate": "2025-06-16", "firstClockInTime": "morning"}
        ]}"#;
        assert!(matches!(
            extract_check_in(bad_time, date(16)),
            Err(ClientError::Parse(_))
        ));
    }

    #[test]
    fn clock_time_tolerates_seconds() {
        assert_eq!(
            parse_clock_time("09:02"),
            NaiveTime::from_hms_opt(9, 2, 0)
        );
        assert_eq!(
            parse_clock_time("09:02:31"),
            NaiveTime::from_hms_opt(9, 2, 31)
        );
        assert_eq!(parse_clock_time("9 am"), None);
    }
}
