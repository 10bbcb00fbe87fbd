//! Business-day calendars
//!
//! The reminder scheduler only fires on business days. What counts as a
//! business day is pluggable: the plain workweek mask, or the workweek
//! combined with a holiday endpoint.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use punch_util::DaysOfWeek;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{ClientError, ClientResult};

/// Decides whether reminders should fire on a date
#[async_trait]
pub trait BusinessCalendar: Send + Sync {
    async fn is_business_day(&self, date: NaiveDate) -> bool;
}

/// Pure workweek-mask calendar
pub struct WorkweekCalendar {
    workweek: DaysOfWeek,
}

impl WorkweekCalendar {
    pub fn new(workweek: DaysOfWeek) -> Self {
        Self { workweek }
    }
}

impl Default for WorkweekCalendar {
    fn default() -> Self {
        Self::new(DaysOfWeek::WEEKDAYS)
    }
}

#[async_trait]
impl BusinessCalendar for WorkweekCalendar {
    async fn is_business_day(&self, date: NaiveDate) -> bool {
        self.workweek.contains(date.weekday())
    }
}

/// Workweek mask combined with a holiday endpoint.
///
/// Days outside the workweek are rejected locally; workweek days are
/// checked against the endpoint. Endpoint failures count as business days
/// so reminders are not silently dropped.
pub struct HolidayApiCalendar {
    client: Client,
    url: String,
    workweek: DaysOfWeek,
}

impl HolidayApiCalendar {
    pub fn new(url: impl Into<String>, workweek: DaysOfWeek) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            url: url.into(),
            workweek,
        }
    }

    async fn fetch_rest_status(&self, date: NaiveDate) -> ClientResult<bool> {
        let day = punch_util::day_key(date);
        let separator = if self.url.contains('?') { '&' } else { '?' };
        let url = format!("{}{}date={}", self.url, separator, day);
        debug!(url = %url, "Checking holiday calendar");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_rest_status(&body, &day)
    }
}

#[async_trait]
impl BusinessCalendar for HolidayApiCalendar {
    async fn is_business_day(&self, date: NaiveDate) -> bool {
        if !self.workweek.contains(date.weekday()) {
            return false;
        }

        match self.fetch_rest_status(date).await {
            Ok(is_rest) => !is_rest,
            Err(e) => {
                warn!(date = %date, error = %e, "Holiday lookup failed, assuming business day");
                true
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct HolidayEnvelope {
    #[serde(default)]
    code: Option<i64>,
    data: Option<HolidayDay>,
}

#[derive(Debug, Deserialize)]
struct HolidayDay {
    #[serde(default)]
    date: String,
    /// Nonzero marks a rest day
    #[serde(default)]
    status: i64,
}

/// Decode a holiday endpoint body into "is this a rest day"
fn parse_rest_status(body: &str, day: &str) -> ClientResult<bool> {
    let envelope: HolidayEnvelope =
        serde_json::from_str(body).map_err(|e| ClientError::Parse(e.to_string()))?;

    if let Some(code) = envelope.code
        && code != 200
    {
        return Err(ClientError::Rejected(format!(
            "holiday endpoint code {}",
            code
        )));
    }

    let Some(data) = envelope.data else {
        return Err(ClientError::Parse("missing data object".into()));
    };

    if data.date != day {
        debug!(requested = %day, got = %data.date, "Holiday endpoint answered for a different date");
    }

    Ok(data.status != 0)
}
