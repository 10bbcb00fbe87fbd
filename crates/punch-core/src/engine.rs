//! Check-in/check-out state machine and overtime math

use chrono::{DateTime, Datelike, Local, NaiveDate};
use punch_api::{
    CheckInRequest, CheckInResponse, CheckOutRequest, CheckOutResponse, ConfigResponse,
    ConfigUpdateRequest, MonthlyStatsResponse, StatusResponse, TodayCheckInRequest,
    TodayCheckInResponse,
};
use punch_client::{ClientResult, HrEndpoint};
use punch_store::{Store, WorkSession};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{summarize_month, EngineError, EngineResult};

/// Outcome of planning a today-checkin request.
///
/// Callers run any required HR fetch without holding the engine lock and
/// feed the result to [`TrackerEngine::apply_fetched_check_in`].
#[derive(Debug)]
pub enum TodayCheckInStep {
    /// Answered from the store alone
    Resolved(TodayCheckInResponse),
    /// An upstream fetch is required before answering
    FetchNeeded {
        endpoint: HrEndpoint,
        date: NaiveDate,
    },
}

/// The work-session engine.
///
/// All session mutations flow through here so ordering rules hold; reads
/// compute derived fields fresh from stored data.
pub struct TrackerEngine {
    store: Arc<dyn Store>,
}

impl TrackerEngine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Record a check-in for today, creating or correcting the session.
    ///
    /// The daily target in effect is captured on the session. An existing
    /// check-out survives a correction as long as ordering still holds.
    pub fn record_check_in(
        &mut self,
        request: &CheckInRequest,
        now: DateTime<Local>,
    ) -> EngineResult<CheckInResponse> {
        let check_in = parse_local_timestamp(&request.check_in_time)?;
        self.write_check_in(check_in, now)
    }

    /// Validated write path shared by wire check-ins and fetched ones
    pub(crate) fn write_check_in(
        &mut self,
        check_in: DateTime<Local>,
        now: DateTime<Local>,
    ) -> EngineResult<CheckInResponse> {
        let today = now.date_naive();
        if check_in.date_naive() != today {
            return Err(EngineError::invalid_input(format!(
                "check-in time {} is not on the current date {}",
                check_in.to_rfc3339(),
                today
            )));
        }

        let config = self.store.config()?;
        let existing = self.store.session(today)?;
        let correcting = existing.is_some();

        // A correction must not move the check-in past an existing check-out
        let check_out = existing.and_then(|s| s.check_out);
        if let Some(check_out) = check_out
            && check_in > check_out
        {
            return Err(EngineError::invalid_input(format!(
                "check-in time {} is after the recorded check-out {}",
                check_in.to_rfc3339(),
                check_out.to_rfc3339()
            )));
        }

        let session = WorkSession {
            date: today,
            check_in,
            check_out,
            work_minutes: config.work_minutes,
        };
        self.store.upsert_session(&session)?;

        info!(
            date = %session.date,
            check_in = %check_in.to_rfc3339(),
            corrected = correcting,
            "Check-in recorded"
        );

        Ok(CheckInResponse {
            check_in_time: session.check_in,
            expected_check_out_time: session.expected_check_out(),
        })
    }

    /// Record a check-out for today.
    ///
    /// Requires a prior check-in; repeated calls replace the stored value
    /// and recompute overtime against the captured target.
    pub fn record_check_out(
        &mut self,
        request: &CheckOutRequest,
        now: DateTime<Local>,
    ) -> EngineResult<CheckOutResponse> {
        let check_out = parse_local_timestamp(&request.check_out_time)?;
        let today = now.date_naive();

        if check_out.date_naive() != today {
            return Err(EngineError::invalid_input(format!(
                "check-out time {} is not on the current date {}",
                check_out.to_rfc3339(),
                today
            )));
        }

        let mut session = self
            .store
            .session(today)?
            .ok_or_else(|| EngineError::not_found("no check-in recorded today"))?;

        if check_out < session.check_in {
            return Err(EngineError::invalid_input(format!(
                "check-out time {} is before the check-in {}",
                check_out.to_rfc3339(),
                session.check_in.to_rfc3339()
            )));
        }

        session.check_out = Some(check_out);
        self.store.upsert_session(&session)?;

        let overtime_minutes = session.overtime_minutes().unwrap_or(0);
        info!(
            date = %session.date,
            check_out = %check_out.to_rfc3339(),
            overtime_minutes,
            "Check-out recorded"
        );

        Ok(CheckOutResponse {
            check_out_time: check_out,
            overtime_minutes,
        })
    }

    /// Snapshot of today's session state
    pub fn status(&self, now: DateTime<Local>) -> EngineResult<StatusResponse> {
        let today = now.date_naive();

        let Some(session) = self.store.session(today)? else {
            let config = self.store.config()?;
            return Ok(StatusResponse {
                has_checked_in: false,
                check_in_time: None,
                check_out_time: None,
                expected_check_out_time: None,
                current_time: now,
                is_check_out_time: false,
                work_hours: config.work_minutes,
                overtime_minutes: 0,
            });
        };

        let expected = session.expected_check_out();
        Ok(StatusResponse {
            has_checked_in: true,
            check_in_time: Some(session.check_in),
            check_out_time: session.check_out,
            expected_check_out_time: Some(expected),
            current_time: now,
            is_check_out_time: now >= expected,
            work_hours: session.work_minutes,
            overtime_minutes: session.overtime_minutes().unwrap_or(0),
        })
    }

    /// Current configuration in its wire shape
    pub fn work_config(&self) -> EngineResult<ConfigResponse> {
        let config = self.store.config()?;
        Ok(ConfigResponse::from(&config))
    }

    /// Apply a partial configuration update and return the stored result.
    ///
    /// A changed daily target is copied onto today's session so the
    /// expected check-out moves immediately; past sessions keep the target
    /// captured at their check-in.
    pub fn update_config(
        &mut self,
        request: &ConfigUpdateRequest,
        now: DateTime<Local>,
    ) -> EngineResult<ConfigResponse> {
        let mut config = self.store.config()?;

        if let Some(work_minutes) = request.work_hours {
            if !(1..=1440).contains(&work_minutes) {
                return Err(EngineError::config_invalid(format!(
                    "daily target must be between 1 and 1440 minutes, got {}",
                    work_minutes
                )));
            }
            config.work_minutes = work_minutes;
        }
        if let Some(enabled) = request.auto_fetch_enabled {
            config.auto_fetch_enabled = enabled;
        }
        if let Some(url) = &request.check_in_api_url {
            config.check_in_api_url = url.clone();
        }
        if let Some(token) = &request.p_auth {
            config.p_auth = token.clone();
        }
        if let Some(token) = &request.p_rtoken {
            config.p_rtoken = token.clone();
        }
        if let Some(url) = &request.check_in_webhook_url {
            config.check_in_webhook_url = url.clone();
        }
        if let Some(url) = &request.check_out_webhook_url {
            config.check_out_webhook_url = url.clone();
        }

        self.store.save_config(&config)?;

        if request.work_hours.is_some()
            && let Some(mut session) = self.store.session(now.date_naive())?
            && session.work_minutes != config.work_minutes
        {
            session.work_minutes = config.work_minutes;
            self.store.upsert_session(&session)?;
            debug!(
                date = %session.date,
                work_minutes = config.work_minutes,
                "Today's captured target synced to new config"
            );
        }

        info!(
            work_minutes = config.work_minutes,
            auto_fetch = config.auto_fetch_enabled,
            "Config updated"
        );

        Ok(ConfigResponse::from(&config))
    }

    /// Summaries for the current and previous calendar month
    pub fn monthly_stats(&self, now: DateTime<Local>) -> EngineResult<MonthlyStatsResponse> {
        let today = now.date_naive();
        let current_month = summarize_month(self.store.as_ref(), today.year(), today.month())?;

        let (prev_year, prev_month) = punch_util::previous_month(today.year(), today.month());
        let last_month = summarize_month(self.store.as_ref(), prev_year, prev_month)?;

        Ok(MonthlyStatsResponse {
            current_month,
            last_month,
        })
    }

    /// First half of today-checkin: decide from the store whether an
    /// upstream fetch is needed.
    ///
    /// Fetching happens when a correction is requested (credentials are
    /// enough) or when nothing is recorded yet and auto-fetch is enabled.
    pub fn plan_today_checkin(
        &self,
        request: &TodayCheckInRequest,
    ) -> EngineResult<TodayCheckInStep> {
        let date = parse_request_date(&request.date)?;

        let config = self.store.config()?;
        let session = self.store.session(date)?;

        let wants_fetch = if request.re_check_in {
            config.has_hr_config()
        } else {
            session.is_none() && config.should_auto_fetch()
        };

        if !wants_fetch {
            return Ok(TodayCheckInStep::Resolved(TodayCheckInResponse {
                has_checked_in: session.is_some(),
                check_in_time: session.map(|s| s.check_in),
                can_auto_fetch: config.should_auto_fetch(),
                auto_fetch_enabled: config.auto_fetch_enabled,
                api_error: None,
            }));
        }

        Ok(TodayCheckInStep::FetchNeeded {
            endpoint: HrEndpoint {
                url: config.check_in_api_url,
                p_auth: config.p_auth,
                p_rtoken: config.p_rtoken,
            },
            date,
        })
    }

    /// Second half of today-checkin: fold the fetch outcome back into the
    /// store and build the response.
    ///
    /// Fetched times are applied through the normal check-in path and only
    /// when the requested date is the current one; anything that prevents
    /// application is reported as `api_error` with the store untouched.
    pub fn apply_fetched_check_in(
        &mut self,
        request: &TodayCheckInRequest,
        fetched: ClientResult<Option<DateTime<Local>>>,
        now: DateTime<Local>,
    ) -> EngineResult<TodayCheckInResponse> {
        let date = parse_request_date(&request.date)?;

        let config = self.store.config()?;
        // Re-read: a session may have appeared while the fetch ran
        let session = self.store.session(date)?;

        let mut response = TodayCheckInResponse {
            has_checked_in: session.is_some(),
            check_in_time: session.as_ref().map(|s| s.check_in),
            can_auto_fetch: config.should_auto_fetch(),
            auto_fetch_enabled: config.auto_fetch_enabled,
            api_error: None,
        };

        let check_in = match fetched {
            Ok(Some(check_in)) => check_in,
            Ok(None) => {
                debug!(date = %date, "No check-in recorded upstream yet");
                return Ok(response);
            }
            Err(e) => {
                warn!(date = %date, error = %e, "Upstream check-in fetch failed");
                response.api_error = Some(e.to_string());
                return Ok(response);
            }
        };

        if !request.re_check_in && session.is_some() {
            // A session appeared while the fetch ran and no correction was
            // asked for: report what the upstream holds, stored data stands
            response.check_in_time = Some(check_in);
            return Ok(response);
        }

        if date != now.date_naive() {
            response.api_error = Some(format!(
                "fetched check-in applies only to the current date, requested {}",
                date
            ));
            return Ok(response);
        }

        match self.write_check_in(check_in, now) {
            Ok(applied) => {
                response.has_checked_in = true;
                response.check_in_time = Some(applied.check_in_time);
                info!(
                    date = %date,
                    check_in = %applied.check_in_time.to_rfc3339(),
                    "Fetched check-in applied"
                );
            }
            Err(EngineError::Store(e)) => return Err(EngineError::Store(e)),
            Err(e) => {
                warn!(date = %date, error = %e, "Fetched check-in not applied");
                response.api_error = Some(e.to_string());
            }
        }

        Ok(response)
    }
}

fn parse_local_timestamp(value: &str) -> EngineResult<DateTime<Local>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Local))
        .map_err(|_| EngineError::invalid_input(format!("bad timestamp {:?}", value)))
}

fn parse_request_date(value: &str) -> EngineResult<NaiveDate> {
    punch_util::parse_day_key(value)
        .ok_or_else(|| EngineError::invalid_input(format!("bad date {:?}", value)))
}
