//! Reminder scheduler
//!
//! Wakes on a fixed tick, works out which reminders are due, and delivers
//! them over webhooks. Network traffic never runs while the engine lock is
//! held; the fire-record claim keeps concurrent passes from double-sending.

use chrono::{DateTime, Local, NaiveDate};
use punch_client::{AttendanceProvider, BusinessCalendar, HrEndpoint, Notifier};
use punch_store::{ReminderKind, Store, StoreResult, WorkSession};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::{due_kinds, reminder_message, still_needed, TrackerEngine};

/// Periodic reminder evaluation and delivery
pub struct ReminderScheduler {
    engine: Arc<Mutex<TrackerEngine>>,
    store: Arc<dyn Store>,
    calendar: Arc<dyn BusinessCalendar>,
    notifier: Arc<dyn Notifier>,
    attendance: Arc<dyn AttendanceProvider>,
}

impl ReminderScheduler {
    pub fn new(
        engine: Arc<Mutex<TrackerEngine>>,
        store: Arc<dyn Store>,
        calendar: Arc<dyn BusinessCalendar>,
        notifier: Arc<dyn Notifier>,
        attendance: Arc<dyn AttendanceProvider>,
    ) -> Self {
        Self {
            engine,
            store,
            calendar,
            notifier,
            attendance,
        }
    }

    /// Run the tick loop until shutdown is signalled
    pub async fn run(self, tick: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        info!(tick_secs = tick.as_secs(), "Reminder scheduler started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.evaluate(punch_util::now()).await;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Reminder scheduler stopping");
                        break;
                    }
                }
            }
        }
    }

    /// One evaluation pass. Returns the kinds actually delivered.
    pub async fn evaluate(&self, now: DateTime<Local>) -> Vec<ReminderKind> {
        let mut delivered = Vec::new();

        for kind in due_kinds(now) {
            match self.try_fire(kind, now).await {
                Ok(true) => delivered.push(kind),
                Ok(false) => {}
                Err(e) => {
                    warn!(kind = kind.as_str(), error = %e, "Reminder evaluation failed")
                }
            }
        }

        delivered
    }

    /// Walk one kind through its gates: not yet fired, webhook configured,
    /// condition still holds, business day, claim, deliver.
    async fn try_fire(&self, kind: ReminderKind, now: DateTime<Local>) -> StoreResult<bool> {
        let today = now.date_naive();

        if self.store.reminder_fired(today, kind)? {
            return Ok(false);
        }

        let config = self.store.config()?;
        let Some(webhook_url) = config.webhook_url(kind).map(str::to_string) else {
            debug!(kind = kind.as_str(), "No webhook configured, skipping");
            return Ok(false);
        };

        let mut session = self.store.session(today)?;

        // The morning pass first tries to satisfy itself from the HR
        // record instead of nagging
        if kind.is_check_in() && session.is_none() && config.should_auto_fetch() {
            let endpoint = HrEndpoint {
                url: config.check_in_api_url.clone(),
                p_auth: config.p_auth.clone(),
                p_rtoken: config.p_rtoken.clone(),
            };
            session = self.auto_fetch_check_in(endpoint, today, now).await?;
        }

        if !still_needed(kind, session.as_ref()) {
            return Ok(false);
        }

        if !self.calendar.is_business_day(today).await {
            debug!(date = %today, kind = kind.as_str(), "Not a business day, skipping");
            return Ok(false);
        }

        // Claim before delivering; one firing per kind and day, and a
        // failed delivery is not retried within the day
        if !self.store.claim_reminder(today, kind, now)? {
            return Ok(false);
        }

        match self.notifier.notify(&webhook_url, reminder_message(kind)).await {
            Ok(()) => {
                info!(kind = kind.as_str(), "Reminder delivered");
                Ok(true)
            }
            Err(e) => {
                warn!(kind = kind.as_str(), error = %e, "Reminder delivery failed");
                Ok(false)
            }
        }
    }

    /// Pull the recorded check-in from HR and apply it through the engine.
    /// Returns the session state after the attempt.
    async fn auto_fetch_check_in(
        &self,
        endpoint: HrEndpoint,
        today: NaiveDate,
        now: DateTime<Local>,
    ) -> StoreResult<Option<WorkSession>> {
        match self.attendance.fetch_check_in(&endpoint, today).await {
            Ok(Some(check_in)) => {
                let mut engine = self.engine.lock().await;
                match engine.write_check_in(check_in, now) {
                    Ok(applied) => {
                        info!(
                            check_in = %applied.check_in_time.to_rfc3339(),
                            "Auto-fetched check-in applied"
                        );
                    }
                    Err(e) => {
                        warn!(error = %e, "Auto-fetched check-in not applied");
                    }
                }
            }
            Ok(None) => {
                debug!(date = %today, "No check-in recorded upstream yet");
            }
            Err(e) => {
                warn!(date = %today, error = %e, "Auto-fetch failed");
            }
        }

        self.store.session(today)
    }
}
