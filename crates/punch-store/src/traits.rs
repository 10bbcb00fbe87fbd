//! Store trait definitions

use chrono::{DateTime, Local, NaiveDate};

use crate::{ReminderKind, StoreResult, WorkConfig, WorkSession};

/// Main store trait
pub trait Store: Send + Sync {
    // Work sessions

    /// Get the session for a date
    fn session(&self, date: NaiveDate) -> StoreResult<Option<WorkSession>>;

    /// Insert or replace the session for its date
    fn upsert_session(&self, session: &WorkSession) -> StoreResult<()>;

    /// Get all sessions with `from <= date <= to`, ordered by date
    fn sessions_between(&self, from: NaiveDate, to: NaiveDate) -> StoreResult<Vec<WorkSession>>;

    // Configuration

    /// Get the configuration record, falling back to defaults when absent
    fn config(&self) -> StoreResult<WorkConfig>;

    /// Replace the configuration record
    fn save_config(&self, config: &WorkConfig) -> StoreResult<()>;

    // Reminder fire records

    /// Whether the trigger already fired on the given date
    fn reminder_fired(&self, date: NaiveDate, kind: ReminderKind) -> StoreResult<bool>;

    /// Atomically mark the trigger as fired for the date.
    /// Returns false when an earlier firing already claimed it.
    fn claim_reminder(
        &self,
        date: NaiveDate,
        kind: ReminderKind,
        fired_at: DateTime<Local>,
    ) -> StoreResult<bool>;

    // Health

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}
