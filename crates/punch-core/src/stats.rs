//! Monthly aggregation over stored sessions

use punch_api::MonthlySummary;
use punch_store::Store;
use punch_util::{month_bounds, year_month};

use crate::{EngineError, EngineResult};

/// Summarize one calendar month.
///
/// Every session in the month counts toward `total_days`; only completed
/// ones contribute overtime, so the sum never guesses at open sessions.
pub fn summarize_month(store: &dyn Store, year: i32, month: u32) -> EngineResult<MonthlySummary> {
    let (first, last) = month_bounds(year, month)
        .ok_or_else(|| EngineError::invalid_input(format!("invalid month {}-{}", year, month)))?;

    let sessions = store.sessions_between(first, last)?;

    let total_days = sessions.len() as i64;
    let checked_out_days = sessions.iter().filter(|s| s.is_complete()).count() as i64;
    let overtime_minutes = sessions.iter().filter_map(|s| s.overtime_minutes()).sum();

    Ok(MonthlySummary {
        year_month: year_month(year, month),
        total_days,
        checked_out_days,
        overtime_minutes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Local, NaiveDate, TimeZone};
    use punch_store::{SqliteStore, WorkSession};
    use std::sync::Arc;

    fn day(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn session(date: NaiveDate, check_in_hour: u32, check_out_hour: Option<u32>) -> WorkSession {
        let ts = |hour: u32| {
            Local
                .with_ymd_and_hms(date.year(), date.month(), date.day(), hour, 0, 0)
                .unwrap()
        };
        WorkSession {
            date,
            check_in: ts(check_in_hour),
            check_out: check_out_hour.map(ts),
            work_minutes: 480,
        }
    }

    #[test]
    fn sums_only_completed_days() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        // Two complete days (+60 and -120 against the 480 target), one open
        store
            .upsert_session(&session(day(2025, 6, 2), 9, Some(18)))
            .unwrap();
        store
            .upsert_session(&session(day(2025, 6, 3), 9, Some(15)))
            .unwrap();
        store
            .upsert_session(&session(day(2025, 6, 4), 9, None))
            .unwrap();

        let summary = summarize_month(store.as_ref(), 2025, 6).unwrap();

        assert_eq!(summary.year_month, "2025-06");
        assert_eq!(summary.total_days, 3);
        assert_eq!(summary.checked_out_days, 2);
        assert_eq!(summary.overtime_minutes, -60);
    }

    #[test]
    fn empty_month_is_all_zeroes() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());

        let summary = summarize_month(store.as_ref(), 2025, 2).unwrap();

        assert_eq!(summary.year_month, "2025-02");
        assert_eq!(summary.total_days, 0);
        assert_eq!(summary.checked_out_days, 0);
        assert_eq!(summary.overtime_minutes, 0);
    }

    #[test]
    fn neighboring_months_do_not_leak() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        store
            .upsert_session(&session(day(2025, 5, 31), 9, Some(18)))
            .unwrap();
        store
            .upsert_session(&session(day(2025, 6, 30), 9, Some(18)))
            .unwrap();
        store
            .upsert_session(&session(day(2025, 7, 1), 9, Some(18)))
            .unwrap();

        let summary = summarize_month(store.as_ref(), 2025, 6).unwrap();

        assert_eq!(summary.total_days, 1);
    }

    #[test]
    fn rejects_nonsense_months() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());

        assert!(matches!(
            summarize_month(store.as_ref(), 2025, 13),
            Err(EngineError::InvalidInput(_))
        ));
    }
}
