//! SQLite-based store implementation

use chrono::{DateTime, Local, NaiveDate};
use punch_util::{day_key, parse_day_key};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::{ReminderKind, Store, StoreError, StoreResult, WorkConfig, WorkSession};

/// SQLite-based store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute_batch(
            r#"
            -- One work session per calendar date
            CREATE TABLE IF NOT EXISTS work_sessions (
                date TEXT PRIMARY KEY,
                check_in TEXT NOT NULL,
                check_out TEXT,
                work_minutes INTEGER NOT NULL
            );

            -- Single configuration record
            CREATE TABLE IF NOT EXISTS work_config (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                work_minutes INTEGER NOT NULL,
                auto_fetch_enabled INTEGER NOT NULL DEFAULT 0,
                check_in_api_url TEXT NOT NULL DEFAULT '',
                p_auth TEXT NOT NULL DEFAULT '',
                p_rtoken TEXT NOT NULL DEFAULT '',
                check_in_webhook_url TEXT NOT NULL DEFAULT '',
                check_out_webhook_url TEXT NOT NULL DEFAULT ''
            );

            -- Reminder fire records, one per (date, trigger)
            CREATE TABLE IF NOT EXISTS reminder_firings (
                date TEXT NOT NULL,
                kind TEXT NOT NULL,
                fired_at TEXT NOT NULL,
                PRIMARY KEY (date, kind)
            );
            "#,
        )?;

        // Seed the config row so first-run reads see a usable record
        conn.execute(
            "INSERT OR IGNORE INTO work_config (id, work_minutes) VALUES (1, ?)",
            params![WorkConfig::default().work_minutes],
        )?;

        debug!("Store schema initialized");
        Ok(())
    }
}

fn parse_timestamp(s: &str) -> StoreResult<DateTime<Local>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|e| StoreError::Corrupt(format!("bad timestamp {:?}: {}", s, e)))
}

fn row_to_session(
    date: String,
    check_in: String,
    check_out: Option<String>,
    work_minutes: i64,
) -> StoreResult<WorkSession> {
    let date =
        parse_day_key(&date).ok_or_else(|| StoreError::Corrupt(format!("bad day key {:?}", date)))?;
    let check_in = parse_timestamp(&check_in)?;
    let check_out = check_out.as_deref().map(parse_timestamp).transpose()?;

    Ok(WorkSession {
        date,
        check_in,
        check_out,
        work_minutes,
    })
}

impl Store for SqliteStore {
    fn session(&self, date: NaiveDate) -> StoreResult<Option<WorkSession>> {
        let conn = self.conn.lock().unwrap();

        let row = conn
            .query_row(
                "SELECT date, check_in, check_out, work_minutes FROM work_sessions WHERE date = ?",
                [day_key(date)],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(date, check_in, check_out, work_minutes)| {
            row_to_session(date, check_in, check_out, work_minutes)
        })
        .transpose()
    }

    fn upsert_session(&self, session: &WorkSession) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            r#"
            INSERT INTO work_sessions (date, check_in, check_out, work_minutes)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(date)
            DO UPDATE SET
                check_in = excluded.check_in,
                check_out = excluded.check_out,
                work_minutes = excluded.work_minutes
            "#,
            params![
                day_key(session.date),
                session.check_in.to_rfc3339(),
                session.check_out.map(|dt| dt.to_rfc3339()),
                session.work_minutes,
            ],
        )?;

        debug!(date = %day_key(session.date), "Session upserted");
        Ok(())
    }

    fn sessions_between(&self, from: NaiveDate, to: NaiveDate) -> StoreResult<Vec<WorkSession>> {
        let conn = self.conn.lock().unwrap();

        // Day keys are zero-padded, so text comparison matches date order
        let mut stmt = conn.prepare(
            "SELECT date, check_in, check_out, work_minutes FROM work_sessions
             WHERE date >= ? AND date <= ? ORDER BY date",
        )?;

        let rows = stmt.query_map(params![day_key(from), day_key(to)], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;

        let mut sessions = Vec::new();
        for row in rows {
            let (date, check_in, check_out, work_minutes) = row?;
            sessions.push(row_to_session(date, check_in, check_out, work_minutes)?);
        }

        Ok(sessions)
    }

    fn config(&self) -> StoreResult<WorkConfig> {
        let conn = self.conn.lock().unwrap();

        let config = conn
            .query_row(
                "SELECT work_minutes, auto_fetch_enabled, check_in_api_url, p_auth, p_rtoken,
                        check_in_webhook_url, check_out_webhook_url
                 FROM work_config WHERE id = 1",
                [],
                |row| {
                    Ok(WorkConfig {
                        work_minutes: row.get(0)?,
                        auto_fetch_enabled: row.get(1)?,
                        check_in_api_url: row.get(2)?,
                        p_auth: row.get(3)?,
                        p_rtoken: row.get(4)?,
                        check_in_webhook_url: row.get(5)?,
                        check_out_webhook_url: row.get(6)?,
                    })
                },
            )
            .optional()?;

        Ok(config.unwrap_or_default())
    }

    fn save_config(&self, config: &WorkConfig) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            r#"
            INSERT INTO work_config (id, work_minutes, auto_fetch_enabled, check_in_api_url,
                                     p_auth, p_rtoken, check_in_webhook_url, check_out_webhook_url)
            VALUES (1, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id)
            DO UPDATE SET
                work_minutes = excluded.work_minutes,
                auto_fetch_enabled = excluded.auto_fetch_enabled,
                check_in_api_url = excluded.check_in_api_url,
                p_auth = excluded.p_auth,
                p_rtoken = excluded.p_rtoken,
                check_in_webhook_url = excluded.check_in_webhook_url,
                check_out_webhook_url = excluded.check_out_webhook_url
            "#,
            params![
                config.work_minutes,
                config.auto_fetch_enabled,
                config.check_in_api_url,
                config.p_auth,
                config.p_rtoken,
                config.check_in_webhook_url,
                config.check_out_webhook_url,
            ],
        )?;

        debug!(work_minutes = config.work_minutes, "Config saved");
        Ok(())
    }

    fn reminder_fired(&self, date: NaiveDate, kind: ReminderKind) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();

        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM reminder_firings WHERE date = ? AND kind = ?",
                params![day_key(date), kind.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        Ok(found.is_some())
    }

    fn claim_reminder(
        &self,
        date: NaiveDate,
        kind: ReminderKind,
        fired_at: DateTime<Local>,
    ) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO reminder_firings (date, kind, fired_at) VALUES (?, ?, ?)",
            params![day_key(date), kind.as_str(), fired_at.to_rfc3339()],
        )?;

        if inserted > 0 {
            debug!(date = %day_key(date), kind = kind.as_str(), "Reminder claimed");
        }
        Ok(inserted > 0)
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_session(day: u32) -> WorkSession {
        WorkSession {
            date: NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
            check_in: Local.with_ymd_and_hms(2025, 6, day, 9, 0, 0).unwrap(),
            check_out: None,
            work_minutes: 480,
        }
    }

    #[test]
    fn test_in_memory_store() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.is_healthy());
    }

    #[test]
    fn test_session_roundtrip() {
        let store = SqliteStore::in_memory().unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();

        assert!(store.session(date).unwrap().is_none());

        let session = sample_session(16);
        store.upsert_session(&session).unwrap();

        let loaded = store.session(date).unwrap().unwrap();
        assert_eq!(loaded, session);
    }

    #[test]
    fn test_upsert_replaces_existing() {
        let store = SqliteStore::in_memory().unwrap();

        let mut session = sample_session(16);
        store.upsert_session(&session).unwrap();

        session.check_out = Some(Local.with_ymd_and_hms(2025, 6, 16, 18, 0, 0).unwrap());
        session.work_minutes = 450;
        store.upsert_session(&session).unwrap();

        let loaded = store.session(session.date).unwrap().unwrap();
        assert_eq!(loaded.work_minutes, 450);
        assert!(loaded.is_complete());
    }

    #[test]
    fn test_sessions_between() {
        let store = SqliteStore::in_memory().unwrap();

        for day in [2, 10, 30] {
            store.upsert_session(&sample_session(day)).unwrap();
        }
        // Outside the queried month
        store
            .upsert_session(&WorkSession {
                date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
                check_in: Local.with_ymd_and_hms(2025, 7, 1, 9, 0, 0).unwrap(),
                check_out: None,
                work_minutes: 480,
            })
            .unwrap();

        let from = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let sessions = store.sessions_between(from, to).unwrap();

        let dates: Vec<NaiveDate> = sessions.iter().map(|s| s.date).collect();
        let expected: Vec<NaiveDate> = [2, 10, 30]
            .iter()
            .map(|&d| NaiveDate::from_ymd_opt(2025, 6, d).unwrap())
            .collect();
        assert_eq!(dates, expected);
    }

    #[test]
    fn test_config_defaults_until_saved() {
        let store = SqliteStore::in_memory().unwrap();

        let config = store.config().unwrap();
        assert_eq!(config.work_minutes, 480);
        assert!(!config.auto_fetch_enabled);

        let updated = WorkConfig {
            work_minutes: 450,
            auto_fetch_enabled: true,
            check_in_api_url: "https://hr.example.com/attendance".into(),
            ..WorkConfig::default()
        };
        store.save_config(&updated).unwrap();

        let loaded = store.config().unwrap();
        assert_eq!(loaded, updated);
    }

    #[test]
    fn test_claim_reminder_is_once_per_day() {
        let store = SqliteStore::in_memory().unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
        let fired_at = Local.with_ymd_and_hms(2025, 6, 16, 9, 55, 0).unwrap();

        assert!(!store.reminder_fired(date, ReminderKind::MorningCheckIn).unwrap());
        assert!(store
            .claim_reminder(date, ReminderKind::MorningCheckIn, fired_at)
            .unwrap());
        assert!(!store
            .claim_reminder(date, ReminderKind::MorningCheckIn, fired_at)
            .unwrap());
        assert!(store.reminder_fired(date, ReminderKind::MorningCheckIn).unwrap());

        // Other kinds and other dates are independent
        assert!(store
            .claim_reminder(date, ReminderKind::EveningCheckOut, fired_at)
            .unwrap());
        let next_day = NaiveDate::from_ymd_opt(2025, 6, 17).unwrap();
        assert!(store
            .claim_reminder(next_day, ReminderKind::MorningCheckIn, fired_at)
            .unwrap());
    }

    #[test]
    fn test_reopen_preserves_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("punchd.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.upsert_session(&sample_session(16)).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
        assert!(store.session(date).unwrap().is_some());
    }
}
