//! Persistence layer for punchd
//!
//! Provides:
//! - Work sessions (one per calendar date)
//! - The single mutable configuration record
//! - Reminder fire records (per-date, per-trigger dedup)

mod sqlite;
mod traits;
mod types;

pub use sqlite::*;
pub use traits::*;
pub use types::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
