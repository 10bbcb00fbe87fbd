//! Outbound HTTP for punchd
//!
//! Provides:
//! - HR attendance client (recorded check-in lookup)
//! - Webhook notifier (ntfy-flavored reminders)
//! - Business-day calendars (workweek mask, holiday endpoint)
//! - Mock implementations for testing

mod calendar;
mod hr;
mod mock;
mod webhook;

pub use calendar::*;
pub use hr::*;
pub use mock::*;
pub use webhook::*;

use thiserror::Error;

/// Errors from outbound HTTP operations
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Network failure, timeout, or other transport problem
    #[error("Upstream unavailable: {0}")]
    Unavailable(String),

    /// Upstream answered with a non-success HTTP status
    #[error("Upstream returned status {0}")]
    Status(u16),

    /// Upstream answered 2xx but reported failure in the body
    #[error("Upstream rejected the request: {0}")]
    Rejected(String),

    /// Upstream body did not match the expected shape
    #[error("Unexpected upstream response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Unavailable(e.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
