//! Core engine for punchd
//!
//! This crate owns the tracker's behavior:
//! - Check-in/check-out state transitions and signed overtime math
//! - Configuration updates and their effect on today's target
//! - Monthly aggregation
//! - Reminder trigger policy and the scheduler that delivers webhooks

mod engine;
mod reminder;
mod scheduler;
mod stats;

pub use engine::*;
pub use reminder::*;
pub use scheduler::*;
pub use stats::*;

use punch_store::StoreError;
use thiserror::Error;

/// Engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::ConfigInvalid(message.into())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
