//! Shared utilities for punchd
//!
//! This crate provides:
//! - Time utilities (wall-clock triggers, day keys, month arithmetic)
//! - Default paths for the data directory and database

mod paths;
mod time;

pub use paths::*;
pub use time::*;
