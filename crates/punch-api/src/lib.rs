//! Wire types for the punchd HTTP API
//!
//! This crate defines the stable JSON contract between punchd and its
//! clients:
//! - Request bodies
//! - Response bodies
//! - Error codes and the error envelope

mod error;
mod requests;
mod responses;

pub use error::*;
pub use requests::*;
pub use responses::*;
