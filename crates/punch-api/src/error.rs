//! Error codes and the JSON error envelope

use serde::{Deserialize, Serialize};

/// Error codes for the HTTP API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidInput,
    NotFound,
    UpstreamUnavailable,
    UpstreamParseError,
    ConfigInvalid,
    Internal,
}

/// Error information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Top-level envelope for failed requests:
/// `{"error": {"code": "...", "message": "..."}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: ErrorInfo::new(code, message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_snake_case() {
        let json = serde_json::to_string(&ErrorCode::UpstreamParseError).unwrap();
        assert_eq!(json, "\"upstream_parse_error\"");
    }

    #[test]
    fn envelope_shape() {
        let resp = ErrorResponse::new(ErrorCode::NotFound, "no check-in recorded today");
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(
            json,
            "{\"error\":{\"code\":\"not_found\",\"message\":\"no check-in recorded today\"}}"
        );
    }
}
