use serde::{Deserialize, Serialize};

use crate::protocol::unknown_fields::UnknownFields;

pub const ERROR_TYPE_INVALID_REQUEST: &str = "invalid_request_error";
pub const ERROR_TYPE_AUTHENTICATION: &str = "authentication_error";
pub const ERROR_TYPE_PERMISSION: &str = "permission_error";
pub const ERROR_TYPE_NOT_FOUND: &str = "not_found_error";
pub const ERROR_TYPE_REQUEST_TOO_LARGE: &str = "request_too_large";
pub const ERROR_TYPE_RATE_LIMIT: &str = "rate_limit_error";
pub const ERROR_TYPE_API: &str = "api_error";
pub const ERROR_TYPE_OVERLOADED: &str = "overloaded_error";

/// Error envelope returned in place of a message: `{"type":"error","error":{...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub kind: ErrorResponseKind,

    /// Error details
    pub error: Error,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorResponseKind {
    #[default]
    Error,
}

impl From<Error> for ErrorResponse {
    fn from(error: Error) -> Self {
        Self {
            kind: ErrorResponseKind::Error,
            error,
        }
    }
}

/// Error payload of the Messages protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Error {
    /// The type of error that occurred.
    #[serde(rename = "type")]
    pub r#type: String,

    /// Human-readable error explanation.
    pub message: String,

    #[serde(flatten)]
    pub unknown_fields: UnknownFields,
}

impl Error {
    fn new(r#type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            r#type: r#type.into(),
            message: message.into(),
            unknown_fields: UnknownFields::default(),
        }
    }

    pub fn authentication_error(message: impl Into<String>) -> Self {
        Self::new(ERROR_TYPE_AUTHENTICATION, message)
    }

    pub fn api_error(message: impl Into<String>) -> Self {
        Self::new(ERROR_TYPE_API, message)
    }

    /// Error whose type matches what the Messages API reports for `status`.
    pub fn for_status(status: u16, message: impl Into<String>) -> Self {
        let r#type = match status {
            400 => ERROR_TYPE_INVALID_REQUEST,
            401 => ERROR_TYPE_AUTHENTICATION,
            403 => ERROR_TYPE_PERMISSION,
            404 => ERROR_TYPE_NOT_FOUND,
            413 => ERROR_TYPE_REQUEST_TOO_LARGE,
            429 => ERROR_TYPE_RATE_LIMIT,
            529 => ERROR_TYPE_OVERLOADED,
            _ => ERROR_TYPE_API,
        };

        Self::new(r#type, message)
    }
}
