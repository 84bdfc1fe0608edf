//! Error types for the gateway bridge.
//!
//! Every failure here is fatal for the invocation. Lossy header values and a
//! missing `start_response` call are not errors: the first is handled by
//! substitution, the second renders as a 500 response.

use lambda_runtime::Diagnostic;
use std::fmt;

#[derive(Debug)]
pub enum BridgeError {
    /// A required event field is missing
    MalformedEvent(&'static str),
    /// The payload does not have the shape of a gateway event
    InvalidEvent(String),
    /// The request body is flagged as base64 but does not decode
    DecodeFailure(String),
    /// The application returned an error
    Application(String),
}

impl BridgeError {
    /// Stable name used as the Lambda `errorType`.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MalformedEvent(_) => "MalformedEvent",
            Self::InvalidEvent(_) => "InvalidEvent",
            Self::DecodeFailure(_) => "DecodeFailure",
            Self::Application(_) => "ApplicationError",
        }
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedEvent(field) => {
                write!(f, "Malformed event: missing required field `{field}`")
            }
            Self::InvalidEvent(msg) => write!(f, "Invalid event: {msg}"),
            Self::DecodeFailure(msg) => write!(f, "Failed to decode base64 request body: {msg}"),
            Self::Application(msg) => write!(f, "Application error: {msg}"),
        }
    }
}

impl std::error::Error for BridgeError {}

impl From<base64::DecodeError> for BridgeError {
    fn from(error: base64::DecodeError) -> Self {
        Self::DecodeFailure(error.to_string())
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(error: serde_json::Error) -> Self {
        Self::InvalidEvent(error.to_string())
    }
}

impl From<anyhow::Error> for BridgeError {
    fn from(error: anyhow::Error) -> Self {
        // {:#} keeps the whole context chain
        Self::Application(format!("{error:#}"))
    }
}

impl From<BridgeError> for Diagnostic {
    fn from(error: BridgeError) -> Self {
        Self {
            error_type: error.kind().to_string(),
            error_message: error.to_string(),
        }
    }
}
