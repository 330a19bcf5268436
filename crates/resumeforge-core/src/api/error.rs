//! API error classification
//!
//! Every failed request goes through the same classifier: the server error
//! payload (the body's `detail` field) becomes an [`ErrorDetail`], which is
//! attached to the error and logged. The human-readable message is then chosen per operation:
//!
//! - generation operations surface the server's message: a string payload
//!   verbatim, otherwise the object's `error` field, then its `message`
//!   field, then "Generation failed"
//! - every other operation uses its fixed message
//!
//! A structured payload is never stringified into the message.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// The API call an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Generate,
    CoverLetter,
    TokenStatus,
    Checkout,
    Products,
}

impl Operation {
    /// Message used when no server message is surfaced
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Operation::Generate | Operation::CoverLetter => "Generation failed",
            Operation::TokenStatus => "Failed to fetch token status",
            Operation::Checkout => "Failed to create checkout",
            Operation::Products => "Failed to fetch products",
        }
    }

    /// Whether the server's own message is shown to the user
    pub fn surfaces_server_message(&self) -> bool {
        matches!(self, Operation::Generate | Operation::CoverLetter)
    }

    /// The single display message for a failure with this detail
    pub fn display_message(&self, detail: &ErrorDetail) -> String {
        if self.surfaces_server_message() {
            if let Some(message) = detail.message() {
                return message.to_string();
            }
        }
        self.fallback_message().to_string()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Generate => "generate",
            Operation::CoverLetter => "cover-letter",
            Operation::TokenStatus => "token-status",
            Operation::Checkout => "checkout",
            Operation::Products => "products",
        };
        f.write_str(name)
    }
}

/// Server-provided error payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDetail {
    /// Plain string payload
    Text(String),
    /// Object payload; only string-valued fields are kept
    Structured {
        error: Option<String>,
        message: Option<String>,
        code: Option<String>,
    },
    /// No usable payload (no `detail`, not JSON, or not a string/object)
    Missing,
}

impl ErrorDetail {
    /// Classify a raw response body by its `detail` field
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => map
                .get("detail")
                .map_or(ErrorDetail::Missing, Self::from_value),
            _ => ErrorDetail::Missing,
        }
    }

    /// Classify an already-decoded payload
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => ErrorDetail::Text(s.clone()),
            Value::Object(map) => {
                let field = |name: &str| {
                    map.get(name)
                        .and_then(Value::as_str)
                        .map(str::to_string)
                };
                ErrorDetail::Structured {
                    error: field("error"),
                    message: field("message"),
                    code: field("code"),
                }
            }
            _ => ErrorDetail::Missing,
        }
    }

    /// Message by precedence: text, then `error`, then `message`
    ///
    /// Empty strings count as absent.
    pub fn message(&self) -> Option<&str> {
        match self {
            ErrorDetail::Text(s) => Some(s.as_str()),
            ErrorDetail::Structured { error, message, .. } => {
                error.as_deref().filter(|s| !s.is_empty()).or(message.as_deref())
            }
            ErrorDetail::Missing => None,
        }
        .filter(|s| !s.is_empty())
    }

    /// Machine-readable code, when the server sent one
    pub fn code(&self) -> Option<&str> {
        match self {
            ErrorDetail::Structured { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// Failure of an API request
///
/// `Display` is always the one message meant for the user.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Server answered with a non-success status
    #[error("{message}")]
    Status {
        operation: Operation,
        status: u16,
        message: String,
        detail: ErrorDetail,
    },

    /// No response (connection refused, DNS, timeout, body read)
    #[error("{message}")]
    Transport {
        operation: Operation,
        message: String,
        #[source]
        source: reqwest::Error,
    },

    /// Success status with a body that does not match the expected shape
    #[error("{message}")]
    Decode {
        operation: Operation,
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Caller cancelled before the result arrived
    #[error("Request cancelled")]
    Cancelled { operation: Operation },
}

impl ApiError {
    pub(crate) fn status(operation: Operation, status: u16, detail: ErrorDetail) -> Self {
        ApiError::Status {
            operation,
            status,
            message: operation.display_message(&detail),
            detail,
        }
    }

    pub(crate) fn transport(operation: Operation, source: reqwest::Error) -> Self {
        ApiError::Transport {
            operation,
            message: operation.display_message(&ErrorDetail::Missing),
            source,
        }
    }

    pub(crate) fn decode(operation: Operation, source: serde_json::Error) -> Self {
        ApiError::Decode {
            operation,
            message: operation.display_message(&ErrorDetail::Missing),
            source,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            ApiError::Status { operation, .. }
            | ApiError::Transport { operation, .. }
            | ApiError::Decode { operation, .. }
            | ApiError::Cancelled { operation } => *operation,
        }
    }

    /// HTTP status, when the server answered
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Classified server payload, when the server answered
    pub fn detail(&self) -> Option<&ErrorDetail> {
        match self {
            ApiError::Status { detail, .. } => Some(detail),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled { .. })
    }

    /// Out of quota: 402, or a `payment_required` code
    pub fn is_payment_required(&self) -> bool {
        self.http_status() == Some(402)
            || self.detail().and_then(ErrorDetail::code) == Some("payment_required")
    }
}
