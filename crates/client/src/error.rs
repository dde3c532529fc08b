// Errors surfaced by the remote service seam.

use serde_json::Value;
use thiserror::Error;

/// Shown when a failure carries no usable message.
pub const UNEXPECTED_ERROR: &str = "Unexpected error. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response was received.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-2xx status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("invalid response: {0}")]
    Decode(String),

    /// Rejected before any request was issued.
    #[error("{0}")]
    InvalidArgument(&'static str),
}

impl ApiError {
    /// Build an HTTP failure from a response status and raw body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message =
            error_message_from_body(body).unwrap_or_else(|| format!("Request failed ({status})"));
        Self::Http { status, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Text suitable for a transient notification.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            UNEXPECTED_ERROR.to_string()
        } else {
            message
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Pull a human-readable message out of a JSON error body.
///
/// Looks at `message`, `detail`, `error` and `errors[0].message`, in that order.
pub fn error_message_from_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let fields = value.as_object()?;

    for key in ["message", "detail", "error"] {
        if let Some(Value::String(message)) = fields.get(key) {
            return Some(message.clone());
        }
    }

    fields
        .get("errors")?
        .as_array()?
        .first()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}
