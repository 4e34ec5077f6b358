//! Error types for the Dwolla API client.
//!
//! # Design
//! Every failure an endpoint can produce is one `ApiError` variant. The
//! `Display` text of each variant is exactly what the client records in its
//! last-error slot, so callers that only want a message can use either the
//! returned error or `DwollaClient::take_last_error`.
//!
//! Validation failures (`InvalidArgument`) are raised before a request is
//! built and never reach the transport.

use serde_json::Value;
use thiserror::Error;

/// Errors returned by `DwollaClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required argument was missing or empty. Detected locally.
    #[error("{0}")]
    InvalidArgument(String),

    /// The connection could not be established (DNS, refused, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a status other than 200.
    #[error("Request failed. Server responded with: {status}")]
    HttpError { status: u16, body: String },

    /// The envelope came back with `Success: false`.
    ///
    /// `detail` holds the envelope's `Response` when it carried anything
    /// useful, e.g. per-field validation errors from registration.
    #[error("{}", render_rejection(.message, .detail))]
    Rejected {
        message: String,
        detail: Option<Value>,
    },

    /// The OAuth token endpoint returned an `error` field.
    #[error("{description}")]
    OAuth { error: String, description: String },

    /// The response body could not be deserialized into the expected shape.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// A configured base URL is not a valid URL.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Required configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status code for `HttpError`, `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` for failures detected before any network I/O.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ApiError::InvalidArgument(_)
                | ApiError::SerializationError(_)
                | ApiError::UrlParse(_)
                | ApiError::Config(_)
        )
    }

    /// Short, stable name of the variant for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidArgument(_) => "invalid_argument",
            ApiError::Transport(_) => "transport",
            ApiError::HttpError { .. } => "http_status",
            ApiError::Rejected { .. } => "rejected",
            ApiError::OAuth { .. } => "oauth",
            ApiError::DeserializationError(_) => "deserialization",
            ApiError::SerializationError(_) => "serialization",
            ApiError::UrlParse(_) => "url_parse",
            ApiError::Config(_) => "config",
        }
    }
}

fn render_rejection(message: &str, detail: &Option<Value>) -> String {
    match detail {
        Some(detail) if message.is_empty() => detail.to_string(),
        Some(detail) => format!("{message} {detail}"),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn http_error_embeds_status_code() {
        let err = ApiError::HttpError {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Request failed. Server responded with: 500");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn rejection_appends_detail() {
        let err = ApiError::Rejected {
            message: "Validation failed".to_string(),
            detail: Some(json!({"email": "invalid"})),
        };
        assert_eq!(err.to_string(), r#"Validation failed {"email":"invalid"}"#);
    }

    #[test]
    fn rejection_without_detail_is_just_the_message() {
        let err = ApiError::Rejected {
            message: "Invalid access token.".to_string(),
            detail: None,
        };
        assert_eq!(err.to_string(), "Invalid access token.");
    }

    #[test]
    fn oauth_error_displays_description() {
        let err = ApiError::OAuth {
            error: "invalid_grant".to_string(),
            description: "bad code".to_string(),
        };
        assert_eq!(err.to_string(), "bad code");
        assert_eq!(err.kind(), "oauth");
    }

    #[test]
    fn validation_errors_are_local() {
        assert!(ApiError::InvalidArgument("Please enter a PIN.".to_string()).is_local());
        assert!(!ApiError::Transport("refused".to_string()).is_local());
    }
}
