//! The `{Success, Message, Response}` wrapper around every REST payload.
//!
//! # Design
//! Payload shapes are endpoint-specific and not fixed by the provider's
//! contract, so a successful envelope yields its `Response` as an untyped
//! `serde_json::Value`. A failed envelope becomes `ApiError::Rejected`,
//! keeping the `Response` as detail only when it carries something (the
//! provider puts per-field validation errors there).

use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpResponse;

#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(rename = "Success", default)]
    pub success: bool,
    #[serde(rename = "Message", default)]
    pub message: Option<String>,
    #[serde(rename = "Response", default)]
    pub response: Option<Value>,
}

impl Envelope {
    /// Unwrap the payload, or turn the failure message into an error.
    pub fn into_result(self) -> Result<Value, ApiError> {
        if self.success {
            return Ok(self.response.unwrap_or(Value::Null));
        }
        Err(ApiError::Rejected {
            message: self.message.unwrap_or_default(),
            detail: self.response.filter(is_truthy),
        })
    }
}

/// Reject anything but a 200, then decode the envelope.
pub fn parse_envelope(response: HttpResponse) -> Result<Value, ApiError> {
    check_status(&response)?;
    let envelope: Envelope = serde_json::from_str(&response.body)
        .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
    envelope.into_result()
}

/// Every provider endpoint answers 200, even for logical failures.
pub(crate) fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.status == 200 {
        return Ok(());
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_returns_payload_unchanged() {
        let body = r#"{"Success":true,"Message":"Success","Response":{"balance":"100.00"}}"#;
        let payload = parse_envelope(HttpResponse::new(200, body)).unwrap();
        assert_eq!(payload, json!({"balance": "100.00"}));
    }

    #[test]
    fn success_without_response_is_null() {
        let payload = parse_envelope(HttpResponse::new(200, r#"{"Success":true}"#)).unwrap();
        assert!(payload.is_null());
    }

    #[test]
    fn success_with_scalar_payload() {
        let body = r#"{"Success":true,"Message":"Success","Response":12345}"#;
        assert_eq!(parse_envelope(HttpResponse::new(200, body)).unwrap(), json!(12345));
    }

    #[test]
    fn failure_keeps_structured_detail() {
        let body = r#"{"Success":false,"Message":"Validation failed","Response":{"email":"invalid"}}"#;
        let err = parse_envelope(HttpResponse::new(200, body)).unwrap_err();
        match err {
            ApiError::Rejected { message, detail } => {
                assert_eq!(message, "Validation failed");
                assert_eq!(detail, Some(json!({"email": "invalid"})));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn failure_drops_falsy_detail() {
        for response in ["null", "false", "\"\"", "[]", "{}", "0"] {
            let body = format!(r#"{{"Success":false,"Message":"Invalid access token.","Response":{response}}}"#);
            let err = parse_envelope(HttpResponse::new(200, body)).unwrap_err();
            assert!(
                matches!(err, ApiError::Rejected { detail: None, .. }),
                "Response {response} should be dropped"
            );
        }
    }

    #[test]
    fn non_200_short_circuits_before_decoding() {
        let err = parse_envelope(HttpResponse::new(500, "<html>oops</html>")).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, .. }));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn malformed_body_is_a_deserialization_error() {
        let err = parse_envelope(HttpResponse::new(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }
}
