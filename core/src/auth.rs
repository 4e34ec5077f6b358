//! OAuth2 authorization-code flow and bearer token storage.
//!
//! # Design
//! Obtaining a token and using it are separate steps: exchanging a code
//! returns the access token but does not install it. The caller decides
//! when to hand it to `DwollaClient::set_token`.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::config::ClientConfig;
use crate::envelope::check_status;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::request::endpoint_url;

/// URL the user is sent to in order to grant the configured scopes.
pub fn authorization_url(config: &ClientConfig) -> Result<String, ApiError> {
    endpoint_url(
        &config.oauth_base,
        &["authenticate"],
        &[
            ("client_id", config.api_key.clone()),
            ("response_type", "code".to_string()),
            ("redirect_uri", config.redirect_uri.clone()),
            ("scope", config.scope_param()),
        ],
    )
}

/// GET request exchanging an authorization `code` for an access token.
pub fn build_token_request(config: &ClientConfig, code: &str) -> Result<HttpRequest, ApiError> {
    if code.trim().is_empty() {
        return Err(ApiError::InvalidArgument(
            "Please pass an oauth code.".to_string(),
        ));
    }
    let url = endpoint_url(
        &config.oauth_base,
        &["token"],
        &[
            ("client_id", config.api_key.clone()),
            ("client_secret", config.secret().to_string()),
            ("redirect_uri", config.redirect_uri.clone()),
            ("grant_type", "authorization_code".to_string()),
            ("code", code.to_string()),
        ],
    )?;
    Ok(HttpRequest::new(HttpMethod::Get, url, None))
}

/// The token endpoint answers outside the usual envelope.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

pub fn parse_token_response(response: HttpResponse) -> Result<String, ApiError> {
    check_status(&response)?;
    let token: TokenResponse = serde_json::from_str(&response.body)
        .map_err(|e| ApiError::DeserializationError(e.to_string()))?;

    if let Some(error) = token.error {
        let description = token.error_description.unwrap_or_else(|| error.clone());
        return Err(ApiError::OAuth { error, description });
    }
    token.access_token.ok_or_else(|| {
        ApiError::DeserializationError("token response has no access_token".to_string())
    })
}

/// The bearer token attached to authenticated calls.
#[derive(Default)]
pub struct Session {
    token: Option<SecretString>,
}

impl Session {
    pub fn set_token(&mut self, token: &str) -> Result<(), ApiError> {
        if token.trim().is_empty() {
            return Err(ApiError::InvalidArgument(
                "Please pass a token string.".to_string(),
            ));
        }
        self.token = Some(SecretString::from(token.to_string()));
        Ok(())
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_ref().map(|token| token.expose_secret())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
