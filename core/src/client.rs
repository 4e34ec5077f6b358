//! Blocking client for the Dwolla REST API.
//!
//! # Design
//! Every endpoint is split in two. `build_*` validates arguments and
//! produces an `HttpRequest` without touching the network; the plain method
//! sends that request through the configured `Transport` and unwraps the
//! response envelope. Validation failures therefore never reach the
//! transport.
//!
//! Each call returns a `Result`. The executing methods also remember the
//! message of the most recent failure so callers can fetch it once through
//! `take_last_error`. The `build_*` methods are pure and leave that slot
//! alone. It is per instance and not synchronised, so a client is not
//! `Sync`.

use std::cell::RefCell;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::{self, Session};
use crate::config::ClientConfig;
use crate::envelope::parse_envelope;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::request::RequestBuilder;
use crate::transport::{Transport, UreqTransport};
use crate::types::{ContactsQuery, ListingsQuery, MoneyRequestParams, RegisterParams, SendParams, StatsQuery};

/// Registration body: application credentials plus the account fields.
#[derive(Serialize)]
struct Registration<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    #[serde(flatten)]
    params: &'a RegisterParams,
}

/// Synchronous client holding credentials, the bearer token and the
/// last-error slot.
///
/// # Example
///
/// ```no_run
/// use dwolla_core::{ClientConfig, DwollaClient, SendParams};
///
/// # fn main() -> Result<(), dwolla_core::ApiError> {
/// let mut client = DwollaClient::new(ClientConfig::from_env()?);
/// println!("authorize at {}", client.authorization_url()?);
///
/// let token = client.exchange_code_for_token("code-from-redirect")?;
/// client.set_token(&token)?;
///
/// let balance = client.balance()?;
/// let transaction_id = client.send(&SendParams::new("1234", "812-111-2222", 1.50))?;
/// # let _ = (balance, transaction_id);
/// # Ok(())
/// # }
/// ```
pub struct DwollaClient {
    config: ClientConfig,
    session: Session,
    transport: Box<dyn Transport>,
    last_error: RefCell<Option<String>>,
}

impl DwollaClient {
    /// Client using the default ureq transport.
    pub fn new(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(&config);
        Self::with_transport(config, transport)
    }

    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config,
            session: Session::default(),
            transport: Box::new(transport),
            last_error: RefCell::new(None),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Authorization
    // -----------------------------------------------------------------------

    /// URL to send the user to. Pure function of the configuration.
    pub fn authorization_url(&self) -> Result<String, ApiError> {
        self.record(auth::authorization_url(&self.config))
    }

    pub fn build_token_request(&self, code: &str) -> Result<HttpRequest, ApiError> {
        auth::build_token_request(&self.config, code)
    }

    /// Trade an authorization code for an access token.
    ///
    /// The token is returned, not installed; pass it to `set_token`.
    pub fn exchange_code_for_token(&self, code: &str) -> Result<String, ApiError> {
        let result = self
            .build_token_request(code)
            .and_then(|request| self.round_trip(&request))
            .and_then(auth::parse_token_response);
        self.record(result)
    }

    pub fn set_token(&mut self, token: &str) -> Result<(), ApiError> {
        let result = self.session.set_token(token);
        self.record(result)
    }

    pub fn token(&self) -> Option<&str> {
        self.session.token()
    }

    /// Message of the most recent failure. Reading it clears the slot.
    pub fn take_last_error(&self) -> Option<String> {
        self.last_error.borrow_mut().take()
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    pub fn build_me(&self) -> Result<HttpRequest, ApiError> {
        self.requests().get(&["users"], Vec::new())
    }

    /// Profile of the account the bearer token belongs to.
    pub fn me(&self) -> Result<Value, ApiError> {
        self.dispatch(self.build_me())
    }

    pub fn build_user(&self, user_id: &str) -> Result<HttpRequest, ApiError> {
        if user_id.trim().is_empty() {
            return Err(ApiError::InvalidArgument("Please pass a user ID.".to_string()));
        }
        let params = vec![
            ("client_id", self.config.api_key.clone()),
            ("client_secret", self.config.secret().to_string()),
        ];
        self.requests().get(&["users", user_id], params)
    }

    /// Public profile of another account.
    pub fn user(&self, user_id: &str) -> Result<Value, ApiError> {
        self.dispatch(self.build_user(user_id))
    }

    /// Sent without a bearer token: registration precedes having one.
    pub fn build_register(&self, params: &RegisterParams) -> Result<HttpRequest, ApiError> {
        params.validate()?;
        let body = Registration {
            client_id: &self.config.api_key,
            client_secret: self.config.secret(),
            params,
        };
        self.requests().post(&["register", ""], &body, false)
    }

    pub fn register(&self, params: &RegisterParams) -> Result<Value, ApiError> {
        self.dispatch(self.build_register(params))
    }

    // -----------------------------------------------------------------------
    // Contacts
    // -----------------------------------------------------------------------

    pub fn build_contacts(&self, query: &ContactsQuery) -> Result<HttpRequest, ApiError> {
        self.requests().get(&["contacts"], query.to_params())
    }

    pub fn contacts(&self, query: &ContactsQuery) -> Result<Value, ApiError> {
        self.dispatch(self.build_contacts(query))
    }

    /// Same resource and filters as `build_contacts`; the provider ranks
    /// the results by distance from the account's location.
    pub fn build_nearby_contacts(&self, query: &ContactsQuery) -> Result<HttpRequest, ApiError> {
        self.build_contacts(query)
    }

    pub fn nearby_contacts(&self, query: &ContactsQuery) -> Result<Value, ApiError> {
        self.dispatch(self.build_nearby_contacts(query))
    }

    // -----------------------------------------------------------------------
    // Balance
    // -----------------------------------------------------------------------

    pub fn build_balance(&self) -> Result<HttpRequest, ApiError> {
        self.requests().get(&["balance"], Vec::new())
    }

    pub fn balance(&self) -> Result<Value, ApiError> {
        self.dispatch(self.build_balance())
    }

    // -----------------------------------------------------------------------
    // Transactions
    // -----------------------------------------------------------------------

    pub fn build_send(&self, params: &SendParams) -> Result<HttpRequest, ApiError> {
        params.validate()?;
        self.requests().post(&["transactions", "send"], params, true)
    }

    /// Send money. The payload is the new transaction id.
    pub fn send(&self, params: &SendParams) -> Result<Value, ApiError> {
        self.dispatch(self.build_send(params))
    }

    pub fn build_request(&self, params: &MoneyRequestParams) -> Result<HttpRequest, ApiError> {
        params.validate()?;
        self.requests().post(&["transactions", "request"], params, true)
    }

    /// Ask another account for money. The payload is the request id.
    pub fn request(&self, params: &MoneyRequestParams) -> Result<Value, ApiError> {
        self.dispatch(self.build_request(params))
    }

    pub fn build_transaction(&self, transaction_id: &str) -> Result<HttpRequest, ApiError> {
        if transaction_id.trim().is_empty() {
            return Err(ApiError::InvalidArgument(
                "Please enter a transaction ID.".to_string(),
            ));
        }
        self.requests().get(&["transactions", transaction_id], Vec::new())
    }

    pub fn transaction(&self, transaction_id: &str) -> Result<Value, ApiError> {
        self.dispatch(self.build_transaction(transaction_id))
    }

    pub fn build_listings(&self, query: &ListingsQuery) -> Result<HttpRequest, ApiError> {
        self.requests().get(&["transactions"], query.to_params())
    }

    /// Transaction history.
    pub fn listings(&self, query: &ListingsQuery) -> Result<Value, ApiError> {
        self.dispatch(self.build_listings(query))
    }

    pub fn build_stats(&self, query: &StatsQuery) -> Result<HttpRequest, ApiError> {
        self.requests().get(&["transactions", "stats"], query.to_params())
    }

    pub fn stats(&self, query: &StatsQuery) -> Result<Value, ApiError> {
        self.dispatch(self.build_stats(query))
    }

    // -----------------------------------------------------------------------
    // Plumbing
    // -----------------------------------------------------------------------

    fn requests(&self) -> RequestBuilder<'_> {
        RequestBuilder::new(&self.config, self.session.token())
    }

    fn dispatch(&self, request: Result<HttpRequest, ApiError>) -> Result<Value, ApiError> {
        let result = request
            .and_then(|request| self.round_trip(&request))
            .and_then(parse_envelope);
        self.record(result)
    }

    fn round_trip(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(
            method = request.method.as_str(),
            endpoint = request.endpoint(),
            "sending request"
        );
        let response = self.transport.execute(request)?;
        debug!(status = response.status, "received response");
        Ok(response)
    }

    fn record<T>(&self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if let Err(err) = &result {
            warn!(kind = err.kind(), error = %err, "dwolla call failed");
            *self.last_error.borrow_mut() = Some(err.to_string());
        }
        result
    }
}

impl std::fmt::Debug for DwollaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DwollaClient")
            .field("config", &self.config)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
