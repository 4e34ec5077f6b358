//! Synchronous client for the Dwolla REST API.
//!
//! # Overview
//! Performs the OAuth2 authorization-code exchange, attaches the bearer
//! token to every authenticated call and exposes one method per endpoint
//! (profile, registration, contacts, balance, send/request money,
//! transaction lookup, history and stats).
//!
//! # Design
//! - Each endpoint has a pure `build_*` method producing an `HttpRequest`
//!   and a method that executes it, so requests can be inspected or sent by
//!   a host's own HTTP stack.
//! - I/O lives behind the `Transport` trait; `UreqTransport` is the default.
//! - Every REST response is wrapped in a `{Success, Message, Response}`
//!   envelope. Successful payloads are returned as `serde_json::Value`
//!   because their shape varies per endpoint.
//! - Failures come back as `ApiError`; the client also keeps the last
//!   failure message for one read through `take_last_error`.

pub mod auth;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
mod request;
pub mod transport;
pub mod types;

pub use client::DwollaClient;
pub use config::{ClientConfig, Mode};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{
    AccountType, ContactsQuery, ListingsQuery, MoneyRequestParams, RegisterParams,
    RegistrationType, SendParams, StatType, StatsQuery, TransactionType,
};
