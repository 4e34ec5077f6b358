//! HTTP request and response types exchanged with a `Transport`.
//!
//! # Design
//! Requests and responses are plain data. `DwollaClient::build_*` methods
//! produce an `HttpRequest` without touching the network, a `Transport`
//! turns it into an `HttpResponse`, and the parse layer interprets the
//! response. Keeping the I/O behind this boundary lets tests substitute a
//! canned transport and lets hosts bring their own HTTP stack.
//!
//! All fields use owned types so values can be stored or logged freely.

/// Value sent in the `Accept` header of every request.
pub const ACCEPT_JSON: &str = "application/json";

/// Value sent in the `Content-Type` header of every request.
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=UTF-8";

/// HTTP method for a request. The provider only uses GET and POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data.
///
/// `url` is absolute and already carries the query string, including the
/// bearer token for authenticated calls.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Build a request carrying the fixed JSON headers. `Content-Length` is
    /// added when a body is present.
    pub fn new(method: HttpMethod, url: String, body: Option<String>) -> Self {
        let mut headers = vec![
            ("accept".to_string(), ACCEPT_JSON.to_string()),
            ("content-type".to_string(), CONTENT_TYPE_JSON.to_string()),
        ];
        if let Some(body) = &body {
            headers.push(("content-length".to_string(), body.len().to_string()));
        }
        Self {
            method,
            url,
            headers,
            body,
        }
    }

    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// URL with the query string removed, safe to log.
    pub fn endpoint(&self) -> &str {
        self.url.split('?').next().unwrap_or(&self.url)
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// A response with no headers, mostly useful for tests and custom
    /// transports.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}
