//! Client configuration: application credentials, requested scopes and
//! connection settings.

use std::fmt;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::error::ApiError;

/// REST API root used by every endpoint method.
pub const DEFAULT_API_BASE: &str = "https://www.dwolla.com/oauth/rest/";

/// OAuth root hosting the `authenticate` and `token` endpoints.
pub const DEFAULT_OAUTH_BASE: &str = "https://www.dwolla.com/oauth/v2/";

/// Permissions requested when the caller does not pick any.
pub const DEFAULT_SCOPES: [&str; 6] = [
    "send",
    "transactions",
    "balance",
    "request",
    "contacts",
    "accountinfofull",
];

/// Whether money movement is real or simulated by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Live,
    /// Every REST call carries `test=true`.
    Test,
}

impl Mode {
    fn parse(value: &str) -> Result<Self, ApiError> {
        match value.to_ascii_lowercase().as_str() {
            "live" => Ok(Mode::Live),
            "test" => Ok(Mode::Test),
            other => Err(ApiError::Config(format!("unknown mode: {other}"))),
        }
    }
}

/// Configuration for a `DwollaClient`.
///
/// Immutable once handed to the client.
///
/// # Example
///
/// ```
/// use dwolla_core::{ClientConfig, Mode};
/// use std::time::Duration;
///
/// let config = ClientConfig::new("key", "secret", "https://example.com/callback")
///     .with_scopes(["send", "balance"])
///     .with_mode(Mode::Test)
///     .with_connect_timeout(Duration::from_secs(2));
/// assert_eq!(config.scopes, vec!["send", "balance"]);
/// ```
pub struct ClientConfig {
    pub api_key: String,
    pub api_secret: SecretString,
    pub redirect_uri: String,
    /// Requested permissions, sent in this order.
    pub scopes: Vec<String>,
    pub mode: Mode,
    pub api_base: String,
    pub oauth_base: String,
    pub connect_timeout: Duration,
    pub max_redirects: u32,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: SecretString::from(api_secret.into()),
            redirect_uri: redirect_uri.into(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            mode: Mode::Live,
            api_base: DEFAULT_API_BASE.to_string(),
            oauth_base: DEFAULT_OAUTH_BASE.to_string(),
            connect_timeout: Duration::from_secs(5),
            max_redirects: 10,
            user_agent: format!("dwolla-core/{} (Rust)", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Load credentials from the environment.
    ///
    /// Reads `DWOLLA_API_KEY`, `DWOLLA_API_SECRET` and `DWOLLA_REDIRECT_URI`
    /// (required), plus `DWOLLA_SCOPES` (pipe or comma separated) and
    /// `DWOLLA_MODE` (`live` or `test`).
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ApiError::Config(format!("{name} is not set")))
        };

        let mut config = Self::new(
            required("DWOLLA_API_KEY")?,
            required("DWOLLA_API_SECRET")?,
            required("DWOLLA_REDIRECT_URI")?,
        );
        if let Some(scopes) = lookup("DWOLLA_SCOPES") {
            config = config.with_scopes(
                scopes
                    .split(['|', ','])
                    .map(str::trim)
                    .filter(|s| !s.is_empty()),
            );
        }
        if let Some(mode) = lookup("DWOLLA_MODE") {
            config = config.with_mode(Mode::parse(&mode)?);
        }
        Ok(config)
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Point the REST endpoints somewhere else, e.g. a local mock server.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = with_trailing_slash(base.into());
        self
    }

    /// Point the OAuth endpoints somewhere else.
    pub fn with_oauth_base(mut self, base: impl Into<String>) -> Self {
        self.oauth_base = with_trailing_slash(base.into());
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: u32) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub(crate) fn secret(&self) -> &str {
        self.api_secret.expose_secret()
    }

    /// Scopes in the wire format: pipe-delimited, configured order.
    pub fn scope_param(&self) -> String {
        self.scopes.join("|")
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .field("mode", &self.mode)
            .field("api_base", &self.api_base)
            .field("oauth_base", &self.oauth_base)
            .field("connect_timeout", &self.connect_timeout)
            .field("max_redirects", &self.max_redirects)
            .finish()
    }
}

fn with_trailing_slash(mut base: String) -> String {
    if !base.ends_with('/') {
        base.push('/');
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn defaults_match_provider() {
        let config = ClientConfig::new("key", "secret", "https://app/cb");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.oauth_base, DEFAULT_OAUTH_BASE);
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.mode, Mode::Live);
        assert_eq!(
            config.scope_param(),
            "send|transactions|balance|request|contacts|accountinfofull"
        );
    }

    #[test]
    fn base_urls_gain_trailing_slash() {
        let config = ClientConfig::new("k", "s", "r")
            .with_api_base("http://127.0.0.1:3000/oauth/rest")
            .with_oauth_base("http://127.0.0.1:3000/oauth/v2/");
        assert_eq!(config.api_base, "http://127.0.0.1:3000/oauth/rest/");
        assert_eq!(config.oauth_base, "http://127.0.0.1:3000/oauth/v2/");
    }

    #[test]
    fn debug_redacts_secret() {
        let config = ClientConfig::new("key", "super-secret", "r");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn from_lookup_reads_all_variables() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("DWOLLA_API_KEY", "key"),
            ("DWOLLA_API_SECRET", "secret"),
            ("DWOLLA_REDIRECT_URI", "https://app/cb"),
            ("DWOLLA_SCOPES", "send, balance|contacts"),
            ("DWOLLA_MODE", "TEST"),
        ]))
        .unwrap();
        assert_eq!(config.api_key, "key");
        assert_eq!(config.secret(), "secret");
        assert_eq!(config.scopes, vec!["send", "balance", "contacts"]);
        assert_eq!(config.mode, Mode::Test);
    }

    #[test]
    fn from_lookup_reports_first_missing_variable() {
        let err = ClientConfig::from_lookup(lookup(&[("DWOLLA_API_KEY", "key")])).unwrap_err();
        assert!(matches!(err, ApiError::Config(ref msg) if msg.contains("DWOLLA_API_SECRET")));
    }

    #[test]
    fn from_lookup_rejects_unknown_mode() {
        let err = ClientConfig::from_lookup(lookup(&[
            ("DWOLLA_API_KEY", "key"),
            ("DWOLLA_API_SECRET", "secret"),
            ("DWOLLA_REDIRECT_URI", "r"),
            ("DWOLLA_MODE", "staging"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }
}
