//! URL and request construction for the REST endpoints.
//!
//! GET calls carry their parameters in the query string. POST calls carry
//! their parameters as the JSON body and only the bearer token (when
//! requested) in the query string, so PINs and passwords never end up in a
//! URL.

use serde::Serialize;
use url::Url;

use crate::config::{ClientConfig, Mode};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};

/// Join `segments` onto `base` and append `params` as an encoded query.
pub(crate) fn endpoint_url(
    base: &str,
    segments: &[&str],
    params: &[(&str, String)],
) -> Result<String, ApiError> {
    let mut url = Url::parse(base)?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| ApiError::Config(format!("{base} cannot be used as a base URL")))?;
        path.pop_if_empty().extend(segments);
    }
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    Ok(url.into())
}

/// Builds authenticated (or explicitly unauthenticated) REST requests.
pub(crate) struct RequestBuilder<'a> {
    config: &'a ClientConfig,
    token: Option<&'a str>,
}

impl<'a> RequestBuilder<'a> {
    pub(crate) fn new(config: &'a ClientConfig, token: Option<&'a str>) -> Self {
        Self { config, token }
    }

    pub(crate) fn get(
        &self,
        segments: &[&str],
        mut params: Vec<(&str, String)>,
    ) -> Result<HttpRequest, ApiError> {
        self.append_common(&mut params, true);
        let url = endpoint_url(&self.config.api_base, segments, &params)?;
        Ok(HttpRequest::new(HttpMethod::Get, url, None))
    }

    pub(crate) fn post<B: Serialize>(
        &self,
        segments: &[&str],
        body: &B,
        include_token: bool,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut params = Vec::new();
        self.append_common(&mut params, include_token);
        let url = endpoint_url(&self.config.api_base, segments, &params)?;
        Ok(HttpRequest::new(HttpMethod::Post, url, Some(body)))
    }

    fn append_common(&self, params: &mut Vec<(&str, String)>, include_token: bool) {
        if self.config.mode == Mode::Test {
            params.push(("test", "true".to_string()));
        }
        if include_token {
            match self.token {
                Some(token) => params.push(("oauth_token", token.to_string())),
                None => tracing::debug!("no bearer token set; sending request without one"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> ClientConfig {
        ClientConfig::new("key", "secret", "https://app/cb")
    }

    fn query(url: &str) -> Vec<(String, String)> {
        Url::parse(url)
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn endpoint_url_joins_segments() {
        let url = endpoint_url(
            "https://www.dwolla.com/oauth/rest/",
            &["transactions", "stats"],
            &[],
        )
        .unwrap();
        assert_eq!(url, "https://www.dwolla.com/oauth/rest/transactions/stats");
    }

    #[test]
    fn endpoint_url_encodes_path_segments() {
        let url = endpoint_url("https://x/rest/", &["users", "a b/c"], &[]).unwrap();
        assert_eq!(url, "https://x/rest/users/a%20b%2Fc");
    }

    #[test]
    fn endpoint_url_keeps_trailing_empty_segment() {
        let url = endpoint_url("https://x/rest/", &["register", ""], &[]).unwrap();
        assert_eq!(url, "https://x/rest/register/");
    }

    #[test]
    fn get_appends_token_after_params() {
        let config = config();
        let req = RequestBuilder::new(&config, Some("tok"))
            .get(&["contacts"], vec![("search", "Ben".to_string())])
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert!(req.body.is_none());
        assert_eq!(
            query(&req.url),
            vec![
                ("search".to_string(), "Ben".to_string()),
                ("oauth_token".to_string(), "tok".to_string()),
            ]
        );
    }

    #[test]
    fn post_keeps_params_out_of_query() {
        let config = config();
        let req = RequestBuilder::new(&config, Some("tok"))
            .post(&["transactions", "send"], &json!({"pin": "1234"}), true)
            .unwrap();
        assert_eq!(query(&req.url), vec![("oauth_token".to_string(), "tok".to_string())]);
        assert_eq!(req.body.as_deref(), Some(r#"{"pin":"1234"}"#));
    }

    #[test]
    fn post_without_token_has_no_query() {
        let config = config();
        let req = RequestBuilder::new(&config, Some("tok"))
            .post(&["register", ""], &json!({}), false)
            .unwrap();
        assert!(!req.url.contains('?'));
    }

    #[test]
    fn test_mode_flags_every_request() {
        let config = config().with_mode(Mode::Test);
        let builder = RequestBuilder::new(&config, None);
        let get = builder.get(&["balance"], Vec::new()).unwrap();
        let post = builder.post(&["register", ""], &json!({}), false).unwrap();
        assert_eq!(query(&get.url), vec![("test".to_string(), "true".to_string())]);
        assert_eq!(query(&post.url), vec![("test".to_string(), "true".to_string())]);
    }

    #[test]
    fn invalid_base_is_reported() {
        let config = config().with_api_base("not a url");
        let err = RequestBuilder::new(&config, None)
            .get(&["balance"], Vec::new())
            .unwrap_err();
        assert!(matches!(err, ApiError::UrlParse(_)));
    }
}
