//! Verify request building and envelope parsing against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Bodies and query strings are compared as parsed data (not raw strings)
//! so key ordering inside JSON bodies cannot cause false negatives. Query
//! parameter order is part of the contract and is compared exactly.

use dwolla_core::envelope::parse_envelope;
use dwolla_core::{
    ApiError, ClientConfig, ContactsQuery, DwollaClient, HttpMethod, HttpRequest, HttpResponse,
    ListingsQuery, MoneyRequestParams, SendParams, StatsQuery, Transport,
};
use serde_json::Value;
use url::Url;

const API_BASE: &str = "https://www.dwolla.com/oauth/rest/";

/// Build-only tests never execute a request.
struct Unreachable;

impl Transport for Unreachable {
    fn execute(&self, _request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        panic!("test vectors must not reach the transport");
    }
}

fn client() -> DwollaClient {
    let mut client = DwollaClient::with_transport(
        ClientConfig::new("vector-key", "vector-secret", "https://app.example.com/callback"),
        Unreachable,
    );
    client.set_token("vector-token").unwrap();
    client
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn str_field<'a>(input: &'a Value, name: &str) -> &'a str {
    input[name].as_str().unwrap_or_default()
}

fn build(client: &DwollaClient, endpoint: &str, input: &Value) -> Result<HttpRequest, ApiError> {
    match endpoint {
        "balance" => client.build_balance(),
        "me" => client.build_me(),
        "user" => client.build_user(str_field(input, "id")),
        "transaction" => client.build_transaction(str_field(input, "id")),
        "contacts" | "nearby_contacts" => {
            let mut query = ContactsQuery::default();
            if let Some(search) = input["search"].as_str() {
                query = query.with_search(search);
            }
            if let Some(limit) = input["limit"].as_u64() {
                query = query.with_limit(limit as u32);
            }
            if endpoint == "nearby_contacts" {
                client.build_nearby_contacts(&query)
            } else {
                client.build_contacts(&query)
            }
        }
        "listings" => client.build_listings(&ListingsQuery::default()),
        "stats" => client.build_stats(&StatsQuery::default()),
        "send" => client.build_send(
            &SendParams::new(
                str_field(input, "pin"),
                str_field(input, "destinationId"),
                input["amount"].as_f64().unwrap(),
            )
            .with_notes(str_field(input, "notes")),
        ),
        "request" => client.build_request(
            &MoneyRequestParams::new(
                str_field(input, "pin"),
                str_field(input, "sourceId"),
                input["amount"].as_f64().unwrap(),
            )
            .with_notes(str_field(input, "notes")),
        ),
        other => panic!("unknown endpoint: {other}"),
    }
}

fn query_pairs(url: &str) -> Vec<(String, String)> {
    Url::parse(url)
        .unwrap()
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let endpoint = case["endpoint"].as_str().unwrap();
        let result = build(&c, endpoint, &case["input"]);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            assert!(matches!(err, ApiError::InvalidArgument(_)), "{name}: expected InvalidArgument");
            assert_eq!(err.to_string(), expected_error.as_str().unwrap(), "{name}: message");
            continue;
        }

        let req = result.unwrap();
        let expected_req = &case["expected_request"];
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(
            req.endpoint(),
            format!("{API_BASE}{}", expected_req["path"].as_str().unwrap()),
            "{name}: path"
        );

        let expected_query: Vec<(String, String)> =
            serde_json::from_value(expected_req["query"].clone()).unwrap();
        assert_eq!(query_pairs(&req.url), expected_query, "{name}: query");

        assert_eq!(req.header("accept"), Some("application/json"), "{name}: accept");
        match req.body.as_deref() {
            Some(body) => {
                let body: Value = serde_json::from_str(body).unwrap();
                assert_eq!(body, expected_req["body"], "{name}: body");
            }
            None => assert!(expected_req["body"].is_null(), "{name}: body should be None"),
        }
    }
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

#[test]
fn envelope_test_vectors() {
    let raw = include_str!("../../test-vectors/envelopes.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["simulated_response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body: sim["body"].as_str().unwrap().to_string(),
        };
        let result = parse_envelope(response);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            assert_eq!(err.kind(), expected_error["kind"].as_str().unwrap(), "{name}: kind");
            if let Some(message) = expected_error["message"].as_str() {
                assert_eq!(err.to_string(), message, "{name}: message");
            }
        } else {
            assert_eq!(result.unwrap(), case["expected_result"], "{name}: parsed result");
        }
    }
}
