use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const API_KEY: &str = "mock-key";
pub const API_SECRET: &str = "mock-secret";
pub const AUTH_CODE: &str = "mock-code";
pub const PIN: &str = "1234";
pub const ACCOUNT_ID: &str = "812-000-0001";
pub const OPENING_BALANCE: f64 = 100.0;

type Params = HashMap<String, String>;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Transaction {
    pub id: u64,
    pub amount: f64,
    pub source_id: String,
    pub destination_id: String,
    pub destination_type: String,
    #[serde(rename = "Type")]
    pub kind: String,
    pub notes: String,
    pub status: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Contact {
    pub id: String,
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: String,
    pub city: String,
    pub state: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMoney {
    pub pin: String,
    pub destination_id: String,
    #[serde(default = "dwolla")]
    pub destination_type: String,
    pub amount: f64,
    #[serde(default)]
    pub notes: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMoney {
    pub pin: String,
    pub source_id: String,
    pub amount: f64,
}

fn dwolla() -> String {
    "Dwolla".to_string()
}

pub struct Ledger {
    pub balance: f64,
    pub transactions: Vec<Transaction>,
    pub pending_requests: Vec<u64>,
    pub tokens: HashSet<String>,
    next_id: u64,
}

impl Ledger {
    fn new() -> Self {
        Self {
            balance: OPENING_BALANCE,
            transactions: vec![Transaction {
                id: 1,
                amount: OPENING_BALANCE,
                source_id: "Bank".to_string(),
                destination_id: ACCOUNT_ID.to_string(),
                destination_type: "Dwolla".to_string(),
                kind: "deposit".to_string(),
                notes: "Opening deposit".to_string(),
                status: "processed".to_string(),
            }],
            pending_requests: Vec::new(),
            tokens: HashSet::new(),
            next_id: 2,
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

pub type Db = Arc<RwLock<Ledger>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Ledger::new()));
    Router::new()
        .route("/oauth/v2/token", get(token))
        .route("/oauth/rest/users", get(me))
        .route("/oauth/rest/users/{id}", get(user))
        .route("/oauth/rest/register/", post(register))
        .route("/oauth/rest/contacts", get(contacts))
        .route("/oauth/rest/balance", get(balance))
        .route("/oauth/rest/transactions", get(listings))
        .route("/oauth/rest/transactions/stats", get(stats))
        .route("/oauth/rest/transactions/send", post(send))
        .route("/oauth/rest/transactions/request", post(request_money))
        .route("/oauth/rest/transactions/{id}", get(transaction))
        .route("/relocated/{*rest}", get(relocated))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn success(response: Value) -> Json<Value> {
    Json(json!({"Success": true, "Message": "Success", "Response": response}))
}

fn failure(message: &str, response: Value) -> Json<Value> {
    Json(json!({"Success": false, "Message": message, "Response": response}))
}

fn param<'a>(params: &'a Params, name: &str) -> Option<&'a str> {
    params.get(name).map(String::as_str)
}

async fn authorized(db: &Db, params: &Params) -> Result<(), Json<Value>> {
    let known = match param(params, "oauth_token") {
        Some(token) => db.read().await.tokens.contains(token),
        None => false,
    };
    if known {
        Ok(())
    } else {
        Err(failure("Invalid access token.", Value::Null))
    }
}

fn app_credentials_match(client_id: Option<&str>, client_secret: Option<&str>) -> bool {
    client_id == Some(API_KEY) && client_secret == Some(API_SECRET)
}

fn contact_book() -> Vec<Contact> {
    [
        ("812-111-1111", "Ben Franklin", "Dwolla", "Philadelphia", "PA"),
        ("812-222-2222", "Ada Lovelace", "Dwolla", "London", "LN"),
        ("ben.facebook", "Ben Facebook", "Facebook", "Menlo Park", "CA"),
    ]
    .into_iter()
    .map(|(id, name, kind, city, state)| Contact {
        id: id.to_string(),
        name: name.to_string(),
        kind: kind.to_string(),
        city: city.to_string(),
        state: state.to_string(),
    })
    .collect()
}

fn filter_contacts(params: &Params) -> Vec<Contact> {
    let search = param(params, "search").unwrap_or("").to_lowercase();
    let types: Vec<&str> = param(params, "types").unwrap_or("Dwolla").split(',').collect();
    let limit = param(params, "limit").and_then(|l| l.parse().ok()).unwrap_or(10);
    contact_book()
        .into_iter()
        .filter(|c| c.name.to_lowercase().contains(&search))
        .filter(|c| types.contains(&c.kind.as_str()))
        .take(limit)
        .collect()
}

async fn token(State(db): State<Db>, Query(params): Query<Params>) -> Json<Value> {
    if !app_credentials_match(param(&params, "client_id"), param(&params, "client_secret")) {
        return Json(json!({
            "error": "invalid_client",
            "error_description": "Invalid client credentials."
        }));
    }
    if param(&params, "grant_type") != Some("authorization_code") {
        return Json(json!({
            "error": "unsupported_grant_type",
            "error_description": "Only authorization_code is supported."
        }));
    }
    if param(&params, "code") != Some(AUTH_CODE) {
        return Json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid authorization code."
        }));
    }
    let access_token = Uuid::new_v4().to_string();
    db.write().await.tokens.insert(access_token.clone());
    Json(json!({"access_token": access_token}))
}

async fn me(State(db): State<Db>, Query(params): Query<Params>) -> Json<Value> {
    if let Err(rejected) = authorized(&db, &params).await {
        return rejected;
    }
    success(json!({
        "Id": ACCOUNT_ID,
        "Name": "Mock Account",
        "City": "Des Moines",
        "State": "IA",
        "Latitude": 41.58,
        "Longitude": -93.62,
        "Type": "Personal"
    }))
}

async fn user(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
) -> Json<Value> {
    if let Err(rejected) = authorized(&db, &params).await {
        return rejected;
    }
    if !app_credentials_match(param(&params, "client_id"), param(&params, "client_secret")) {
        return failure("Invalid application credentials.", Value::Null);
    }
    success(json!({"Id": id, "Name": "Dwolla Member", "Latitude": 0, "Longitude": 0}))
}

async fn register(Json(body): Json<Value>) -> Json<Value> {
    let field = |name: &str| body.get(name).and_then(Value::as_str).unwrap_or("");
    if !app_credentials_match(Some(field("client_id")), Some(field("client_secret"))) {
        return failure("Invalid application credentials.", Value::Null);
    }

    let mut errors = serde_json::Map::new();
    if !field("email").contains('@') {
        errors.insert("email".to_string(), json!("invalid"));
    }
    if field("pin").len() != 4 {
        errors.insert("pin".to_string(), json!("must be 4 digits"));
    }
    if body.get("acceptTerms") != Some(&Value::Bool(true)) {
        errors.insert("acceptTerms".to_string(), json!("required"));
    }
    if !errors.is_empty() {
        return failure("Validation failed", Value::Object(errors));
    }

    success(json!({
        "Id": "812-999-0001",
        "Name": format!("{} {}", field("firstName"), field("lastName")),
        "Type": body.get("type").cloned().unwrap_or(json!("Personal"))
    }))
}

async fn contacts(State(db): State<Db>, Query(params): Query<Params>) -> Json<Value> {
    if let Err(rejected) = authorized(&db, &params).await {
        return rejected;
    }
    success(json!(filter_contacts(&params)))
}

async fn balance(State(db): State<Db>, Query(params): Query<Params>) -> Json<Value> {
    if let Err(rejected) = authorized(&db, &params).await {
        return rejected;
    }
    success(json!(db.read().await.balance))
}

async fn send(
    State(db): State<Db>,
    Query(params): Query<Params>,
    Json(body): Json<SendMoney>,
) -> Json<Value> {
    if let Err(rejected) = authorized(&db, &params).await {
        return rejected;
    }
    if body.pin != PIN {
        return failure("Invalid account PIN", Value::Null);
    }
    if param(&params, "test") == Some("true") {
        return success(json!(0));
    }

    let mut ledger = db.write().await;
    if body.amount > ledger.balance {
        return failure("Insufficient funds.", Value::Null);
    }
    let id = ledger.next_id();
    ledger.balance -= body.amount;
    ledger.transactions.push(Transaction {
        id,
        amount: body.amount,
        source_id: ACCOUNT_ID.to_string(),
        destination_id: body.destination_id,
        destination_type: body.destination_type,
        kind: "money_sent".to_string(),
        notes: body.notes,
        status: "processed".to_string(),
    });
    success(json!(id))
}

async fn request_money(
    State(db): State<Db>,
    Query(params): Query<Params>,
    Json(body): Json<RequestMoney>,
) -> Json<Value> {
    if let Err(rejected) = authorized(&db, &params).await {
        return rejected;
    }
    if body.pin != PIN {
        return failure("Invalid account PIN", Value::Null);
    }
    if body.source_id == ACCOUNT_ID || body.amount <= 0.0 {
        return failure("Invalid money request.", Value::Null);
    }
    let mut ledger = db.write().await;
    let id = ledger.next_id();
    ledger.pending_requests.push(id);
    success(json!(id))
}

async fn transaction(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
) -> Json<Value> {
    if let Err(rejected) = authorized(&db, &params).await {
        return rejected;
    }
    let ledger = db.read().await;
    let found = id
        .parse::<u64>()
        .ok()
        .and_then(|id| ledger.transactions.iter().find(|t| t.id == id));
    match found {
        Some(transaction) => success(json!(transaction)),
        None => failure("Transaction not found for account.", Value::Null),
    }
}

async fn listings(State(db): State<Db>, Query(params): Query<Params>) -> Json<Value> {
    if let Err(rejected) = authorized(&db, &params).await {
        return rejected;
    }
    let types: Vec<&str> = param(&params, "types").map(|t| t.split('|').collect()).unwrap_or_default();
    let limit = param(&params, "limit").and_then(|l| l.parse().ok()).unwrap_or(10);
    let skip = param(&params, "skip").and_then(|s| s.parse().ok()).unwrap_or(0);

    let ledger = db.read().await;
    let page: Vec<&Transaction> = ledger
        .transactions
        .iter()
        .rev()
        .filter(|t| types.is_empty() || types.contains(&t.kind.as_str()))
        .skip(skip)
        .take(limit)
        .collect();
    success(json!(page))
}

async fn stats(State(db): State<Db>, Query(params): Query<Params>) -> Json<Value> {
    if let Err(rejected) = authorized(&db, &params).await {
        return rejected;
    }
    let ledger = db.read().await;
    let sent: Vec<&Transaction> = ledger
        .transactions
        .iter()
        .filter(|t| t.kind == "money_sent")
        .collect();

    let mut stats = serde_json::Map::new();
    for stat in param(&params, "types").unwrap_or("").split(',') {
        match stat {
            "TransactionsCount" => {
                stats.insert(stat.to_string(), json!(sent.len()));
            }
            "TransactionsTotal" => {
                let total: f64 = sent.iter().map(|t| t.amount).sum();
                stats.insert(stat.to_string(), json!(total));
            }
            _ => {}
        }
    }
    success(Value::Object(stats))
}

/// `302 Found` pointing at the same path and query without the
/// `/relocated` prefix.
async fn relocated(
    Path(rest): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> impl IntoResponse {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    let mut location = format!("http://{host}/{rest}");
    if let Some(query) = query {
        location.push('?');
        location.push_str(&query);
    }
    (StatusCode::FOUND, [(header::LOCATION, location)])
}
