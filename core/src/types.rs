//! Request parameter types for the Dwolla REST endpoints.
//!
//! # Design
//! Each endpoint gets a value type with named fields and documented
//! defaults. Body parameters serialize straight to the provider's JSON key
//! names; query filters flatten into `(key, value)` pairs. Response payloads
//! are not modelled here: their shape is endpoint-specific and the client
//! hands them back as `serde_json::Value`.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::error::ApiError;

/// Query string parameters in send order.
pub type QueryParams = Vec<(&'static str, String)>;

/// Wire format for dates: `mm-dd-yyyy`.
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%m-%d-%Y").to_string()
}

fn serialize_date<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
    match date {
        Some(date) => serializer.serialize_str(&format_date(date)),
        None => serializer.serialize_none(),
    }
}

fn require(value: &str, message: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidArgument(message.to_string()));
    }
    Ok(())
}

// Non-finite values would serialize as `null`.
fn require_amount(amount: f64) -> Result<(), ApiError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ApiError::InvalidArgument(
            "Please enter a transaction amount.".to_string(),
        ));
    }
    Ok(())
}

fn require_facilitator_amount(amount: f64) -> Result<(), ApiError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ApiError::InvalidArgument(
            "Please enter a valid facilitator amount.".to_string(),
        ));
    }
    Ok(())
}

/// Network an account identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AccountType {
    #[default]
    Dwolla,
    Email,
    Phone,
    Twitter,
    Facebook,
    LinkedIn,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Dwolla => "Dwolla",
            AccountType::Email => "Email",
            AccountType::Phone => "Phone",
            AccountType::Twitter => "Twitter",
            AccountType::Facebook => "Facebook",
            AccountType::LinkedIn => "LinkedIn",
        }
    }
}

/// Kind of account created by `register`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RegistrationType {
    Personal,
    Commercial,
    NonProfit,
}

/// Transaction categories accepted by the history filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    MoneySent,
    MoneyReceived,
    Deposit,
    Withdrawal,
    Fee,
}

impl TransactionType {
    pub const ALL: [TransactionType; 5] = [
        TransactionType::MoneySent,
        TransactionType::MoneyReceived,
        TransactionType::Deposit,
        TransactionType::Withdrawal,
        TransactionType::Fee,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::MoneySent => "money_sent",
            TransactionType::MoneyReceived => "money_received",
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
            TransactionType::Fee => "fee",
        }
    }
}

/// Aggregates the stats endpoint can compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatType {
    TransactionsCount,
    TransactionsTotal,
}

impl StatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatType::TransactionsCount => "TransactionsCount",
            StatType::TransactionsTotal => "TransactionsTotal",
        }
    }
}

fn join<T>(items: &[T], as_str: fn(&T) -> &'static str, separator: &str) -> String {
    items.iter().map(as_str).collect::<Vec<_>>().join(separator)
}

// ---------------------------------------------------------------------------
// Money movement
// ---------------------------------------------------------------------------

/// Body of `transactions/send`.
///
/// Defaults: `destination_type` Dwolla, `notes` empty, `facilitator_amount`
/// 0, `assume_costs` true.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendParams {
    pub pin: String,
    pub destination_id: String,
    pub destination_type: AccountType,
    pub amount: f64,
    pub facilitator_amount: f64,
    pub assume_costs: bool,
    pub notes: String,
}

impl SendParams {
    pub fn new(pin: impl Into<String>, destination_id: impl Into<String>, amount: f64) -> Self {
        Self {
            pin: pin.into(),
            destination_id: destination_id.into(),
            destination_type: AccountType::Dwolla,
            amount,
            facilitator_amount: 0.0,
            assume_costs: true,
            notes: String::new(),
        }
    }

    pub fn with_destination_type(mut self, destination_type: AccountType) -> Self {
        self.destination_type = destination_type;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_facilitator_amount(mut self, amount: f64) -> Self {
        self.facilitator_amount = amount;
        self
    }

    pub fn with_assume_costs(mut self, assume_costs: bool) -> Self {
        self.assume_costs = assume_costs;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        require(&self.pin, "Please enter a PIN.")?;
        require(&self.destination_id, "Please enter a destination ID.")?;
        require_amount(self.amount)?;
        require_facilitator_amount(self.facilitator_amount)
    }
}

/// Body of `transactions/request`.
///
/// Defaults: `source_type` Dwolla, `facilitator_amount` 0, `notes` empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyRequestParams {
    pub pin: String,
    pub source_id: String,
    pub source_type: AccountType,
    pub amount: f64,
    pub facilitator_amount: f64,
    pub notes: String,
}

impl MoneyRequestParams {
    pub fn new(pin: impl Into<String>, source_id: impl Into<String>, amount: f64) -> Self {
        Self {
            pin: pin.into(),
            source_id: source_id.into(),
            source_type: AccountType::Dwolla,
            amount,
            facilitator_amount: 0.0,
            notes: String::new(),
        }
    }

    pub fn with_source_type(mut self, source_type: AccountType) -> Self {
        self.source_type = source_type;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_facilitator_amount(mut self, amount: f64) -> Self {
        self.facilitator_amount = amount;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        require(&self.pin, "Please enter a PIN.")?;
        require(&self.source_id, "Please enter a source ID.")?;
        require_amount(self.amount)?;
        require_facilitator_amount(self.facilitator_amount)
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Body of `register/`, minus the application credentials the client adds.
///
/// Every field except `address2`, `account_type` and `organization` is
/// required. Build it with struct-update syntax:
///
/// ```
/// use chrono::NaiveDate;
/// use dwolla_core::RegisterParams;
///
/// let params = RegisterParams {
///     email: "jane@example.com".to_string(),
///     date_of_birth: NaiveDate::from_ymd_opt(1980, 2, 22),
///     accept_terms: true,
///     ..Default::default()
/// };
/// assert!(params.address2.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterParams {
    pub email: String,
    pub password: String,
    pub pin: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub phone: String,
    #[serde(serialize_with = "serialize_date")]
    pub date_of_birth: Option<NaiveDate>,
    pub accept_terms: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub account_type: Option<RegistrationType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

impl RegisterParams {
    /// Reports the first missing field, in declaration order.
    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        require(&self.email, "Please enter an email address.")?;
        require(&self.password, "Please enter a password.")?;
        require(&self.pin, "Please enter a PIN.")?;
        require(&self.first_name, "Please enter a first name.")?;
        require(&self.last_name, "Please enter a last name.")?;
        require(&self.address, "Please enter an address.")?;
        require(&self.city, "Please enter a city.")?;
        require(&self.state, "Please enter a state.")?;
        require(&self.zip, "Please enter a zip code.")?;
        require(&self.phone, "Please enter a phone number.")?;
        if self.date_of_birth.is_none() {
            return Err(ApiError::InvalidArgument(
                "Please enter a date of birth.".to_string(),
            ));
        }
        if !self.accept_terms {
            return Err(ApiError::InvalidArgument(
                "Please accept the terms of service.".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Query filters
// ---------------------------------------------------------------------------

/// Filters for `contacts` and `nearby_contacts`.
///
/// Defaults: no search term, `types` Dwolla, `limit` 10.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactsQuery {
    pub search: Option<String>,
    pub types: Vec<AccountType>,
    pub limit: u32,
}

impl Default for ContactsQuery {
    fn default() -> Self {
        Self {
            search: None,
            types: vec![AccountType::Dwolla],
            limit: 10,
        }
    }
}

impl ContactsQuery {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_types(mut self, types: impl Into<Vec<AccountType>>) -> Self {
        self.types = types.into();
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub(crate) fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        if let Some(search) = self.search.as_ref().filter(|s| !s.is_empty()) {
            params.push(("search", search.clone()));
        }
        params.push(("types", join(&self.types, AccountType::as_str, ",")));
        params.push(("limit", self.limit.to_string()));
        params
    }
}

/// Filters for the transaction history (`listings`).
///
/// Defaults: no start date, every transaction type, `limit` 10, `skip` 0.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingsQuery {
    pub since_date: Option<NaiveDate>,
    pub types: Vec<TransactionType>,
    pub limit: u32,
    pub skip: u32,
}

impl Default for ListingsQuery {
    fn default() -> Self {
        Self {
            since_date: None,
            types: TransactionType::ALL.to_vec(),
            limit: 10,
            skip: 0,
        }
    }
}

impl ListingsQuery {
    pub fn with_since_date(mut self, date: NaiveDate) -> Self {
        self.since_date = Some(date);
        self
    }

    pub fn with_types(mut self, types: impl Into<Vec<TransactionType>>) -> Self {
        self.types = types.into();
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_skip(mut self, skip: u32) -> Self {
        self.skip = skip;
        self
    }

    pub(crate) fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        if let Some(date) = &self.since_date {
            params.push(("sinceDate", format_date(date)));
        }
        params.push(("types", join(&self.types, TransactionType::as_str, "|")));
        params.push(("limit", self.limit.to_string()));
        params.push(("skip", self.skip.to_string()));
        params
    }
}

/// Filters for `transactions/stats`.
///
/// Defaults: count and total, no date range.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsQuery {
    pub types: Vec<StatType>,
    pub since_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Default for StatsQuery {
    fn default() -> Self {
        Self {
            types: vec![StatType::TransactionsCount, StatType::TransactionsTotal],
            since_date: None,
            end_date: None,
        }
    }
}

impl StatsQuery {
    pub fn with_types(mut self, types: impl Into<Vec<StatType>>) -> Self {
        self.types = types.into();
        self
    }

    pub fn with_range(mut self, since: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.since_date = since;
        self.end_date = end;
        self
    }

    pub(crate) fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params.push(("types", join(&self.types, StatType::as_str, ",")));
        if let Some(date) = &self.since_date {
            params.push(("sinceDate", format_date(date)));
        }
        if let Some(date) = &self.end_date {
            params.push(("endDate", format_date(date)));
        }
        params
    }
}
