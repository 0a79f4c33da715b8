use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An account or a category: both are a user-owned name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Named {
    pub id: String,
    pub name: String,
}

/// Returned by delete endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deleted {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    /// Milliunits; negative is an expense.
    pub amount: i64,
    pub payee: String,
    pub notes: Option<String>,
    pub account_id: String,
    pub category_id: Option<String>,
}

/// A transaction joined with its account and category names, as listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRow {
    pub id: String,
    pub date: NaiveDate,
    pub amount: i64,
    pub payee: String,
    pub notes: Option<String>,
    pub account: String,
    pub account_id: String,
    pub category: Option<String>,
    pub category_id: Option<String>,
}

/// Create/update payload for a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub account_id: String,
    #[serde(default)]
    pub category_id: Option<String>,
    pub payee: String,
    pub amount: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One CSV file imported into an account.
#[derive(Debug, Clone)]
pub struct ImportRecord {
    pub filename: String,
    pub account_id: String,
    pub record_count: Option<i64>,
    pub date_range_start: Option<String>,
    pub date_range_end: Option<String>,
    pub checksum: Option<String>,
}
