use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::de;

/// A named ledger of cash-in / cash-out transactions.
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cashbook {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub business: Option<i64>,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub summary: Option<Summary>,
}

impl Cashbook {
    pub fn net_balance(&self) -> f64 {
        self.summary.as_ref().map(|s| s.net_balance).unwrap_or(0.0)
    }
}

/// Totals for a cashbook, optionally narrowed by a filter.
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(deserialize_with = "de::decimal", default)]
    pub total_in: f64,
    #[serde(deserialize_with = "de::decimal", default)]
    pub total_out: f64,
    #[serde(deserialize_with = "de::decimal", default)]
    pub net_balance: f64,
}

/// The caller's permissions on one cashbook.
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserRole {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub can_create: bool,
    #[serde(default)]
    pub can_edit: bool,
    #[serde(default)]
    pub can_delete: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCashbook {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business: Option<i64>,
}

#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub id: i64,
    pub name: String,
}
