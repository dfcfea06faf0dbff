use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::de;

#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(rename = "IN")]
    CashIn,
    #[serde(rename = "OUT")]
    CashOut,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::CashIn => "IN",
            TransactionType::CashOut => "OUT",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TransactionType::CashIn => "Cash In",
            TransactionType::CashOut => "Cash Out",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    #[serde(default)]
    pub cashbook: Option<i64>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(deserialize_with = "de::decimal", default)]
    pub amount: f64,
    #[serde(default)]
    pub category: Option<i64>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub party: Option<i64>,
    #[serde(default)]
    pub party_name: Option<String>,
    #[serde(default)]
    pub payment_mode: Option<i64>,
    #[serde(default)]
    pub payment_mode_name: Option<String>,
    #[serde(default)]
    pub member_name: Option<String>,
    #[serde(default)]
    pub remark: Option<String>,
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    #[serde(default)]
    pub transaction_date: Option<NaiveDate>,
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    #[serde(default)]
    pub transaction_time: Option<NaiveTime>,
    #[serde(deserialize_with = "de::optional_decimal", default)]
    pub running_balance: Option<f64>,
}

impl Transaction {
    /// Amount with sign applied: positive for cash in, negative for cash out.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionType::CashIn => self.amount,
            TransactionType::CashOut => -self.amount,
        }
    }
}

/// Body for creating or updating a transaction.
#[derive(Debug, Clone, Serialize)]
pub struct NewTransaction {
    pub cashbook: i64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: f64,
    pub category: Option<i64>,
    pub payment_mode: Option<i64>,
    pub party: Option<i64>,
    pub remark: String,
}

impl NewTransaction {
    pub fn new(cashbook: i64, kind: TransactionType, amount: f64) -> Self {
        Self {
            cashbook,
            kind,
            amount,
            category: None,
            payment_mode: None,
            party: None,
            remark: String::new(),
        }
    }

    /// Client-side checks the server would otherwise reject.
    pub fn validate(&self) -> Result<(), String> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err("Amount must be greater than 0".to_string());
        }
        if self.category.is_none() {
            return Err("Category is required".to_string());
        }
        if self.payment_mode.is_none() {
            return Err("Payment mode is required".to_string());
        }
        Ok(())
    }
}

/// Preset date windows understood by the transaction and summary endpoints.
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DateRange {
    #[default]
    AllTime,
    Today,
    #[serde(rename = "LAST_7_DAYS")]
    Last7Days,
    #[serde(rename = "LAST_30_DAYS")]
    Last30Days,
    ThisMonth,
}

impl DateRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateRange::AllTime => "ALL_TIME",
            DateRange::Today => "TODAY",
            DateRange::Last7Days => "LAST_7_DAYS",
            DateRange::Last30Days => "LAST_30_DAYS",
            DateRange::ThisMonth => "THIS_MONTH",
        }
    }
}

/// Query filters for listing transactions and computing summaries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub cashbook: Option<i64>,
    pub page: Option<u32>,
    pub kind: Option<TransactionType>,
    pub category: Option<i64>,
    pub party: Option<i64>,
    pub member: Option<i64>,
    pub payment_mode: Option<i64>,
    pub duration: DateRange,
    pub search: Option<String>,
}

impl TransactionFilter {
    pub fn for_cashbook(cashbook: i64) -> Self {
        Self {
            cashbook: Some(cashbook),
            page: Some(1),
            ..Default::default()
        }
    }

    /// Query pairs with unset and blank values left out.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        let mut push = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                if !value.trim().is_empty() {
                    query.push((key.to_string(), value));
                }
            }
        };

        push("cashbook", self.cashbook.map(|v| v.to_string()));
        push("page", self.page.map(|v| v.to_string()));
        push("type", self.kind.map(|v| v.as_str().to_string()));
        push("category", self.category.map(|v| v.to_string()));
        push("party", self.party.map(|v| v.to_string()));
        push("member", self.member.map(|v| v.to_string()));
        push("payment_mode", self.payment_mode.map(|v| v.to_string()));
        push("duration", Some(self.duration.as_str().to_string()));
        push("search", self.search.clone());
        query
    }

    /// True when only the default date window is applied.
    pub fn is_unfiltered(&self) -> bool {
        self.kind.is_none()
            && self.category.is_none()
            && self.party.is_none()
            && self.member.is_none()
            && self.payment_mode.is_none()
            && self.duration == DateRange::AllTime
            && self.search.as_deref().map_or(true, |s| s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(query: &[(String, String)]) -> Vec<&str> {
        query.iter().map(|(k, _)| k.as_str()).collect()
    }

    #[test]
    fn test_filter_omits_empty_values() {
        let filter = TransactionFilter {
            search: Some("   ".into()),
            ..TransactionFilter::for_cashbook(4)
        };
        let query = filter.to_query();
        assert_eq!(keys(&query), vec!["cashbook", "page", "duration"]);
        assert_eq!(query[2].1, "ALL_TIME");
    }

    #[test]
    fn test_filter_full_query() {
        let filter = TransactionFilter {
            cashbook: Some(1),
            page: Some(3),
            kind: Some(TransactionType::CashOut),
            category: Some(9),
            party: Some(2),
            member: Some(5),
            payment_mode: Some(6),
            duration: DateRange::Last7Days,
            search: Some("rent".into()),
        };
        let query = filter.to_query();
        assert!(query.contains(&("type".to_string(), "OUT".to_string())));
        assert!(query.contains(&("duration".to_string(), "LAST_7_DAYS".to_string())));
        assert!(query.contains(&("search".to_string(), "rent".to_string())));
        assert_eq!(query.len(), 9);
        assert!(!filter.is_unfiltered());
        assert!(TransactionFilter::for_cashbook(1).is_unfiltered());
    }

    #[test]
    fn test_date_range_wire_names() {
        for range in [
            DateRange::AllTime,
            DateRange::Today,
            DateRange::Last7Days,
            DateRange::Last30Days,
            DateRange::ThisMonth,
        ] {
            let json = serde_json::to_string(&range).unwrap();
            assert_eq!(json, format!("\"{}\"", range.as_str()));
        }
        let parsed: DateRange = serde_json::from_str("\"THIS_MONTH\"").unwrap();
        assert_eq!(parsed, DateRange::ThisMonth);
    }

    #[test]
    fn test_validate_new_transaction() {
        let mut tx = NewTransaction::new(1, TransactionType::CashIn, 0.0);
        assert_eq!(tx.validate().unwrap_err(), "Amount must be greater than 0");
        tx.amount = -5.0;
        assert!(tx.validate().is_err());
        tx.amount = 100.0;
        assert_eq!(tx.validate().unwrap_err(), "Category is required");
        tx.category = Some(2);
        assert_eq!(tx.validate().unwrap_err(), "Payment mode is required");
        tx.payment_mode = Some(3);
        assert!(tx.validate().is_ok());

        let body = serde_json::to_value(&tx).unwrap();
        assert_eq!(body["type"], "IN");
        assert_eq!(body["party"], serde_json::Value::Null);
        assert_eq!(body["remark"], "");
    }

    #[test]
    fn test_parse_transaction() {
        let json = r#"{
            "id": 11,
            "type": "OUT",
            "amount": "42.50",
            "category_name": "Fuel",
            "payment_mode_name": "Cash",
            "transaction_date": "2024-06-02",
            "transaction_time": "14:05:00",
            "running_balance": "957.50"
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.kind, TransactionType::CashOut);
        assert_eq!(tx.signed_amount(), -42.5);
        assert_eq!(tx.running_balance, Some(957.5));
        assert_eq!(
            tx.transaction_date,
            NaiveDate::from_ymd_opt(2024, 6, 2)
        );
    }
}
