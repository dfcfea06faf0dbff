//! Reference entities used to tag transactions.

use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub cashbook: Option<i64>,
}

#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub cashbook: Option<i64>,
}

#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMode {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub cashbook: Option<i64>,
}

#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl Member {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or("Unknown")
    }
}

/// Body for creating any of the name-keyed lookup entities.
#[derive(Debug, Clone, Serialize)]
pub struct NewLookup {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cashbook: Option<i64>,
}

impl NewLookup {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cashbook: None,
        }
    }

    pub fn in_cashbook(mut self, cashbook: i64) -> Self {
        self.cashbook = Some(cashbook);
        self
    }
}
