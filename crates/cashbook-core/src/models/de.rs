//! Lenient decoders for server-rendered numbers.
//!
//! Decimal fields arrive either as JSON numbers or as strings (`"1250.00"`).

use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

fn parse<E: de::Error>(raw: NumberOrString) -> Result<Option<f64>, E> {
    match raw {
        NumberOrString::Number(n) => Ok(Some(n)),
        NumberOrString::String(s) if s.trim().is_empty() => Ok(None),
        NumberOrString::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| E::custom(format!("invalid decimal: {}", s))),
    }
}

/// Decimal that defaults to zero when null or blank.
pub fn decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrString>::deserialize(deserializer)?;
    match raw {
        Some(raw) => Ok(parse(raw)?.unwrap_or(0.0)),
        None => Ok(0.0),
    }
}

pub fn optional_decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(raw) => parse(raw),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Row {
        #[serde(deserialize_with = "decimal", default)]
        amount: f64,
        #[serde(deserialize_with = "optional_decimal", default)]
        balance: Option<f64>,
    }

    #[test]
    fn test_decimal_forms() {
        let row: Row = serde_json::from_str(r#"{"amount": "1250.50", "balance": 10}"#).unwrap();
        assert_eq!(row.amount, 1250.5);
        assert_eq!(row.balance, Some(10.0));

        let row: Row = serde_json::from_str(r#"{"amount": null, "balance": ""}"#).unwrap();
        assert_eq!(row.amount, 0.0);
        assert_eq!(row.balance, None);

        let row: Row = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(row.amount, 0.0);
        assert_eq!(row.balance, None);

        assert!(serde_json::from_str::<Row>(r#"{"amount": "abc"}"#).is_err());
    }
}
