use serde::{Deserialize, Serialize};

use super::de;

/// Per-cashbook report with a running-balance ledger.
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    #[serde(default)]
    pub cashbook_name: String,
    #[serde(deserialize_with = "de::decimal", default)]
    pub total_in: f64,
    #[serde(deserialize_with = "de::decimal", default)]
    pub total_out: f64,
    #[serde(deserialize_with = "de::decimal", default)]
    pub net_balance: f64,
    #[serde(default)]
    pub transactions: Vec<ReportLine>,
}

#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportLine {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub remark: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub party: Option<String>,
    #[serde(default)]
    pub payment_mode: Option<String>,
    #[serde(deserialize_with = "de::decimal", default)]
    pub amount_in: f64,
    #[serde(deserialize_with = "de::decimal", default)]
    pub amount_out: f64,
    #[serde(deserialize_with = "de::decimal", default)]
    pub running_balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Excel,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Excel => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Last path segment of the export endpoint.
    pub(crate) fn endpoint(&self) -> &'static str {
        match self {
            ExportFormat::Excel => "export_excel",
            ExportFormat::Pdf => "export_pdf",
        }
    }

    /// Default download name. The cashbook name comes from the server, so
    /// anything other than ASCII alphanumerics, `-` and `_` becomes `_`.
    pub fn report_filename(&self, cashbook_name: &str) -> String {
        let stem: String = cashbook_name
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let stem = if stem.is_empty() { "cashbook" } else { stem.as_str() };
        format!("{}_report.{}", stem, self.extension())
    }
}
