//! Raw sales rows as they arrive from client exports.

use nexus_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Columns every sales export must carry.
pub const REQUIRED_COLUMNS: [&str; 3] = ["date", "state", "gross_sales"];

/// A loosely typed cell: exports mix numbers and text freely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    Number(f64),
    Text(String),
}

impl RawField {
    /// Numeric value, accepting numeric text. `None` if not a finite number.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            RawField::Number(n) => *n,
            RawField::Text(s) => s.trim().replace(',', "").parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    /// Text form of the cell.
    pub fn as_text(&self) -> String {
        match self {
            RawField::Number(n) => n.to_string(),
            RawField::Text(s) => s.clone(),
        }
    }
}

impl From<f64> for RawField {
    fn from(value: f64) -> Self {
        RawField::Number(value)
    }
}

impl From<&str> for RawField {
    fn from(value: &str) -> Self {
        RawField::Text(value.to_string())
    }
}

impl From<String> for RawField {
    fn from(value: String) -> Self {
        RawField::Text(value)
    }
}

/// One uncleaned sales row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSalesRow {
    #[serde(default)]
    pub date: Option<RawField>,
    #[serde(default)]
    pub state: Option<RawField>,
    #[serde(default)]
    pub gross_sales: Option<RawField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_count: Option<RawField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketplace_sales: Option<RawField>,
}

/// Parse a JSON array of row objects.
///
/// Fails when a required column is absent from every row.
pub fn parse_rows(text: &str) -> Result<Vec<RawSalesRow>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(text)?;

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !values.iter().any(|v| v.get(col).is_some()))
        .collect();
    if !values.is_empty() && !missing.is_empty() {
        return Err(Error::data(format!(
            "Missing required columns: {}",
            missing.join(", ")
        )));
    }

    values
        .into_iter()
        .map(|v| serde_json::from_value(v).map_err(Error::from))
        .collect()
}

/// Read rows from a JSON file.
pub fn load_rows(path: impl AsRef<Path>) -> Result<Vec<RawSalesRow>> {
    let text = std::fs::read_to_string(path)?;
    parse_rows(&text)
}

/// Write rows to a JSON file.
pub fn write_rows(path: impl AsRef<Path>, rows: &[RawSalesRow]) -> Result<()> {
    let text = serde_json::to_string_pretty(rows)?;
    std::fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_cells() {
        let rows = parse_rows(
            r#"[
                {"date": "2023-01-01", "state": "ca", "gross_sales": 1000},
                {"date": "2023-01-02", "state": "CA", "gross_sales": "2,000", "transaction_count": null}
            ]"#,
        )
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].gross_sales, Some(RawField::Number(1000.0)));
        assert_eq!(rows[1].gross_sales.as_ref().and_then(RawField::as_number), Some(2000.0));
        assert_eq!(rows[1].transaction_count, None);
    }

    #[test]
    fn test_missing_required_column() {
        let err = parse_rows(r#"[{"date": "2023-01-01", "state": "CA"}]"#).unwrap_err();
        assert!(err.to_string().contains("gross_sales"));
    }

    #[test]
    fn test_non_numeric_text() {
        assert_eq!(RawField::from("not_a_number").as_number(), None);
        assert_eq!(RawField::from(" 12.5 ").as_number(), Some(12.5));
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        let rows = vec![RawSalesRow {
            date: Some("2023-03-04".into()),
            state: Some("TX".into()),
            gross_sales: Some(12.5.into()),
            transaction_count: None,
            marketplace_sales: Some(3.0.into()),
        }];

        write_rows(&path, &rows).unwrap();
        assert_eq!(load_rows(&path).unwrap(), rows);
    }
}
