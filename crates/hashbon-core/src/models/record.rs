//! Extraction result model: phases, cells and summary totals.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single table cell after type inference.
///
/// Numbers serialize as JSON numbers and text as JSON strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Numeric cell (amounts, percentages, ordinals).
    Number(f64),
    /// Normalized text cell.
    Text(String),
}

impl CellValue {
    /// Empty text cell.
    pub fn empty() -> Self {
        CellValue::Text(String::new())
    }

    /// Numeric value, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(_) => None,
        }
    }

    /// Text value, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Number(_) => None,
            CellValue::Text(s) => Some(s),
        }
    }

    /// Whether the value is "falsy": zero or empty text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Number(n) => *n == 0.0,
            CellValue::Text(s) => s.is_empty(),
        }
    }

    /// Render the value the way it is written to CSV.
    pub fn display(&self) -> String {
        match self {
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

/// Format a float keeping a trailing `.0` on integral values (`1000.0`).
/// NaN is written as an empty field.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        String::new()
    } else if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e16 {
        format!("{:.1}", n)
    } else {
        format!("{}", n)
    }
}

/// One row of the milestone table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    /// Cell values keyed by header name, in source column order.
    #[serde(flatten)]
    pub fields: IndexMap<String, CellValue>,

    /// Value of the last header column (the stage label).
    #[serde(rename = "_stage")]
    pub stage: CellValue,
}

impl Phase {
    /// Look up a cell by header name.
    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.fields.get(header)
    }

    /// Stage label as text.
    pub fn stage_text(&self) -> String {
        self.stage.display()
    }
}

/// Contract and billed totals derived from the phases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// Contract amount (last non-zero contract cell).
    pub contract_total: f64,
    /// Sum of the billed column.
    pub billed_total: f64,
}

/// Everything extracted from one PDF.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Canonical company name or `"Unknown"`.
    pub company: String,

    /// Contract amount.
    pub contract_total: f64,

    /// Amount billed on this invoice.
    pub billed_total: f64,

    /// Total including VAT, payable.
    pub vat_total: f64,

    /// Normalized header row of the milestone table.
    pub headers: Vec<String>,

    /// One entry per qualifying table row.
    pub phases: Vec<Phase>,
}

impl ExtractionResult {
    /// Whether no phases were found in the document.
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }
}
