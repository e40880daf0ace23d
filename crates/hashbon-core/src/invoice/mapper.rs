//! Header construction and row-to-phase mapping for the milestone table.

use indexmap::IndexMap;

use crate::models::record::{CellValue, Phase};

use super::rules::hebrew::{collapse_whitespace, normalize_with};
use super::rules::numbers::{is_zero_literal, parse_amount};

/// Placeholder key for an unnamed or out-of-range column.
pub fn column_key(index: usize) -> String {
    format!("col_{}", index)
}

/// Maps raw table rows to typed phases.
pub struct RowMapper<'v> {
    reversed_fragments: &'v [String],
    summary_markers: &'v [String],
}

impl<'v> RowMapper<'v> {
    pub fn new(reversed_fragments: &'v [String], summary_markers: &'v [String]) -> Self {
        Self {
            reversed_fragments,
            summary_markers,
        }
    }

    /// Normalized header names; missing or empty cells become `col_<index>`.
    pub fn build_headers(&self, header_row: &[Option<String>]) -> Vec<String> {
        header_row
            .iter()
            .enumerate()
            .map(|(i, cell)| match cell.as_deref() {
                Some(text) if !text.is_empty() => normalize_with(text, self.reversed_fragments),
                _ => column_key(i),
            })
            .collect()
    }

    /// Type one cell: a number when it parses non-zero or is a literal zero,
    /// otherwise its normalized text.
    pub fn classify_cell(&self, raw: Option<&str>) -> CellValue {
        let collapsed = raw.map(collapse_whitespace).unwrap_or_default();
        let number = parse_amount(&collapsed);

        if number != 0.0 || is_zero_literal(&collapsed) {
            CellValue::Number(number)
        } else {
            CellValue::Text(normalize_with(&collapsed, self.reversed_fragments))
        }
    }

    /// Whether the row is a summary line ("total", "cumulative").
    pub fn is_summary_row(&self, row: &[Option<String>]) -> bool {
        let joined = row
            .iter()
            .filter_map(|cell| cell.as_deref())
            .filter(|cell| !cell.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        self.summary_markers
            .iter()
            .any(|marker| joined.contains(marker.as_str()))
    }

    /// Map a data row to a phase, or `None` for empty and summary rows.
    pub fn build_phase(&self, row: &[Option<String>], headers: &[String]) -> Option<Phase> {
        if row.is_empty() || self.is_summary_row(row) {
            return None;
        }
        if row.iter().all(|cell| cell.as_deref().is_none_or(str::is_empty)) {
            return None;
        }

        let mut fields = IndexMap::with_capacity(row.len());
        for (i, cell) in row.iter().enumerate() {
            let key = headers.get(i).cloned().unwrap_or_else(|| column_key(i));
            fields.insert(key, self.classify_cell(cell.as_deref()));
        }

        let stage = headers
            .last()
            .and_then(|last| fields.get(last))
            .cloned()
            .unwrap_or_default();

        Some(Phase { fields, stage })
    }
}
