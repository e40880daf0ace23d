//! Tracking sheet construction and CSV export.

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::invoice::aggregate::contract_column;
use crate::invoice::rules::StageMapper;
use crate::models::config::{ExportConfig, SheetLayout};
use crate::models::record::{CellValue, ExtractionResult};
use crate::models::vocabulary::{Vocabulary, CONTRACT_SCOPE_COLUMN, STAGE_COLUMN};

/// UTF-8 byte-order mark, so spreadsheet tools detect Hebrew text correctly.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A header row plus one value row per phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackingSheet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl TrackingSheet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Source table headers plus the company column, values taken verbatim.
pub fn to_tracking_rows(result: &ExtractionResult, company_column: &str) -> TrackingSheet {
    let mut columns = result.headers.clone();
    columns.push(company_column.to_string());

    let rows = result
        .phases
        .iter()
        .map(|phase| {
            let mut row: Vec<CellValue> = result
                .headers
                .iter()
                .map(|h| phase.get(h).cloned().unwrap_or_default())
                .collect();
            row.push(CellValue::Text(result.company.clone()));
            row
        })
        .collect();

    TrackingSheet { columns, rows }
}

/// The fixed tracking header with each phase's amount in its milestone column.
pub fn to_canonical_rows(result: &ExtractionResult, vocabulary: &Vocabulary) -> TrackingSheet {
    let columns = vocabulary.output_columns.clone();
    let position = |name: &str| columns.iter().position(|c| c == name);

    let stage_at = position(STAGE_COLUMN);
    let company_at = position(&vocabulary.company_column);
    let scope_at = position(CONTRACT_SCOPE_COLUMN);
    let amount_column = contract_column(&result.headers, &vocabulary.columns);
    let stages = StageMapper::new(std::sync::Arc::new(vocabulary.clone()));

    let rows = result
        .phases
        .iter()
        .map(|phase| {
            let mut row = vec![CellValue::empty(); columns.len()];
            let stage = phase.stage_text();

            if let Some(i) = stage_at {
                row[i] = phase.stage.clone();
            }
            if let Some(i) = company_at {
                row[i] = CellValue::Text(result.company.clone());
            }
            if let Some(i) = scope_at {
                row[i] = CellValue::Number(result.contract_total);
            }

            let milestone = stages.column_for(&stage).and_then(|c| position(c));
            let amount = amount_column.and_then(|c| phase.get(c));
            match (milestone, amount) {
                (Some(i), Some(value)) => row[i] = value.clone(),
                (None, _) => debug!("No milestone column for stage {:?}", stage),
                _ => {}
            }

            row
        })
        .collect();

    TrackingSheet { columns, rows }
}

/// Build the sheet in the requested layout.
pub fn build_sheet(
    result: &ExtractionResult,
    vocabulary: &Vocabulary,
    layout: SheetLayout,
) -> TrackingSheet {
    match layout {
        SheetLayout::Source => to_tracking_rows(result, &vocabulary.company_column),
        SheetLayout::Canonical => to_canonical_rows(result, vocabulary),
    }
}

/// Write the sheet as CSV, optionally prefixed with a UTF-8 BOM.
pub fn write_csv<W: Write>(sheet: &TrackingSheet, mut writer: W, write_bom: bool) -> Result<()> {
    if write_bom {
        writer.write_all(UTF8_BOM)?;
    }

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&sheet.columns)?;
    for row in &sheet.rows {
        wtr.write_record(row.iter().map(CellValue::display))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the sheet to a file using the export configuration.
pub fn save_csv(sheet: &TrackingSheet, path: &Path, config: &ExportConfig) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(sheet, std::io::BufWriter::new(file), config.write_bom)?;
    debug!("Wrote {} rows to {}", sheet.len(), path.display());
    Ok(())
}

/// Output file name: the input base name without `.pdf`, plus the suffix.
pub fn tracking_file_name(input: &Path, suffix: &str) -> String {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}{}", name.replace(".pdf", ""), suffix)
}
