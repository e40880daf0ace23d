//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

use super::vocabulary::Vocabulary;

/// Main configuration for the hashbon pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HashbonConfig {
    /// Template vocabulary (markers, companies, stage map).
    pub vocabulary: Vocabulary,

    /// Table detection configuration.
    pub tables: TableConfig,

    /// CSV export configuration.
    pub export: ExportConfig,
}

/// Table detection tolerances, in PDF points unless noted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Maximum vertical distance for two spans to share a line.
    pub y_tolerance: f32,

    /// Minimum horizontal gap that separates two cells.
    pub column_gap: f32,

    /// Minimum horizontal gap that separates two words in a cell.
    pub word_gap: f32,

    /// Minimum number of cells for a line to count as a table row.
    pub min_columns: usize,

    /// Maximum line step, as a multiple of the font size, inside one table.
    pub max_row_gap_factor: f32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            y_tolerance: 3.0,
            column_gap: 12.0,
            word_gap: 3.0,
            min_columns: 2,
            max_row_gap_factor: 3.0,
        }
    }
}

/// Column layout of the exported CSV.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetLayout {
    /// Source table headers plus the company column.
    #[default]
    Source,
    /// The fixed 13-column tracking header.
    Canonical,
}

/// CSV export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Suffix appended to the input base name.
    pub file_suffix: String,

    /// Prefix the file with a UTF-8 byte-order mark.
    pub write_bom: bool,

    /// Default column layout.
    pub layout: SheetLayout,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_suffix: "_tracking.csv".to_string(),
            write_bom: true,
            layout: SheetLayout::Source,
        }
    }
}

impl HashbonConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
