//! Data models: extraction results, vocabulary and configuration.

pub mod config;
pub mod record;
pub mod vocabulary;

pub use config::{ExportConfig, HashbonConfig, SheetLayout, TableConfig};
pub use record::{CellValue, ExtractionResult, Phase, Totals};
pub use vocabulary::Vocabulary;
