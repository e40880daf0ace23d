//! Core library for Hebrew milestone invoice processing.
//!
//! This crate provides:
//! - PDF processing (positioned text, page text and table discovery)
//! - Repair of mirrored Hebrew text from right-to-left extraction
//! - Milestone table selection and phase extraction
//! - Contract, billed and VAT-inclusive totals
//! - Tracking sheet export to CSV

pub mod error;
pub mod export;
pub mod invoice;
pub mod models;
pub mod pdf;

pub use error::{HashbonError, PdfError, Result};
pub use export::{build_sheet, to_canonical_rows, to_tracking_rows, tracking_file_name, write_csv, TrackingSheet};
pub use invoice::{InvoiceParser, MilestoneParser};
pub use models::{CellValue, ExtractionResult, HashbonConfig, Phase, SheetLayout, Totals, Vocabulary};
pub use pdf::{PdfContent, PdfExtractor, PdfProcessor, Table};

/// Load a PDF and extract its milestone data.
///
/// The document is released before returning, whether extraction succeeds
/// or fails.
pub fn process_pdf(data: &[u8], config: &HashbonConfig) -> Result<(PdfContent, ExtractionResult)> {
    let parser = MilestoneParser::from_config(config)?;

    let content = {
        let mut extractor = PdfExtractor::new().with_table_config(config.tables.clone());
        extractor.load(data)?;
        extractor.extract_all()?
    };

    let result = parser.parse(&content);
    Ok((content, result))
}
