//! PDF processing module.

mod extractor;
pub mod table;

pub use extractor::PdfExtractor;
pub use table::{Table, TableFinder, TextLine, TextSpan};

use serde::Serialize;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from a specific page.
    fn extract_page_text(&self, page: u32) -> Result<String>;

    /// Extract the tables found on a specific page.
    fn extract_page_tables(&self, page: u32) -> Result<Vec<Table>>;
}

/// Extracted content from a PDF.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PdfContent {
    /// Text of all pages, each followed by a newline.
    pub text: String,
    /// Pages with their content.
    pub pages: Vec<PdfPage>,
}

impl PdfContent {
    /// Assemble content from pages in document order.
    pub fn from_pages(pages: Vec<PdfPage>) -> Self {
        let text = pages.iter().fold(String::new(), |mut text, page| {
            text.push_str(&page.text);
            text.push('\n');
            text
        });
        Self { text, pages }
    }

    /// Every table in document order: by page, then top to bottom.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.pages.iter().flat_map(|page| page.tables.iter())
    }
}

/// Content from a single PDF page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PdfPage {
    /// Page number (1-indexed).
    pub number: u32,
    /// Extracted text from this page.
    pub text: String,
    /// Tables found on this page.
    pub tables: Vec<Table>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_text_concatenates_pages() {
        let content = PdfContent::from_pages(vec![
            PdfPage {
                number: 1,
                text: "first".to_string(),
                tables: vec![],
            },
            PdfPage {
                number: 2,
                text: String::new(),
                tables: vec![Table::new(2, vec![vec![None]])],
            },
        ]);

        assert_eq!(content.text, "first\n\n");
        assert_eq!(content.tables().count(), 1);
    }
}
