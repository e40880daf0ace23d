//! Error types for the hashbon-core library.

use thiserror::Error;

/// Main error type for the hashbon library.
#[derive(Error, Debug)]
pub enum HashbonError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// CSV export error.
    #[error("export error: {0}")]
    Export(#[from] csv::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
///
/// These are the only failures that reach the caller: a document that cannot
/// be opened or read yields no partial result.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// A page content stream could not be decoded.
    #[error("failed to decode content of page {page}: {reason}")]
    ContentDecode { page: u32, reason: String },

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Result type for the hashbon library.
pub type Result<T> = std::result::Result<T, HashbonError>;
