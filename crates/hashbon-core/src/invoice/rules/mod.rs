//! Rule-based field extractors for Hebrew milestone invoices.

pub mod company;
pub mod hebrew;
pub mod numbers;
pub mod patterns;
pub mod stages;
pub mod vat;

pub use company::{extract_company, CompanyExtractor, UNKNOWN_COMPANY};
pub use hebrew::{collapse_whitespace, normalize, normalize_with, reverse_chars};
pub use numbers::{is_zero_literal, parse_amount, parse_number};
pub use stages::{milestone_column, StageMapper};
pub use vat::{extract_vat_total, VatTotalExtractor};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;
}

/// A value found in the document text.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            source: source.into(),
        }
    }
}
