//! Issuing company detection from the full document text.

use std::sync::Arc;

use crate::models::vocabulary::{CompanyRule, Vocabulary};

use super::{ExtractionMatch, FieldExtractor};

/// Returned when no known company identifier appears in the text.
pub const UNKNOWN_COMPANY: &str = "Unknown";

/// Company field extractor over the vocabulary's company rules.
pub struct CompanyExtractor {
    vocabulary: Arc<Vocabulary>,
}

impl CompanyExtractor {
    /// Create an extractor sharing the given vocabulary.
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self { vocabulary }
    }

    fn rules(&self) -> &[CompanyRule] {
        &self.vocabulary.companies
    }
}

impl Default for CompanyExtractor {
    fn default() -> Self {
        Self::new(Arc::new(Vocabulary::default()))
    }
}

impl FieldExtractor for CompanyExtractor {
    type Output = ExtractionMatch<String>;

    /// First company, in rule order, with an identifier in the text.
    ///
    /// Identifiers are also tried against the upper-cased text so Latin
    /// spellings such as `kot` still match.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        let upper = text.to_uppercase();

        self.rules().iter().find_map(|rule| {
            rule.identifiers
                .iter()
                .find(|id| text.contains(id.as_str()) || upper.contains(id.as_str()))
                .map(|id| ExtractionMatch::new(rule.name.clone(), id.as_str()))
        })
    }
}

/// Canonical company name, or [`UNKNOWN_COMPANY`].
pub fn extract_company(text: &str) -> String {
    CompanyExtractor::default()
        .extract(text)
        .map(|m| m.value)
        .unwrap_or_else(|| UNKNOWN_COMPANY.to_string())
}
