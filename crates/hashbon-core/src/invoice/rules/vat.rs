//! VAT-inclusive payable total extraction.

use regex::Regex;

use crate::error::{HashbonError, Result};

use super::numbers::parse_amount;
use super::patterns::DEFAULT_VAT_PATTERNS;
use super::{ExtractionMatch, FieldExtractor};

/// Extractor for the "total including VAT, payable" amount.
///
/// Patterns are tried in order and the first one that matches decides the
/// value, even when its capture parses to zero.
pub struct VatTotalExtractor {
    patterns: Vec<Regex>,
}

impl VatTotalExtractor {
    /// Create an extractor with the built-in patterns.
    pub fn new() -> Self {
        Self {
            patterns: DEFAULT_VAT_PATTERNS.clone(),
        }
    }

    /// Compile an extractor from configured pattern strings.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|e| {
                    HashbonError::Config(format!("invalid VAT pattern {:?}: {}", p.as_ref(), e))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// First matching pattern's amount, or `0.0`.
    pub fn total(&self, text: &str) -> f64 {
        self.extract(text).map(|m| m.value).unwrap_or(0.0)
    }
}

impl Default for VatTotalExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for VatTotalExtractor {
    type Output = ExtractionMatch<f64>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.patterns.iter().find_map(|pattern| {
            let caps = pattern.captures(text)?;
            let amount = caps.get(1)?;
            let full_match = caps.get(0)?;
            Some(ExtractionMatch::new(
                parse_amount(amount.as_str()),
                full_match.as_str(),
            ))
        })
    }
}

/// VAT-inclusive payable total using the built-in patterns.
pub fn extract_vat_total(text: &str) -> f64 {
    VatTotalExtractor::new().total(text)
}
