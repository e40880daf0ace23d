//! Milestone invoice parser: ties the rules, classifier, mapper and aggregator together.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, trace};

use crate::error::Result;
use crate::models::config::HashbonConfig;
use crate::models::record::{ExtractionResult, Phase};
use crate::models::vocabulary::Vocabulary;
use crate::pdf::{PdfContent, Table};

use super::aggregate::compute_totals_with;
use super::classifier::TableClassifier;
use super::mapper::RowMapper;
use super::rules::{CompanyExtractor, FieldExtractor, VatTotalExtractor, UNKNOWN_COMPANY};

/// Trait for invoice parsing.
pub trait InvoiceParser {
    /// Parse extracted PDF content into a result. Never fails; misses yield defaults.
    fn parse(&self, content: &PdfContent) -> ExtractionResult;
}

/// Rule-based parser for Hebrew milestone invoices.
pub struct MilestoneParser {
    vocabulary: Arc<Vocabulary>,
    company: CompanyExtractor,
    vat: VatTotalExtractor,
    classifier: TableClassifier,
}

impl MilestoneParser {
    /// Create a parser over a shared vocabulary, compiling its VAT patterns.
    pub fn new(vocabulary: Arc<Vocabulary>) -> Result<Self> {
        let vat = VatTotalExtractor::from_patterns(&vocabulary.vat_patterns)?;
        Ok(Self {
            company: CompanyExtractor::new(Arc::clone(&vocabulary)),
            classifier: TableClassifier::new(Arc::clone(&vocabulary)),
            vat,
            vocabulary,
        })
    }

    /// Create a parser from the pipeline configuration.
    pub fn from_config(config: &HashbonConfig) -> Result<Self> {
        Self::new(Arc::new(config.vocabulary.clone()))
    }

    /// The vocabulary this parser was built with.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Headers and phases of a milestone table.
    pub fn map_table(&self, table: &Table) -> (Vec<String>, Vec<Phase>) {
        let mapper = RowMapper::new(
            &self.vocabulary.reversed_fragments,
            &self.vocabulary.summary_markers,
        );

        let headers = table
            .header()
            .map(|row| mapper.build_headers(row))
            .unwrap_or_default();

        let phases = table
            .data_rows()
            .iter()
            .enumerate()
            .filter_map(|(i, row)| {
                let phase = mapper.build_phase(row, &headers);
                if phase.is_none() {
                    trace!("Skipped row {} (empty or summary)", i + 1);
                }
                phase
            })
            .collect();

        (headers, phases)
    }
}

impl Default for MilestoneParser {
    fn default() -> Self {
        let vocabulary = Arc::new(Vocabulary::default());
        Self {
            company: CompanyExtractor::new(Arc::clone(&vocabulary)),
            classifier: TableClassifier::new(Arc::clone(&vocabulary)),
            vat: VatTotalExtractor::new(),
            vocabulary,
        }
    }
}

impl InvoiceParser for MilestoneParser {
    fn parse(&self, content: &PdfContent) -> ExtractionResult {
        let start = Instant::now();

        let company = match self.company.extract(&content.text) {
            Some(found) => {
                trace!("Company identifier {:?}", found.source);
                found.value
            }
            None => UNKNOWN_COMPANY.to_string(),
        };
        let vat_total = self.vat.total(&content.text);
        debug!("Company: {}, VAT total: {}", company, vat_total);

        let mut result = ExtractionResult {
            company,
            vat_total,
            ..Default::default()
        };

        let Some(table) = self.classifier.find_milestone_table(content.tables()) else {
            info!(
                "No milestone table among {} tables on {} pages",
                content.tables().count(),
                content.pages.len()
            );
            return result;
        };

        let (headers, phases) = self.map_table(table);

        if !phases.is_empty() {
            let totals = compute_totals_with(&headers, &phases, &self.vocabulary.columns);
            result.contract_total = totals.contract_total;
            result.billed_total = totals.billed_total;
        }

        result.headers = headers;
        result.phases = phases;

        info!(
            "Extracted {} phases in {}ms (contract {}, billed {})",
            result.phases.len(),
            start.elapsed().as_millis(),
            result.contract_total,
            result.billed_total
        );

        result
    }
}
