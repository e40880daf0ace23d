//! Contract and billed totals over the extracted phases.

use crate::models::record::{Phase, Totals};
use crate::models::vocabulary::ColumnTokens;

/// Column holding the contract amount per phase.
pub fn contract_column<'h>(headers: &'h [String], tokens: &ColumnTokens) -> Option<&'h str> {
    headers
        .iter()
        .find(|h| {
            h.contains(tokens.amount.as_str())
                && !tokens
                    .amount_exclusions
                    .iter()
                    .any(|excluded| h.contains(excluded.as_str()))
        })
        .map(String::as_str)
}

/// Column holding the amount billed on this invoice; defaults to the first header.
pub fn billed_column<'h>(headers: &'h [String], tokens: &ColumnTokens) -> Option<&'h str> {
    headers
        .iter()
        .find(|h| tokens.billed.iter().any(|token| h.contains(token.as_str())))
        .or_else(|| headers.first())
        .map(String::as_str)
}

/// Compute totals with explicit column tokens.
pub fn compute_totals_with(headers: &[String], phases: &[Phase], tokens: &ColumnTokens) -> Totals {
    let mut totals = Totals::default();

    if let Some(column) = contract_column(headers, tokens) {
        for phase in phases {
            if let Some(amount) = phase.get(column).and_then(|v| v.as_number()) {
                if amount != 0.0 {
                    totals.contract_total = amount;
                }
            }
        }
    }

    if let Some(column) = billed_column(headers, tokens) {
        totals.billed_total = phases
            .iter()
            .filter_map(|phase| phase.get(column).and_then(|v| v.as_number()))
            .sum();
    }

    totals
}

/// Compute totals with the default column tokens.
pub fn compute_totals(headers: &[String], phases: &[Phase]) -> Totals {
    compute_totals_with(headers, phases, &ColumnTokens::default())
}
