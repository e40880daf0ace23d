//! Lookup tables for the milestone invoice template.
//!
//! The defaults describe one recurring document layout: its phase names, its
//! two known issuing companies, and the fragments that betray mirrored Hebrew.
//! A [`Vocabulary`] is built once and shared read-only (see
//! [`crate::invoice::MilestoneParser`]).

use serde::{Deserialize, Serialize};

/// Mirrored forms of common domain words: with, stage, contract, amount,
/// cumulative, account, execution.
pub const REVERSED_FRAGMENTS: [&str; 7] = ["םע", "בלש", "הזוח", "םוכס", "רבטצמ", "ןובשח", "עוציב"];

/// "Stage" in logical and mirrored order.
pub const STAGE_MARKERS: [&str; 2] = ["שלב", "בלש"];

/// Row markers of total / cumulative / grand-total rows.
pub const SUMMARY_MARKERS: [&str; 5] = ["סכום כולל", "ללוכ םוכס", "סכום מצטבר", "רבטצמ םוכס", "סה\"כ"];

/// Regexes for the VAT-inclusive payable total, tried in order.
pub const VAT_PATTERNS: [&str; 3] = [
    r"לתשלום\s*([\d,]+\.?\d*)\s*₪",
    r"₪\s*([\d,]+\.?\d*)\s*לתשלום",
    r"סה.כ.*?לתשלום.*?([\d,]+\.?\d*)",
];

/// Header of the company column appended to every exported row.
pub const COMPANY_COLUMN: &str = "שם/חברה נבחרת";

/// Stage label column of the tracking sheet.
pub const STAGE_COLUMN: &str = "שלב תכנון";

/// Contract scope column of the tracking sheet.
pub const CONTRACT_SCOPE_COLUMN: &str = "היקף חוזה";

/// Canonical header row of the tracking sheet.
pub const OUTPUT_COLUMNS: [&str; 13] = [
    STAGE_COLUMN,
    COMPANY_COLUMN,
    "דירוג שירות 1-10",
    "דירוג מחיר טוב 1-10",
    CONTRACT_SCOPE_COLUMN,
    "עד זכיה",
    "בחירת יזם",
    "51% חתימות",
    "67% חתימות",
    "לאחר שנה מ67%",
    "לאחר שנתיים",
    "היתר",
    "סה\"כ",
];

/// The payment-trigger columns of [`OUTPUT_COLUMNS`].
pub const MILESTONE_COLUMNS: [&str; 8] = [
    "עד זכיה",
    "בחירת יזם",
    "51% חתימות",
    "67% חתימות",
    "לאחר שנה מ67%",
    "לאחר שנתיים",
    "היתר",
    "סה\"כ",
];

/// Phase-label substring to milestone column.
pub const STAGE_TO_COLUMN: [(&str, &str); 10] = [
    ("חתימה על החוזה", "עד זכיה"),
    ("מצגת דיירים", "עד זכיה"),
    ("תוכניות דירות תמורה", "בחירת יזם"),
    ("התכנון הראשוני", "בחירת יזם"),
    ("הגשת ההיתר", "51% חתימות"),
    ("החלטת וועדה", "67% חתימות"),
    ("חשבון אגרות", "לאחר שנה מ67%"),
    ("למכרז", "לאחר שנתיים"),
    ("לביצוע", "היתר"),
    ("טופס 4", "סה\"כ"),
];

/// A known issuing company and the spellings that identify it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRule {
    /// Canonical company name.
    pub name: String,
    /// Identifier substrings, checked in order.
    pub identifiers: Vec<String>,
}

/// One entry of the stage column map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageColumn {
    /// Substring of the phase label.
    pub pattern: String,
    /// Milestone column the phase pays into.
    pub column: String,
}

/// Header tokens used to locate the amount and billed columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnTokens {
    /// Token marking the contract amount column.
    pub amount: String,
    /// Tokens that disqualify an amount column (invoice/account, cumulative).
    pub amount_exclusions: Vec<String>,
    /// Tokens marking the billed-this-invoice column.
    pub billed: Vec<String>,
}

impl Default for ColumnTokens {
    fn default() -> Self {
        Self {
            amount: "סכום".to_string(),
            amount_exclusions: strings(&["חשבון", "מצטבר"]),
            billed: strings(&["חשבון זה", "בחשבון"]),
        }
    }
}

/// All lookup tables used by the rules engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Fragments whose presence marks a string as mirrored.
    pub reversed_fragments: Vec<String>,

    /// Header tokens identifying the milestone table.
    pub stage_markers: Vec<String>,

    /// Row tokens identifying summary rows.
    pub summary_markers: Vec<String>,

    /// Known companies, checked in order.
    pub companies: Vec<CompanyRule>,

    /// VAT total regexes, tried in order.
    pub vat_patterns: Vec<String>,

    /// Column header tokens for the aggregator.
    pub columns: ColumnTokens,

    /// Phase label to milestone column map, checked in order.
    pub stage_columns: Vec<StageColumn>,

    /// Canonical output header.
    pub output_columns: Vec<String>,

    /// Name of the appended company column.
    pub company_column: String,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            reversed_fragments: strings(&REVERSED_FRAGMENTS),
            stage_markers: strings(&STAGE_MARKERS),
            summary_markers: strings(&SUMMARY_MARKERS),
            companies: vec![
                CompanyRule {
                    name: "קיי.או.טי אדריכלים".to_string(),
                    identifiers: strings(&["קיי.או.טי", "קי.או.טי", "KOT", "יט.וא.ייק", "יט.וא.יק"]),
                },
                CompanyRule {
                    name: "ירון אליאב".to_string(),
                    identifiers: strings(&["ירון אליאב", "באילא ןורי"]),
                },
            ],
            vat_patterns: strings(&VAT_PATTERNS),
            columns: ColumnTokens::default(),
            stage_columns: STAGE_TO_COLUMN
                .iter()
                .map(|(pattern, column)| StageColumn {
                    pattern: pattern.to_string(),
                    column: column.to_string(),
                })
                .collect(),
            output_columns: strings(&OUTPUT_COLUMNS),
            company_column: COMPANY_COLUMN.to_string(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reversed_fragments_mirror_domain_words() {
        let words = ["עם", "שלב", "חוזה", "סכום", "מצטבר", "חשבון", "ביצוע"];
        for (fragment, word) in REVERSED_FRAGMENTS.iter().zip(words) {
            let mirrored: String = word.chars().rev().collect();
            assert_eq!(*fragment, mirrored);
        }
    }

    #[test]
    fn test_stage_map_targets_milestone_columns() {
        for (_, column) in STAGE_TO_COLUMN {
            assert!(MILESTONE_COLUMNS.contains(&column), "{} is not a milestone column", column);
        }
        for column in MILESTONE_COLUMNS {
            assert!(OUTPUT_COLUMNS.contains(&column));
        }
    }

    #[test]
    fn test_vocabulary_partial_json_keeps_defaults() {
        let vocab: Vocabulary = serde_json::from_str(r#"{"stage_markers": ["phase"]}"#).unwrap();
        assert_eq!(vocab.stage_markers, vec!["phase".to_string()]);
        assert_eq!(vocab.summary_markers.len(), 5);
        assert_eq!(vocab.companies.len(), 2);
    }
}
