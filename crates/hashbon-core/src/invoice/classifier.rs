//! Selection of the milestone (phase) table among all extracted tables.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::models::vocabulary::Vocabulary;
use crate::pdf::Table;

/// Header row plus at least one data row.
const MIN_ROWS: usize = 2;

/// Minimum header width of a milestone table.
const MIN_HEADER_CELLS: usize = 4;

/// Recognizes milestone tables by their header row.
pub struct TableClassifier {
    vocabulary: Arc<Vocabulary>,
}

impl TableClassifier {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self { vocabulary }
    }

    /// Whether the table's header names a phase column.
    pub fn is_milestone_table(&self, table: &Table) -> bool {
        if table.num_rows() < MIN_ROWS {
            return false;
        }

        let header = match table.header() {
            Some(header) if header.len() >= MIN_HEADER_CELLS => header,
            _ => return false,
        };

        let joined = header
            .iter()
            .filter_map(|cell| cell.as_deref())
            .filter(|cell| !cell.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        self.vocabulary
            .stage_markers
            .iter()
            .any(|marker| joined.contains(marker.as_str()))
    }

    /// First milestone table in document order.
    pub fn find_milestone_table<'t, I>(&self, tables: I) -> Option<&'t Table>
    where
        I: IntoIterator<Item = &'t Table>,
    {
        for (index, table) in tables.into_iter().enumerate() {
            if self.is_milestone_table(table) {
                debug!(
                    "Milestone table #{} on page {} ({} rows x {} cols)",
                    index,
                    table.page,
                    table.num_rows(),
                    table.num_cols()
                );
                return Some(table);
            }
            trace!("Table #{} on page {} is not a milestone table", index, table.page);
        }
        None
    }
}

impl Default for TableClassifier {
    fn default() -> Self {
        Self::new(Arc::new(Vocabulary::default()))
    }
}

/// Milestone check with the built-in vocabulary.
pub fn is_milestone_table(table: &Table) -> bool {
    TableClassifier::default().is_milestone_table(table)
}

/// First milestone table with the built-in vocabulary.
pub fn find_milestone_table(tables: &[Table]) -> Option<&Table> {
    TableClassifier::default().find_milestone_table(tables)
}
