//! Mapping of phase labels to milestone columns.

use std::sync::Arc;

use crate::models::vocabulary::{StageColumn, Vocabulary};

use super::hebrew::reverse_chars;

/// Resolves a phase label to one of the milestone output columns.
pub struct StageMapper {
    vocabulary: Arc<Vocabulary>,
}

impl StageMapper {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self { vocabulary }
    }

    /// Milestone column for a stage label.
    ///
    /// Every label is tried as a substring first; only when none match are
    /// the mirrored labels tried, so a logical match always wins.
    pub fn column_for(&self, stage: &str) -> Option<&str> {
        if stage.is_empty() {
            return None;
        }

        let entries: &[StageColumn] = &self.vocabulary.stage_columns;

        entries
            .iter()
            .find(|entry| stage.contains(entry.pattern.as_str()))
            .or_else(|| {
                entries
                    .iter()
                    .find(|entry| stage.contains(reverse_chars(&entry.pattern).as_str()))
            })
            .map(|entry| entry.column.as_str())
    }
}

impl Default for StageMapper {
    fn default() -> Self {
        Self::new(Arc::new(Vocabulary::default()))
    }
}

/// Milestone column for a stage label using the built-in map.
pub fn milestone_column(stage: &str) -> Option<String> {
    StageMapper::default().column_for(stage).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_milestone_column_logical_labels() {
        assert_eq!(milestone_column("חתימה על החוזה").as_deref(), Some("עד זכיה"));
        assert_eq!(milestone_column("1. הגשת ההיתר לוועדה").as_deref(), Some("51% חתימות"));
        assert_eq!(milestone_column("קבלת טופס 4").as_deref(), Some("סה\"כ"));
        assert_eq!(milestone_column("תכנון למכרז").as_deref(), Some("לאחר שנתיים"));
    }

    #[test]
    fn test_milestone_column_mirrored_label() {
        let mirrored = reverse_chars("החלטת וועדה מקומית");
        assert_eq!(milestone_column(&mirrored).as_deref(), Some("67% חתימות"));
    }

    #[test]
    fn test_milestone_column_first_entry_wins() {
        // Both "חשבון אגרות" and "לביצוע" appear; map order decides.
        assert_eq!(
            milestone_column("חשבון אגרות לביצוע").as_deref(),
            Some("לאחר שנה מ67%")
        );
    }

    #[test]
    fn test_milestone_column_unknown() {
        assert_eq!(milestone_column(""), None);
        assert_eq!(milestone_column("פיקוח עליון"), None);
    }
}
