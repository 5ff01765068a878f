//! Import report models for CSV import.

use serde::{Deserialize, Serialize};

/// What happened to one imported row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImportAction {
    Created,
    /// A record with the same key was already present and was kept
    SkippedDuplicate,
}

/// Outcome of importing one CSV file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    pub created: usize,
    pub skipped: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ImportReport {
    pub fn record(&mut self, action: ImportAction) {
        match action {
            ImportAction::Created => self.created += 1,
            ImportAction::SkippedDuplicate => self.skipped += 1,
        }
    }
}
