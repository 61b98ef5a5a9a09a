use crate::table::StructuredTable;
use chrono::{DateTime, Local};
use serde::Serialize;

/// Outcome of one analysis invocation. Immutable once created; records are
/// only ever appended to a [`SessionStore`] and bulk-cleared, never edited.
///
/// `structured_table` is present only when `structured_block` parsed as
/// tabular data; a block without a table is a valid state that must still
/// be shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRecord {
    pub timestamp: DateTime<Local>,
    /// Source filename, with a ` [<focus>]` suffix when the analysis was
    /// scoped to one report.
    pub filename: String,
    pub analysis_text: String,
    pub structured_block: Option<String>,
    pub structured_table: Option<StructuredTable>,
}

/// Append-only history of analyses for one interactive session.
///
/// Caller-owned and explicitly passed where needed; initialized empty on
/// session start and discarded with it. Nothing persists across sessions.
#[derive(Debug, Default)]
pub struct SessionStore {
    records: Vec<AnalysisRecord>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: AnalysisRecord) {
        self.records.push(record);
    }

    /// All records, oldest first.
    pub fn all(&self) -> &[AnalysisRecord] {
        &self.records
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
