//! Final ordered, ranked dataset for external writers
//!
//! Spreadsheet and PDF generation live outside this crate; they receive these
//! rows as-is.

use serde::Serialize;

use crate::accumulator::Snapshot;

/// One exported row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub rank: usize,
    pub name: String,
    pub school: String,
    /// "grade-section"
    pub class: String,
    pub exam: String,
    pub score: f64,
}

/// Every accumulated record, ranked 1..N in snapshot order
pub fn ranked_rows(snapshot: &Snapshot) -> Vec<ExportRow> {
    snapshot
        .records
        .iter()
        .enumerate()
        .map(|(index, record)| ExportRow {
            rank: index + 1,
            name: record.display_name(),
            school: record.school_name.clone(),
            class: record.class_label(),
            exam: record.exam_code.clone(),
            score: record.score,
        })
        .collect()
}
