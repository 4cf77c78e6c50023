//! Progress reporting for CSV imports.
//!
//! Progress is derived from the batch record the backend keeps
//! (`processedRows / totalRows`), never from a client-side timer. Front ends
//! implement [`ImportProgressReporter`] to render it.

use serde::{Deserialize, Serialize};

use super::imports_model::{ImportBatch, ImportBatchStatus};

/// Snapshot of a batch's progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportProgress {
    pub batch_id: String,
    pub filename: String,
    pub status: ImportBatchStatus,
    pub processed_rows: u64,
    pub total_rows: u64,
    pub percent: u8,
    pub success_count: u64,
    pub error_count: u64,
    pub duplicate_count: u64,
}

impl From<&ImportBatch> for ImportProgress {
    fn from(batch: &ImportBatch) -> Self {
        Self {
            batch_id: batch.id.clone(),
            filename: batch.filename.clone(),
            status: batch.status,
            processed_rows: batch.processed_rows,
            total_rows: batch.total_rows,
            percent: batch.progress_percent(),
            success_count: batch.success_count,
            error_count: batch.error_count,
            duplicate_count: batch.duplicate_count,
        }
    }
}

/// Final outcome of an import, delivered once per started import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub success: bool,
    pub message: String,
    /// The authoritative batch record, when one was found
    pub batch: Option<ImportBatch>,
}

impl ImportOutcome {
    pub fn completed(batch: ImportBatch) -> Self {
        Self {
            success: true,
            message: format!(
                "Imported {} of {} rows ({} errors, {} duplicates)",
                batch.success_count, batch.total_rows, batch.error_count, batch.duplicate_count
            ),
            batch: Some(batch),
        }
    }

    pub fn failed(message: impl Into<String>, batch: Option<ImportBatch>) -> Self {
        Self {
            success: false,
            message: message.into(),
            batch,
        }
    }
}

/// Trait for reporting import progress.
///
/// Implementations can print to a terminal, emit events, push to a socket, etc.
pub trait ImportProgressReporter: Send + Sync {
    /// Report that the file is being submitted.
    fn report_import_start(&self, file_name: &str);

    /// Report a progress snapshot of the tracked batch.
    fn report_progress(&self, progress: &ImportProgress);

    /// Report that the import finished (successfully or not).
    fn report_import_complete(&self, outcome: &ImportOutcome);
}

/// A no-op progress reporter for contexts where progress is not rendered.
#[derive(Debug, Clone, Default)]
pub struct NoOpProgressReporter;

impl ImportProgressReporter for NoOpProgressReporter {
    fn report_import_start(&self, _file_name: &str) {}

    fn report_progress(&self, _progress: &ImportProgress) {}

    fn report_import_complete(&self, _outcome: &ImportOutcome) {}
}
