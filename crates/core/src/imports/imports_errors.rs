use thiserror::Error;

use super::imports_model::ImportBatchStatus;
use crate::constants::PREVIEW_FAILED_MESSAGE;

/// Errors raised by the CSV import flow.
#[derive(Error, Debug)]
pub enum ImportError {
    /// The preview endpoint rejected the file; the detail is kept for logs only.
    #[error("{}", PREVIEW_FAILED_MESSAGE)]
    PreviewFailed { detail: String },

    #[error("{message}")]
    CommitFailed { message: String },

    #[error(
        "Batch {batch_id} reports {accounted} accounted rows for {total} total rows while {status}"
    )]
    CountMismatch {
        batch_id: String,
        total: u64,
        accounted: u64,
        status: ImportBatchStatus,
    },

    #[error("Import batch not found: {0}")]
    BatchNotFound(String),

    #[error("Import batch {batch_id} failed: {message}")]
    BatchFailed { batch_id: String, message: String },

    #[error("An import is already running")]
    AlreadyRunning,

    #[error("Timed out after {waited_ms} ms waiting for batch {batch_id}")]
    ProgressTimeout { batch_id: String, waited_ms: u64 },
}
