/// Default number of sample rows kept in a local CSV preview
pub const DEFAULT_PREVIEW_SAMPLE_ROWS: usize = 5;

/// Default upload limit for CSV files (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Default interval between import progress polls, in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// Generic message surfaced when the preview endpoint fails
pub const PREVIEW_FAILED_MESSAGE: &str = "Failed to preview CSV file";

/// Generic message surfaced when the import endpoint fails
pub const IMPORT_FAILED_MESSAGE: &str = "Failed to import CSV file";

/// Separator used to join preflight issues into a single error message
pub const PREFLIGHT_ISSUE_SEPARATOR: &str = "\n";
