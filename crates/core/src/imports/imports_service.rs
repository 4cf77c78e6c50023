use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::column_mapper::auto_map;
use super::csv_parser::{parse_csv, ParseConfig};
use super::imports_errors::ImportError;
use super::imports_model::{
    sort_newest_first, ColumnMapping, CsvPreview, ImportBatch, ImportBatchStatus,
    MappingPreview, UploadFile,
};
use super::imports_traits::{ImportServiceTrait, LeadImportApiTrait};
use super::progress::{ImportOutcome, ImportProgress, ImportProgressReporter};
use crate::constants::{
    DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_POLL_INTERVAL_MS, DEFAULT_PREVIEW_SAMPLE_ROWS,
    IMPORT_FAILED_MESSAGE,
};
use crate::errors::Error;
use crate::utils::cancellation::{cancellable, cancellable_sleep};
use crate::Result;

/// How far before submission a batch may be stamped and still be ours,
/// to absorb clock skew between client and backend.
const LOCATE_CLOCK_SKEW_SECS: i64 = 60;

/// Configuration for import operations.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Delay between two progress polls.
    pub poll_interval: Duration,
    /// Give up following a batch after this long (no limit when `None`).
    pub timeout: Option<Duration>,
    /// Rows kept in a local preview.
    pub preview_sample_rows: usize,
    /// Largest file accepted for upload.
    pub max_upload_bytes: u64,
    /// Consecutive polls a tracked batch may be absent from the history.
    pub max_missing_polls: u32,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            timeout: None,
            preview_sample_rows: DEFAULT_PREVIEW_SAMPLE_ROWS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_missing_polls: 3,
        }
    }
}

/// Service driving the CSV import flow for one tenant.
pub struct ImportService {
    api: Arc<dyn LeadImportApiTrait>,
    owner_uid: String,
    config: ImportConfig,
    running: AtomicBool,
}

/// Clears the running flag when an import ends, however it ends.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ImportService {
    pub fn new(
        api: Arc<dyn LeadImportApiTrait>,
        owner_uid: impl Into<String>,
        config: ImportConfig,
    ) -> Self {
        Self {
            api,
            owner_uid: owner_uid.into(),
            config,
            running: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// True while an import started by this service is in flight.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn begin_import(&self) -> Result<RunningGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::from(ImportError::AlreadyRunning))?;
        Ok(RunningGuard(&self.running))
    }

    async fn run_import(
        &self,
        file: &UploadFile,
        mapping: &ColumnMapping,
        reporter: &dyn ImportProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<ImportBatch> {
        if mapping.is_empty() {
            warn!(
                "No columns mapped for '{}'; leads will be created without fields",
                file.file_name
            );
        }

        let known_ids = self.known_batch_ids(cancel).await?;
        let submitted_at = Utc::now();
        let commit = cancellable(
            cancel,
            self.api.import_csv(&self.owner_uid, file, mapping),
        )
        .await
        .map_err(commit_error)?;

        if commit.success == Some(false) {
            let message = commit
                .message
                .unwrap_or_else(|| IMPORT_FAILED_MESSAGE.to_string());
            return Err(ImportError::CommitFailed { message }.into());
        }

        if let Some(batch) = commit.batch.as_ref().filter(|b| b.is_terminal()) {
            debug!("Batch {} finished during commit", batch.id);
            reporter.report_progress(&ImportProgress::from(batch));
            return settle(batch.clone());
        }

        let batch_id = match commit.resolved_batch_id() {
            Some(id) => id.to_string(),
            None => {
                self.locate_batch(&file.file_name, submitted_at, &known_ids, cancel)
                    .await?
            }
        };
        info!("Import of '{}' created batch {}", file.file_name, batch_id);

        self.follow_batch(&batch_id, reporter, cancel).await
    }

    /// Ids already in the history before a commit, so a locate never picks
    /// up an earlier upload of the same file. A failed listing only weakens
    /// that filter.
    async fn known_batch_ids(&self, cancel: &CancellationToken) -> Result<HashSet<String>> {
        match cancellable(cancel, self.api.list_import_batches(&self.owner_uid)).await {
            Ok(batches) => Ok(batches.into_iter().map(|b| b.id).collect()),
            Err(err) if err.is_cancelled() => Err(err),
            Err(err) => {
                warn!("Could not list batches before commit: {}", err);
                Ok(HashSet::new())
            }
        }
    }

    /// Finds the batch created for `file_name` when the commit response did
    /// not carry its id. The history may lag the commit, so the lookup is
    /// retried up to `max_missing_polls` times.
    async fn locate_batch(
        &self,
        file_name: &str,
        submitted_at: DateTime<Utc>,
        known_ids: &HashSet<String>,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let earliest = submitted_at - ChronoDuration::seconds(LOCATE_CLOCK_SKEW_SECS);
        let attempts = self.config.max_missing_polls.max(1);

        for attempt in 1..=attempts {
            let mut batches =
                cancellable(cancel, self.api.list_import_batches(&self.owner_uid)).await?;
            sort_newest_first(&mut batches);

            let found = batches.into_iter().find(|b| {
                b.filename == file_name && b.created_at >= earliest && !known_ids.contains(&b.id)
            });
            if let Some(batch) = found {
                return Ok(batch.id);
            }

            debug!(
                "No new batch for '{}' yet (attempt {}/{})",
                file_name, attempt, attempts
            );
            if attempt < attempts {
                cancellable_sleep(cancel, self.config.poll_interval).await?;
            }
        }

        Err(ImportError::BatchNotFound(file_name.to_string()).into())
    }

    /// Polls the history until the batch reaches a terminal status.
    async fn follow_batch(
        &self,
        batch_id: &str,
        reporter: &dyn ImportProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<ImportBatch> {
        let started = Instant::now();
        let mut missing_polls = 0u32;
        let mut last_reported: Option<ImportProgress> = None;

        loop {
            let batches =
                cancellable(cancel, self.api.list_import_batches(&self.owner_uid)).await?;

            match batches.into_iter().find(|b| b.id == batch_id) {
                Some(batch) => {
                    missing_polls = 0;
                    if let Err(err) = batch.check_counts() {
                        warn!("Inconsistent counts reported for batch {}: {}", batch_id, err);
                        return Err(err.into());
                    }

                    let progress = ImportProgress::from(&batch);
                    if last_reported.as_ref() != Some(&progress) {
                        debug!(
                            "Batch {}: {}/{} rows ({}%)",
                            batch_id, progress.processed_rows, progress.total_rows, progress.percent
                        );
                        reporter.report_progress(&progress);
                        last_reported = Some(progress);
                    }

                    if batch.is_terminal() {
                        return settle(batch);
                    }
                }
                None => {
                    missing_polls += 1;
                    debug!(
                        "Batch {} missing from history ({}/{})",
                        batch_id, missing_polls, self.config.max_missing_polls
                    );
                    if missing_polls >= self.config.max_missing_polls {
                        return Err(ImportError::BatchNotFound(batch_id.to_string()).into());
                    }
                }
            }

            if let Some(timeout) = self.config.timeout {
                if started.elapsed() >= timeout {
                    return Err(ImportError::ProgressTimeout {
                        batch_id: batch_id.to_string(),
                        waited_ms: started.elapsed().as_millis() as u64,
                    }
                    .into());
                }
            }

            cancellable_sleep(cancel, self.config.poll_interval).await?;
        }
    }
}

/// Turns a terminal batch into the call's result.
fn settle(batch: ImportBatch) -> Result<ImportBatch> {
    batch.check_counts()?;
    if batch.status == ImportBatchStatus::Failed {
        return Err(ImportError::BatchFailed {
            message: batch.failure_message(),
            batch_id: batch.id,
        }
        .into());
    }
    Ok(batch)
}

/// Maps a commit failure onto the error shown to the user.
fn commit_error(err: Error) -> Error {
    match err {
        Error::Cancelled | Error::Validation(_) => err,
        Error::Api { message, .. } => ImportError::CommitFailed { message }.into(),
        other => {
            warn!("Import request failed: {}", other);
            ImportError::CommitFailed {
                message: IMPORT_FAILED_MESSAGE.to_string(),
            }
            .into()
        }
    }
}

#[async_trait]
impl ImportServiceTrait for ImportService {
    fn load_file(&self, path: &Path) -> Result<UploadFile> {
        let file = UploadFile::from_path(path, self.config.max_upload_bytes)?;
        debug!("Loaded '{}' ({} bytes)", file.file_name, file.size());
        Ok(file)
    }

    async fn preview(
        &self,
        file: &UploadFile,
        cancel: &CancellationToken,
    ) -> Result<MappingPreview> {
        debug!("Requesting preview of '{}'", file.file_name);
        let preview = cancellable(cancel, self.api.preview_csv(&self.owner_uid, file))
            .await
            .map_err(|err| match err {
                Error::Cancelled | Error::Validation(_) => err,
                other => {
                    warn!("Preview of '{}' failed: {}", file.file_name, other);
                    ImportError::PreviewFailed {
                        detail: other.to_string(),
                    }
                    .into()
                }
            })?;

        let proposal = auto_map(&preview.headers);
        if proposal.is_ambiguous() {
            warn!(
                "'{}' has {} columns competing for the same field",
                file.file_name,
                proposal.conflicts.len()
            );
        }
        Ok(MappingPreview { preview, proposal })
    }

    fn preview_local(&self, file: &UploadFile, config: &ParseConfig) -> Result<MappingPreview> {
        let parsed = parse_csv(&file.bytes, config)?;
        if !parsed.errors.is_empty() {
            warn!(
                "'{}' parsed with {} warnings",
                file.file_name,
                parsed.errors.len()
            );
        }
        let preview = CsvPreview::from_parsed(&parsed, self.config.preview_sample_rows);
        let proposal = auto_map(&preview.headers);
        Ok(MappingPreview { preview, proposal })
    }

    async fn confirm_import(
        &self,
        file: &UploadFile,
        mapping: &ColumnMapping,
        reporter: &dyn ImportProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<ImportBatch> {
        let _guard = self.begin_import()?;
        info!(
            "Importing '{}' with {} mapped columns",
            file.file_name,
            mapping.len()
        );
        reporter.report_import_start(&file.file_name);

        let result = self.run_import(file, mapping, reporter, cancel).await;
        report_outcome(reporter, &result);
        result
    }

    async fn watch_batch(
        &self,
        batch_id: &str,
        reporter: &dyn ImportProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<ImportBatch> {
        let result = self.follow_batch(batch_id, reporter, cancel).await;
        report_outcome(reporter, &result);
        result
    }

    async fn list_batches(&self) -> Result<Vec<ImportBatch>> {
        let mut batches = self.api.list_import_batches(&self.owner_uid).await?;
        sort_newest_first(&mut batches);
        info!("Fetched {} import batches", batches.len());
        Ok(batches)
    }
}

fn report_outcome(reporter: &dyn ImportProgressReporter, result: &Result<ImportBatch>) {
    let outcome = match result {
        Ok(batch) => ImportOutcome::completed(batch.clone()),
        Err(err) => ImportOutcome::failed(err.to_string(), None),
    };
    reporter.report_import_complete(&outcome);
}
