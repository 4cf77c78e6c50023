//! Import domain models.

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;

use super::column_mapper::MappingProposal;
use super::csv_parser::ParsedCsvResult;
use super::imports_errors::ImportError;
use crate::errors::{Error, ValidationError};
use crate::leads::LeadField;
use crate::Result;

/// Processing status of an import batch, as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportBatchStatus {
    /// Accepted, not started
    #[default]
    Pending,
    /// Rows are being processed
    Processing,
    /// Every row has an outcome
    Completed,
    /// Processing aborted
    Failed,
}

impl ImportBatchStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ImportBatchStatus::Completed | ImportBatchStatus::Failed)
    }
}

impl fmt::Display for ImportBatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ImportBatchStatus::Pending => "PENDING",
            ImportBatchStatus::Processing => "PROCESSING",
            ImportBatchStatus::Completed => "COMPLETED",
            ImportBatchStatus::Failed => "FAILED",
        };
        f.pad(s)
    }
}

/// A row-level failure reported for a batch.
///
/// The backend sends either a bare message or `{ row, message }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawBatchRowError")]
pub struct BatchRowError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<u64>,
    pub message: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBatchRowError {
    Message(String),
    Detailed {
        #[serde(default)]
        row: Option<u64>,
        #[serde(default, alias = "error")]
        message: String,
    },
}

impl From<RawBatchRowError> for BatchRowError {
    fn from(raw: RawBatchRowError) -> Self {
        match raw {
            RawBatchRowError::Message(message) => BatchRowError { row: None, message },
            RawBatchRowError::Detailed { row, message } => BatchRowError { row, message },
        }
    }
}

impl fmt::Display for BatchRowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row {
            Some(row) => write!(f, "row {}: {}", row, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// One CSV upload's processing record and outcome tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBatch {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub total_rows: u64,
    #[serde(default)]
    pub processed_rows: u64,
    #[serde(default)]
    pub success_count: u64,
    #[serde(default)]
    pub error_count: u64,
    #[serde(default)]
    pub duplicate_count: u64,
    #[serde(default)]
    pub status: ImportBatchStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub errors: Vec<BatchRowError>,
}

impl ImportBatch {
    /// Rows with a recorded outcome (success, error or duplicate).
    pub fn accounted_rows(&self) -> u64 {
        self.success_count
            .saturating_add(self.error_count)
            .saturating_add(self.duplicate_count)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Percentage of processed rows, clamped to 0..=100.
    pub fn progress_percent(&self) -> u8 {
        if self.status == ImportBatchStatus::Completed {
            return 100;
        }
        if self.total_rows == 0 {
            return 0;
        }
        let percent = self.processed_rows.saturating_mul(100) / self.total_rows;
        percent.min(100) as u8
    }

    /// Checks the outcome counts against the row total.
    ///
    /// The accounted rows may never exceed the total, and must equal it once
    /// the batch is COMPLETED.
    pub fn check_counts(&self) -> std::result::Result<(), ImportError> {
        let accounted = self.accounted_rows();
        let violated = accounted > self.total_rows
            || (self.status == ImportBatchStatus::Completed && accounted != self.total_rows);
        if violated {
            return Err(ImportError::CountMismatch {
                batch_id: self.id.clone(),
                total: self.total_rows,
                accounted,
                status: self.status,
            });
        }
        Ok(())
    }

    /// Human-readable failure reason for a FAILED batch.
    pub fn failure_message(&self) -> String {
        self.errors
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Import failed".to_string())
    }
}

/// Sorts batches newest first (by creation time, then id for stability).
pub fn sort_newest_first(batches: &mut [ImportBatch]) {
    batches.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// Aggregate outcome counts over the import history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub batches: usize,
    pub failed_batches: usize,
    pub in_progress_batches: usize,
    pub total_rows: u64,
    pub success_count: u64,
    pub error_count: u64,
    pub duplicate_count: u64,
}

impl HistorySummary {
    pub fn from_batches(batches: &[ImportBatch]) -> Self {
        batches.iter().fold(Self::default(), |mut acc, batch| {
            acc.batches += 1;
            match batch.status {
                ImportBatchStatus::Failed => acc.failed_batches += 1,
                ImportBatchStatus::Pending | ImportBatchStatus::Processing => {
                    acc.in_progress_batches += 1
                }
                ImportBatchStatus::Completed => {}
            }
            acc.total_rows = acc.total_rows.saturating_add(batch.total_rows);
            acc.success_count = acc.success_count.saturating_add(batch.success_count);
            acc.error_count = acc.error_count.saturating_add(batch.error_count);
            acc.duplicate_count = acc.duplicate_count.saturating_add(batch.duplicate_count);
            acc
        })
    }
}

/// Parsed header and sample rows held while the user reviews the mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvPreview {
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
    #[serde(default)]
    pub total_rows: u64,
}

impl CsvPreview {
    /// Builds a preview from a locally parsed file, keeping at most `sample_rows` rows.
    pub fn from_parsed(parsed: &ParsedCsvResult, sample_rows: usize) -> Self {
        Self {
            headers: parsed.headers.clone(),
            rows: parsed.rows.iter().take(sample_rows).cloned().collect(),
            total_rows: parsed.row_count as u64,
        }
    }
}

/// A preview together with the proposed column mapping for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingPreview {
    pub preview: CsvPreview,
    pub proposal: MappingProposal,
}

/// Ordered mapping from CSV column name to lead field.
///
/// Serialized as a JSON object whose keys keep header order, which is the
/// `columnMapping` form field the import endpoint expects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    entries: Vec<(String, LeadField)>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps a column, replacing any previous field for that column in place.
    pub fn insert(&mut self, column: impl Into<String>, field: LeadField) {
        let column = column.into();
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = field,
            None => self.entries.push((column, field)),
        }
    }

    pub fn remove(&mut self, column: &str) -> Option<LeadField> {
        let index = self.entries.iter().position(|(c, _)| c == column)?;
        Some(self.entries.remove(index).1)
    }

    pub fn get(&self, column: &str) -> Option<LeadField> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, f)| *f)
    }

    /// Columns currently mapped to `field`, in header order.
    pub fn columns_for(&self, field: LeadField) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, f)| *f == field)
            .map(|(c, _)| c.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, LeadField)> {
        self.entries.iter().map(|(c, f)| (c.as_str(), *f))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drops mapped columns that are not among `headers`.
    pub fn retain_headers(&mut self, headers: &[String]) {
        self.entries.retain(|(c, _)| headers.iter().any(|h| h == c));
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl FromIterator<(String, LeadField)> for ColumnMapping {
    fn from_iter<I: IntoIterator<Item = (String, LeadField)>>(iter: I) -> Self {
        let mut mapping = ColumnMapping::new();
        for (column, field) in iter {
            mapping.insert(column, field);
        }
        mapping
    }
}

impl Serialize for ColumnMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (column, field) in &self.entries {
            map.serialize_entry(column, field)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ColumnMapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct MappingVisitor;

        impl<'de> Visitor<'de> for MappingVisitor {
            type Value = ColumnMapping;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of column name to lead field")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut mapping = ColumnMapping::new();
                while let Some((column, field)) = access.next_entry::<String, LeadField>()? {
                    mapping.insert(column, field);
                }
                Ok(mapping)
            }
        }

        deserializer.deserialize_map(MappingVisitor)
    }
}

/// A CSV file staged for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl UploadFile {
    /// Wraps in-memory content, validating it the same way as a file on disk.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>, max_bytes: u64) -> Result<Self> {
        let file = Self {
            file_name: file_name.into(),
            bytes,
        };
        file.validate(max_bytes)?;
        Ok(file)
    }

    /// Reads and validates a CSV file from disk.
    pub fn from_path(path: &Path, max_bytes: u64) -> Result<Self> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::Validation(ValidationError::InvalidInput(format!(
                    "'{}' is not a file path",
                    path.display()
                )))
            })?;

        if !has_csv_extension(&file_name) {
            return Err(ValidationError::UnsupportedFileType(file_name).into());
        }

        let size = std::fs::metadata(path)?.len();
        if size > max_bytes {
            return Err(ValidationError::FileTooLarge {
                name: file_name,
                size,
                limit: max_bytes,
            }
            .into());
        }

        let bytes = std::fs::read(path)?;
        Self::from_bytes(file_name, bytes, max_bytes)
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn validate(&self, max_bytes: u64) -> Result<()> {
        if self.file_name.trim().is_empty() {
            return Err(ValidationError::MissingField("file".to_string()).into());
        }
        if !has_csv_extension(&self.file_name) {
            return Err(ValidationError::UnsupportedFileType(self.file_name.clone()).into());
        }
        if self.bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ValidationError::EmptyFile(self.file_name.clone()).into());
        }
        if self.size() > max_bytes {
            return Err(ValidationError::FileTooLarge {
                name: self.file_name.clone(),
                size: self.size(),
                limit: max_bytes,
            }
            .into());
        }
        Ok(())
    }
}

fn has_csv_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// Response of the commit endpoint.
///
/// Only part of the shape is stable, so every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportCommitResult {
    #[serde(alias = "importBatchId")]
    pub batch_id: Option<String>,
    pub batch: Option<ImportBatch>,
    pub success: Option<bool>,
    pub message: Option<String>,
}

impl ImportCommitResult {
    /// The created batch id, from either the embedded batch or the id field.
    pub fn resolved_batch_id(&self) -> Option<&str> {
        self.batch
            .as_ref()
            .map(|b| b.id.as_str())
            .or(self.batch_id.as_deref())
    }
}
