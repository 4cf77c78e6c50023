use async_trait::async_trait;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use super::csv_parser::ParseConfig;
use super::imports_model::{
    ColumnMapping, CsvPreview, ImportBatch, ImportCommitResult, MappingPreview, UploadFile,
};
use super::progress::ImportProgressReporter;
use crate::Result;

/// Trait for the backend endpoints behind the CSV import flow
#[async_trait]
pub trait LeadImportApiTrait: Send + Sync {
    /// Upload a file for parsing; returns headers, a row sample and the row count
    async fn preview_csv(&self, owner_uid: &str, file: &UploadFile) -> Result<CsvPreview>;

    /// Commit a file with its column mapping; creates one import batch
    async fn import_csv(
        &self,
        owner_uid: &str,
        file: &UploadFile,
        mapping: &ColumnMapping,
    ) -> Result<ImportCommitResult>;

    /// List every import batch of the tenant
    async fn list_import_batches(&self, owner_uid: &str) -> Result<Vec<ImportBatch>>;
}

/// Trait for the import service operations
#[async_trait]
pub trait ImportServiceTrait: Send + Sync {
    /// Read and validate a CSV file before any request is made
    fn load_file(&self, path: &Path) -> Result<UploadFile>;

    /// Preview a file through the backend and propose a column mapping
    async fn preview(&self, file: &UploadFile, cancel: &CancellationToken)
        -> Result<MappingPreview>;

    /// Preview a file locally, without contacting the backend
    fn preview_local(&self, file: &UploadFile, config: &ParseConfig) -> Result<MappingPreview>;

    /// Commit a file and follow its batch until it completes or fails
    async fn confirm_import(
        &self,
        file: &UploadFile,
        mapping: &ColumnMapping,
        reporter: &dyn ImportProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<ImportBatch>;

    /// Follow an existing batch until it completes or fails
    async fn watch_batch(
        &self,
        batch_id: &str,
        reporter: &dyn ImportProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<ImportBatch>;

    /// Import history, newest first
    async fn list_batches(&self) -> Result<Vec<ImportBatch>>;
}
