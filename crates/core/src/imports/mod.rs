//! Imports module - CSV lead intake: mapping, preview, staged import and history.

mod column_mapper;
mod csv_parser;
mod import_wizard;
mod imports_errors;
mod imports_model;
mod imports_service;
mod imports_traits;
mod progress;




pub use column_mapper::{
    apply_mapping, auto_map, auto_map_header, MappingAlternatives, MappingConflict,
    MappingProposal, MappingRule, MAPPING_RULES,
};
pub use csv_parser::{parse_csv, ParseConfig, ParseError, ParseErrorKind, ParsedCsvResult};
pub use import_wizard::{reduce, ImportAction, ImportStep, ImportWizardState, SelectedFile};
pub use imports_errors::ImportError;
pub use imports_model::{
    sort_newest_first, BatchRowError, ColumnMapping, CsvPreview, HistorySummary, ImportBatch,
    ImportBatchStatus, ImportCommitResult, MappingPreview, UploadFile,
};
pub use imports_service::{ImportConfig, ImportService};
pub use imports_traits::{ImportServiceTrait, LeadImportApiTrait};
pub use progress::{ImportOutcome, ImportProgress, ImportProgressReporter, NoOpProgressReporter};
