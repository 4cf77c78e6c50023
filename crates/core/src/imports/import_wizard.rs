//! Import wizard view-model.
//!
//! The whole upload → mapping → confirm → importing → done flow lives in one
//! serializable [`ImportWizardState`], changed only by [`reduce`]. Every
//! asynchronous result carries the generation it was requested under;
//! results from an older generation (a cancelled or superseded request) are
//! dropped.

use log::debug;
use serde::{Deserialize, Serialize};

use super::column_mapper::{MappingConflict, MappingProposal};
use super::imports_model::{ColumnMapping, CsvPreview, ImportBatch};
use super::progress::ImportProgress;
use crate::leads::LeadField;

/// Wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImportStep {
    #[default]
    Upload,
    Mapping,
    Confirm,
    Importing,
    Done,
}

/// The file the user picked. The bytes stay with the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedFile {
    pub file_name: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportWizardState {
    pub step: ImportStep,
    pub file: Option<SelectedFile>,
    pub preview: Option<CsvPreview>,
    pub mapping: ColumnMapping,
    pub conflicts: Vec<MappingConflict>,
    pub progress: Option<ImportProgress>,
    /// Authoritative record of the last finished import
    pub result: Option<ImportBatch>,
    pub error: Option<String>,
    /// A preview or import request is in flight
    pub loading: bool,
    /// Bumped whenever in-flight results must be ignored
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ImportAction {
    FileSelected { file: SelectedFile },
    PreviewLoaded {
        generation: u64,
        preview: CsvPreview,
        proposal: MappingProposal,
    },
    PreviewFailed { generation: u64, message: String },
    MapColumn { column: String, field: LeadField },
    UnmapColumn { column: String },
    ProceedToConfirm,
    BackToMapping,
    ImportStarted,
    ProgressUpdated {
        generation: u64,
        progress: ImportProgress,
    },
    ImportCompleted { generation: u64, batch: ImportBatch },
    ImportFailed { generation: u64, message: String },
    Cancel,
    DismissError,
    Reset,
}

impl ImportAction {
    fn name(&self) -> &'static str {
        match self {
            ImportAction::FileSelected { .. } => "FileSelected",
            ImportAction::PreviewLoaded { .. } => "PreviewLoaded",
            ImportAction::PreviewFailed { .. } => "PreviewFailed",
            ImportAction::MapColumn { .. } => "MapColumn",
            ImportAction::UnmapColumn { .. } => "UnmapColumn",
            ImportAction::ProceedToConfirm => "ProceedToConfirm",
            ImportAction::BackToMapping => "BackToMapping",
            ImportAction::ImportStarted => "ImportStarted",
            ImportAction::ProgressUpdated { .. } => "ProgressUpdated",
            ImportAction::ImportCompleted { .. } => "ImportCompleted",
            ImportAction::ImportFailed { .. } => "ImportFailed",
            ImportAction::Cancel => "Cancel",
            ImportAction::DismissError => "DismissError",
            ImportAction::Reset => "Reset",
        }
    }
}

impl ImportWizardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies an action. Equivalent to [`reduce`].
    pub fn apply(self, action: ImportAction) -> Self {
        reduce(self, action)
    }

    /// True when the state holds nothing but possibly a past result.
    fn is_pristine(&self) -> bool {
        self.step == ImportStep::Upload
            && self.file.is_none()
            && self.preview.is_none()
            && self.mapping.is_empty()
            && self.conflicts.is_empty()
            && self.error.is_none()
            && !self.loading
    }

    /// Back to the upload step with file, preview and mapping cleared.
    fn cleared(self) -> Self {
        if self.is_pristine() {
            return self;
        }
        Self {
            generation: self.generation + 1,
            result: self.result,
            ..Self::default()
        }
    }

    pub fn can_proceed_to_confirm(&self) -> bool {
        self.step == ImportStep::Mapping && self.preview.is_some()
    }
}

/// Computes the next wizard state. Actions that make no sense in the
/// current step leave the state untouched.
pub fn reduce(state: ImportWizardState, action: ImportAction) -> ImportWizardState {
    let name = action.name();
    let from = state.step;
    let next = transition(state, action);
    if next.step != from {
        debug!("Import wizard: {} moved {:?} -> {:?}", name, from, next.step);
    }
    next
}

fn transition(state: ImportWizardState, action: ImportAction) -> ImportWizardState {
    use ImportAction as A;
    use ImportStep as S;

    match (state.step, action) {
        (S::Upload | S::Mapping | S::Confirm | S::Done, A::FileSelected { file }) => {
            ImportWizardState {
                file: Some(file),
                loading: true,
                generation: state.generation + 1,
                result: state.result,
                ..ImportWizardState::default()
            }
        }

        (S::Upload, A::PreviewLoaded {
            generation,
            preview,
            proposal,
        }) if state.loading && generation == state.generation => ImportWizardState {
            step: S::Mapping,
            preview: Some(preview),
            mapping: proposal.mapping,
            conflicts: proposal.conflicts,
            loading: false,
            error: None,
            ..state
        },

        (S::Upload, A::PreviewFailed {
            generation,
            message,
        }) if state.loading && generation == state.generation => ImportWizardState {
            file: None,
            loading: false,
            error: Some(message),
            ..state
        },

        (S::Mapping, A::MapColumn { column, field }) => {
            let known = state
                .preview
                .as_ref()
                .map(|p| p.headers.contains(&column))
                .unwrap_or(false);
            if !known {
                return state;
            }
            let mut next = state;
            next.mapping.insert(column, field);
            refresh_conflicts(&mut next);
            next
        }

        (S::Mapping, A::UnmapColumn { column }) => {
            let mut next = state;
            next.mapping.remove(&column);
            refresh_conflicts(&mut next);
            next
        }

        (S::Mapping, A::ProceedToConfirm) if state.preview.is_some() => ImportWizardState {
            step: S::Confirm,
            error: None,
            ..state
        },

        (S::Confirm, A::BackToMapping) => ImportWizardState {
            step: S::Mapping,
            ..state
        },

        (S::Confirm, A::ImportStarted) if !state.loading => ImportWizardState {
            step: S::Importing,
            loading: true,
            progress: None,
            error: None,
            generation: state.generation + 1,
            ..state
        },

        (S::Importing, A::ProgressUpdated {
            generation,
            progress,
        }) if generation == state.generation => ImportWizardState {
            progress: Some(progress),
            ..state
        },

        (S::Importing, A::ImportCompleted { generation, batch })
            if generation == state.generation =>
        {
            ImportWizardState {
                step: S::Done,
                progress: Some(ImportProgress::from(&batch)),
                result: Some(batch),
                generation: state.generation,
                ..ImportWizardState::default()
            }
        }

        (S::Importing, A::ImportFailed {
            generation,
            message,
        }) if generation == state.generation => ImportWizardState {
            step: S::Confirm,
            loading: false,
            progress: None,
            error: Some(message),
            ..state
        },

        (S::Upload | S::Mapping | S::Confirm, A::Cancel) => state.cleared(),

        (_, A::DismissError) => ImportWizardState {
            error: None,
            ..state
        },

        (S::Done, A::Reset) => state.cleared(),

        (_, _) => state,
    }
}

/// Recomputes conflicts after a manual mapping change.
///
/// Auto-map conflicts stay while their column is unmapped and the kept column
/// still holds the field. Columns sharing a field are flagged after the first
/// one in header order, which is the one whose values are imported.
fn refresh_conflicts(state: &mut ImportWizardState) {
    let mapping = &state.mapping;
    state.conflicts.retain(|c| {
        mapping.get(&c.column).is_none() && mapping.get(&c.kept_column) == Some(c.field)
    });

    let headers: &[String] = state
        .preview
        .as_ref()
        .map(|p| p.headers.as_slice())
        .unwrap_or(&[]);
    for field in LeadField::ALL {
        let mut columns: Vec<&String> = Vec::new();
        for header in headers {
            if mapping.get(header) == Some(field) && !columns.contains(&header) {
                columns.push(header);
            }
        }
        if let Some((kept, rest)) = columns.split_first() {
            for column in rest {
                debug!("Column '{}' shares {} with '{}'", column, field, kept);
                state.conflicts.push(MappingConflict {
                    column: (*column).clone(),
                    field,
                    kept_column: (*kept).clone(),
                });
            }
        }
    }
}
