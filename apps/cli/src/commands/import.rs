use std::path::Path;

use anyhow::{anyhow, bail, Result};
use tokio_util::sync::CancellationToken;

use leadflow_core::imports::{
    apply_mapping, reduce, ImportAction, ImportBatch, ImportProgress, ImportStep,
    ImportWizardState, MappingPreview, MappingProposal, ParseConfig, SelectedFile, UploadFile,
};
use leadflow_core::leads::LeadField;

use crate::cli::LocalParseArgs;
use crate::main_lib::AppContext;
use crate::reporter::ChannelProgressReporter;

use super::print_json;

pub struct ImportArgs<'a> {
    pub file: &'a Path,
    pub mappings: &'a [String],
    pub yes: bool,
    /// Map from a local parse with default options; the bytes go up as read.
    pub offline: bool,
}

fn parse_config(args: &LocalParseArgs) -> ParseConfig {
    ParseConfig {
        delimiter: args.delimiter.clone(),
        skip_top_rows: args.skip_top_rows,
        ..ParseConfig::default()
    }
}

async fn load_preview(
    ctx: &AppContext,
    upload: &UploadFile,
    parse: &LocalParseArgs,
    cancel: &CancellationToken,
) -> leadflow_core::Result<MappingPreview> {
    if parse.offline {
        ctx.import_service.preview_local(upload, &parse_config(parse))
    } else {
        ctx.import_service.preview(upload, cancel).await
    }
}

pub async fn preview(
    ctx: &AppContext,
    file: &Path,
    parse: &LocalParseArgs,
    json: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let upload = ctx.import_service.load_file(file)?;
    let result = load_preview(ctx, &upload, parse, cancel).await?;

    if json {
        return print_json(&result);
    }
    print_preview(&result);
    print_proposal_notes(&result.proposal);
    Ok(())
}

/// Turns a `COLUMN=field` flag into a wizard action. An empty field drops the column.
fn mapping_override(spec: &str) -> Result<ImportAction> {
    let (column, field) = spec
        .rsplit_once('=')
        .ok_or_else(|| anyhow!("Invalid mapping '{}': expected COLUMN=FIELD", spec))?;
    let column = column.trim().to_string();
    if column.is_empty() {
        bail!("Invalid mapping '{}': column name is empty", spec);
    }
    let field = field.trim();
    if field.is_empty() || field == "-" {
        return Ok(ImportAction::UnmapColumn { column });
    }
    let field: LeadField = field.parse()?;
    Ok(ImportAction::MapColumn { column, field })
}

pub async fn import(
    ctx: &AppContext,
    args: ImportArgs<'_>,
    json: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let upload = ctx.import_service.load_file(args.file)?;

    let mut state = reduce(
        ImportWizardState::new(),
        ImportAction::FileSelected {
            file: SelectedFile {
                file_name: upload.file_name.clone(),
                size_bytes: upload.size(),
            },
        },
    );

    let generation = state.generation;
    let parse = LocalParseArgs {
        offline: args.offline,
        ..LocalParseArgs::default()
    };
    state = match load_preview(ctx, &upload, &parse, cancel).await {
        Ok(MappingPreview { preview, proposal }) => {
            print_proposal_notes(&proposal);
            reduce(
                state,
                ImportAction::PreviewLoaded {
                    generation,
                    preview,
                    proposal,
                },
            )
        }
        Err(err) if err.is_cancelled() => bail!("Preview cancelled"),
        Err(err) => {
            let state = reduce(
                state,
                ImportAction::PreviewFailed {
                    generation,
                    message: err.to_string(),
                },
            );
            bail!(state.error.unwrap_or_else(|| err.to_string()));
        }
    };

    for spec in args.mappings {
        let action = mapping_override(spec)?;
        if let ImportAction::MapColumn { column, .. } | ImportAction::UnmapColumn { column } =
            &action
        {
            let known = state
                .preview
                .as_ref()
                .is_some_and(|p| p.headers.iter().any(|h| h == column));
            if !known {
                bail!("Column '{}' is not in {}", column, upload.file_name);
            }
        }
        state = reduce(state, action);
    }

    state = reduce(state, ImportAction::ProceedToConfirm);
    if state.step != ImportStep::Confirm {
        bail!("Nothing to import");
    }

    if !json {
        if let Some(preview) = &state.preview {
            print_preview(&MappingPreview {
                preview: preview.clone(),
                proposal: MappingProposal {
                    mapping: state.mapping.clone(),
                    ..MappingProposal::default()
                },
            });
        }
    }

    if !args.yes {
        let rows = state.preview.as_ref().map(|p| p.total_rows).unwrap_or(0);
        let question = format!("Import {} rows from {}?", rows, upload.file_name);
        if !confirm(&question).await? {
            println!("Import cancelled");
            return Ok(());
        }
    }

    state = reduce(state, ImportAction::ImportStarted);
    let generation = state.generation;
    let mapping = state.mapping.clone();

    let (reporter, mut progress_rx) = ChannelProgressReporter::new();
    let mut import = ctx
        .import_service
        .confirm_import(&upload, &mapping, &reporter, cancel);

    let result = loop {
        tokio::select! {
            result = &mut import => break result,
            Some(progress) = progress_rx.recv() => {
                if !json {
                    render_progress(&progress);
                }
                state = reduce(state, ImportAction::ProgressUpdated { generation, progress });
            }
        }
    };
    while let Ok(progress) = progress_rx.try_recv() {
        if !json {
            render_progress(&progress);
        }
        state = reduce(state, ImportAction::ProgressUpdated { generation, progress });
    }

    match result {
        Ok(batch) => {
            state = reduce(state, ImportAction::ImportCompleted { generation, batch });
            let batch = state
                .result
                .as_ref()
                .ok_or_else(|| anyhow!("Import finished without a batch record"))?;
            if json {
                print_json(batch)
            } else {
                print_batch_summary(batch);
                Ok(())
            }
        }
        Err(err) => {
            state = reduce(
                state,
                ImportAction::ImportFailed {
                    generation,
                    message: err.to_string(),
                },
            );
            bail!(state.error.unwrap_or_else(|| err.to_string()))
        }
    }
}

pub async fn watch(
    ctx: &AppContext,
    batch_id: &str,
    json: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let (reporter, mut progress_rx) = ChannelProgressReporter::new();
    let mut watch = ctx.import_service.watch_batch(batch_id, &reporter, cancel);

    let result = loop {
        tokio::select! {
            result = &mut watch => break result,
            Some(progress) = progress_rx.recv() => {
                if !json {
                    render_progress(&progress);
                }
            }
        }
    };

    let batch = result?;
    if json {
        print_json(&batch)
    } else {
        print_batch_summary(&batch);
        Ok(())
    }
}

async fn confirm(question: &str) -> Result<bool> {
    let question = question.to_string();
    let answer = tokio::task::spawn_blocking(move || -> std::io::Result<String> {
        use std::io::Write;
        print!("{} [y/N] ", question);
        std::io::stdout().flush()?;
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        Ok(line)
    })
    .await??;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn print_preview(result: &MappingPreview) {
    let preview = &result.preview;
    println!("{} data rows, {} columns", preview.total_rows, preview.headers.len());
    println!();
    for header in &preview.headers {
        let target = result
            .proposal
            .mapping
            .get(header)
            .map(|f| f.as_str())
            .unwrap_or("(not imported)");
        println!("  {:<30} -> {}", header, target);
    }

    if let Some(row) = preview.rows.first() {
        let lead = apply_mapping(&result.proposal.mapping, &preview.headers, row);
        println!();
        match lead.display_name() {
            Some(name) => println!("First lead: {}", name),
            None if lead.is_empty() => println!("First row maps to an empty lead"),
            None => println!("First lead has no name"),
        }
    }
}

fn print_proposal_notes(proposal: &MappingProposal) {
    for conflict in &proposal.conflicts {
        eprintln!(
            "warning: '{}' also looks like {}, already taken by '{}'; it was left unmapped",
            conflict.column, conflict.field, conflict.kept_column
        );
    }
    for alt in &proposal.alternatives {
        let fields: Vec<&str> = alt.fields.iter().map(|f| f.as_str()).collect();
        eprintln!(
            "note: '{}' could also be {}",
            alt.column,
            fields.join(" or ")
        );
    }
}

fn render_progress(progress: &ImportProgress) {
    println!(
        "{:>3}% {}/{} rows  ({} imported, {} errors, {} duplicates)",
        progress.percent,
        progress.processed_rows,
        progress.total_rows,
        progress.success_count,
        progress.error_count,
        progress.duplicate_count
    );
}

fn print_batch_summary(batch: &ImportBatch) {
    println!();
    println!("Batch {} {}", batch.id, batch.status);
    println!("  imported:   {}", batch.success_count);
    println!("  errors:     {}", batch.error_count);
    println!("  duplicates: {}", batch.duplicate_count);
    for error in batch.errors.iter().take(10) {
        println!("  - {}", error);
    }
    if batch.errors.len() > 10 {
        println!("  ... {} more", batch.errors.len() - 10);
    }
}
