use anyhow::Result;
use serde::Serialize;

use leadflow_core::imports::{HistorySummary, ImportBatch};

use crate::main_lib::AppContext;

use super::print_json;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryOutput<'a> {
    summary: HistorySummary,
    batches: &'a [ImportBatch],
}

pub async fn run(ctx: &AppContext, limit: Option<usize>, json: bool) -> Result<()> {
    let batches = ctx.import_service.list_batches().await?;
    let summary = HistorySummary::from_batches(&batches);
    let shown = &batches[..limit.unwrap_or(batches.len()).min(batches.len())];

    if json {
        return print_json(&HistoryOutput {
            summary,
            batches: shown,
        });
    }

    if shown.is_empty() {
        println!("No imports yet");
        return Ok(());
    }

    println!(
        "{:<20} {:<30} {:<11} {:>6} {:>8} {:>6} {:>6}",
        "CREATED", "FILE", "STATUS", "ROWS", "IMPORTED", "ERRORS", "DUPES"
    );
    for batch in shown {
        println!(
            "{:<20} {:<30} {:<11} {:>6} {:>8} {:>6} {:>6}",
            batch.created_at.format("%Y-%m-%d %H:%M:%S"),
            truncate(&batch.filename, 30),
            batch.status,
            batch.total_rows,
            batch.success_count,
            batch.error_count,
            batch.duplicate_count
        );
    }
    println!();
    println!(
        "{} imports ({} failed, {} in progress): {} rows, {} imported, {} errors, {} duplicates",
        summary.batches,
        summary.failed_batches,
        summary.in_progress_batches,
        summary.total_rows,
        summary.success_count,
        summary.error_count,
        summary.duplicate_count
    );
    Ok(())
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let kept: String = value.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", kept)
}
