use anyhow::Result;

use crate::main_lib::AppContext;

use super::print_json;

pub async fn run(ctx: &AppContext, json: bool) -> Result<()> {
    let report = ctx.source_health_service.refresh().await?;

    if json {
        return print_json(&report);
    }

    if report.sources.is_empty() {
        println!("No lead sources reported");
        return Ok(());
    }

    for source in &report.sources {
        let state = if source.is_healthy { "ok" } else { "UNHEALTHY" };
        let last_event = source
            .last_event_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());
        println!(
            "{:<24} {:<9} today {:>5}  total {:>7}  last lead {}",
            source.source, state, source.today_leads, source.total_leads, last_event
        );
        if let Some(error) = &source.last_error {
            println!("{:<24} last error: {}", "", error);
        }
    }
    println!();
    println!(
        "{}/{} healthy, {} leads today, {} total",
        report.healthy_count,
        report.sources.len(),
        report.today_leads,
        report.total_leads
    );
    Ok(())
}
