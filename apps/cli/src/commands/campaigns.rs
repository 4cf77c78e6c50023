use anyhow::Result;
use serde::Serialize;

use leadflow_core::campaigns::{Campaign, ConnectionWarning};

use crate::cli::CampaignCommands;
use crate::main_lib::AppContext;

use super::print_json;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CampaignListOutput {
    campaigns: Vec<Campaign>,
    warnings: Vec<ConnectionWarning>,
}

pub async fn run(ctx: &AppContext, command: CampaignCommands, json: bool) -> Result<()> {
    let service = &ctx.campaign_service;
    match command {
        CampaignCommands::List => {
            let campaigns = service.list_campaigns().await?;
            let warnings = service.connection_warnings().await?;
            if json {
                return print_json(&CampaignListOutput {
                    campaigns,
                    warnings,
                });
            }
            print_campaigns(&campaigns, &warnings);
            Ok(())
        }
        CampaignCommands::Activate { campaign_id } => {
            let campaign = service.activate_by_id(&campaign_id).await?;
            report(&campaign, "activated", json)
        }
        CampaignCommands::Pause { campaign_id } => {
            let campaign = service.pause_by_id(&campaign_id).await?;
            report(&campaign, "paused", json)
        }
        CampaignCommands::Duplicate { campaign_id } => {
            let copy = service.duplicate_by_id(&campaign_id).await?;
            report(&copy, "created", json)
        }
    }
}

fn report(campaign: &Campaign, verb: &str, json: bool) -> Result<()> {
    if json {
        return print_json(campaign);
    }
    println!(
        "Campaign '{}' ({}) {}: now {}",
        campaign.name, campaign.id, verb, campaign.status
    );
    Ok(())
}

fn print_campaigns(campaigns: &[Campaign], warnings: &[ConnectionWarning]) {
    if campaigns.is_empty() {
        println!("No campaigns");
        return;
    }
    println!(
        "{:<24} {:<30} {:<9} {:<10} {:>12}",
        "ID", "NAME", "PLATFORM", "STATUS", "DAILY BUDGET"
    );
    for campaign in campaigns {
        let budget = campaign
            .daily_budget
            .map(|b| b.round_dp(2).to_string())
            .unwrap_or_else(|| "-".to_string());
        let badge = if warnings.iter().any(|w| w.campaign_id == campaign.id) {
            " !"
        } else {
            ""
        };
        println!(
            "{:<24} {:<30} {:<9} {:<10} {:>12}{}",
            campaign.id, campaign.name, campaign.platform, campaign.status, budget, badge
        );
    }
    if !warnings.is_empty() {
        println!();
        for warning in warnings {
            println!("! {}", warning.message);
        }
    }
}
