use async_trait::async_trait;
use log::{debug, info, warn};
use std::sync::Arc;

use super::activation::{check_activation, check_pause, connection_for, connection_warnings};
use super::campaigns_errors::CampaignError;
use super::campaigns_model::{Campaign, CampaignStatus, ConnectionWarning, PlatformConnection};
use super::campaigns_traits::{CampaignApiTrait, CampaignServiceTrait};
use crate::Result;

/// Fallback message when the backend rejects a campaign without listing issues.
const PREFLIGHT_REJECTED_MESSAGE: &str = "Campaign failed preflight checks";

/// Service gating campaign lifecycle actions for one tenant.
pub struct CampaignService {
    api: Arc<dyn CampaignApiTrait>,
    owner_uid: String,
}

impl CampaignService {
    pub fn new(api: Arc<dyn CampaignApiTrait>, owner_uid: impl Into<String>) -> Self {
        Self {
            api,
            owner_uid: owner_uid.into(),
        }
    }

    async fn find_campaign(&self, campaign_id: &str) -> Result<Campaign> {
        self.api
            .list_campaigns(&self.owner_uid)
            .await?
            .into_iter()
            .find(|c| c.id == campaign_id)
            .ok_or_else(|| CampaignError::NotFound(campaign_id.to_string()).into())
    }
}

/// The campaign the backend sent back, or the local one moved to `status`.
fn updated(returned: Option<Campaign>, campaign: &Campaign, status: CampaignStatus) -> Campaign {
    returned.unwrap_or_else(|| Campaign {
        status,
        ..campaign.clone()
    })
}

#[async_trait]
impl CampaignServiceTrait for CampaignService {
    async fn list_campaigns(&self) -> Result<Vec<Campaign>> {
        let campaigns = self.api.list_campaigns(&self.owner_uid).await?;
        debug!("Fetched {} campaigns", campaigns.len());
        Ok(campaigns)
    }

    async fn list_connections(&self) -> Result<Vec<PlatformConnection>> {
        self.api.list_connections(&self.owner_uid).await
    }

    async fn activate(
        &self,
        campaign: &Campaign,
        connection: Option<&PlatformConnection>,
    ) -> Result<Campaign> {
        check_activation(campaign, connection)?;

        let preflight = self.api.preflight_check(&campaign.id).await?;
        if !preflight.can_activate {
            let issues = if preflight.issues.is_empty() {
                vec![PREFLIGHT_REJECTED_MESSAGE.to_string()]
            } else {
                preflight.issues
            };
            warn!(
                "Preflight rejected campaign {} with {} issues",
                campaign.id,
                issues.len()
            );
            return Err(CampaignError::PreflightRejected { issues }.into());
        }

        let returned = self.api.activate(&campaign.id).await?;
        info!("Activated campaign {} ({})", campaign.id, campaign.name);
        Ok(updated(returned, campaign, CampaignStatus::Active))
    }

    async fn activate_by_id(&self, campaign_id: &str) -> Result<Campaign> {
        let campaign = self.find_campaign(campaign_id).await?;
        let connections = self.api.list_connections(&self.owner_uid).await?;
        let connection = connection_for(campaign.platform, &connections);
        self.activate(&campaign, connection).await
    }

    async fn pause(&self, campaign: &Campaign) -> Result<Campaign> {
        check_pause(campaign)?;
        let returned = self.api.pause(&campaign.id).await?;
        info!("Paused campaign {} ({})", campaign.id, campaign.name);
        Ok(updated(returned, campaign, CampaignStatus::Paused))
    }

    async fn pause_by_id(&self, campaign_id: &str) -> Result<Campaign> {
        let campaign = self.find_campaign(campaign_id).await?;
        self.pause(&campaign).await
    }

    async fn duplicate(&self, campaign: &Campaign) -> Result<Campaign> {
        let copy = self.api.duplicate(&campaign.id).await?;
        if copy.status != CampaignStatus::Draft {
            warn!(
                "Duplicate {} of campaign {} came back as {}",
                copy.id, campaign.id, copy.status
            );
        }
        info!("Duplicated campaign {} into {}", campaign.id, copy.id);
        Ok(copy)
    }

    async fn duplicate_by_id(&self, campaign_id: &str) -> Result<Campaign> {
        let campaign = self.find_campaign(campaign_id).await?;
        self.duplicate(&campaign).await
    }

    async fn connection_warnings(&self) -> Result<Vec<ConnectionWarning>> {
        let campaigns = self.api.list_campaigns(&self.owner_uid).await?;
        let connections = self.api.list_connections(&self.owner_uid).await?;
        let warnings = connection_warnings(&campaigns, &connections);
        for warning in &warnings {
            warn!("{}", warning.message);
        }
        Ok(warnings)
    }
}
