use async_trait::async_trait;

use super::campaigns_model::{Campaign, ConnectionWarning, PlatformConnection, PreflightResult};
use crate::Result;

/// Trait for the backend campaign and connection endpoints
#[async_trait]
pub trait CampaignApiTrait: Send + Sync {
    async fn list_campaigns(&self, owner_uid: &str) -> Result<Vec<Campaign>>;

    async fn list_connections(&self, owner_uid: &str) -> Result<Vec<PlatformConnection>>;

    /// Run the backend validation pass for a campaign
    async fn preflight_check(&self, campaign_id: &str) -> Result<PreflightResult>;

    /// Returns the updated campaign when the backend sends one back
    async fn activate(&self, campaign_id: &str) -> Result<Option<Campaign>>;

    async fn pause(&self, campaign_id: &str) -> Result<Option<Campaign>>;

    /// Returns the copy
    async fn duplicate(&self, campaign_id: &str) -> Result<Campaign>;
}

/// Trait for campaign service operations
#[async_trait]
pub trait CampaignServiceTrait: Send + Sync {
    async fn list_campaigns(&self) -> Result<Vec<Campaign>>;

    async fn list_connections(&self) -> Result<Vec<PlatformConnection>>;

    /// Activate a campaign over the given connection, after gating and preflight
    async fn activate(
        &self,
        campaign: &Campaign,
        connection: Option<&PlatformConnection>,
    ) -> Result<Campaign>;

    /// Look up the campaign and its connection, then activate
    async fn activate_by_id(&self, campaign_id: &str) -> Result<Campaign>;

    async fn pause(&self, campaign: &Campaign) -> Result<Campaign>;

    async fn pause_by_id(&self, campaign_id: &str) -> Result<Campaign>;

    async fn duplicate(&self, campaign: &Campaign) -> Result<Campaign>;

    async fn duplicate_by_id(&self, campaign_id: &str) -> Result<Campaign>;

    /// ACTIVE campaigns whose platform connection is no longer usable
    async fn connection_warnings(&self) -> Result<Vec<ConnectionWarning>>;
}
