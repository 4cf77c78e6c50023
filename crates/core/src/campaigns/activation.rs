//! Client-side activation gate.
//!
//! These checks run before any backend call. The backend preflight still has
//! the final word; passing here only means the request is worth sending.

use super::campaigns_errors::CampaignError;
use super::campaigns_model::{
    AdPlatform, Campaign, CampaignStatus, ConnectionWarning, PlatformConnection,
};

/// Finds the connection for a platform, if one exists.
pub fn connection_for(
    platform: AdPlatform,
    connections: &[PlatformConnection],
) -> Option<&PlatformConnection> {
    connections.iter().find(|c| c.platform == platform)
}

/// Checks that `from -> to` is a legal lifecycle step.
pub fn check_transition(from: CampaignStatus, to: CampaignStatus) -> Result<(), CampaignError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(CampaignError::InvalidTransition { from, to })
    }
}

/// Checks whether `campaign` may be activated over `connection`.
///
/// The connection is checked first, whatever the campaign status.
pub fn check_activation(
    campaign: &Campaign,
    connection: Option<&PlatformConnection>,
) -> Result<(), CampaignError> {
    match connection {
        Some(c) if c.platform == campaign.platform && c.is_connected() => {}
        Some(c) if c.platform == campaign.platform => {
            return Err(CampaignError::ConnectionNotReady {
                platform: campaign.platform,
                status: Some(c.status),
            });
        }
        _ => {
            return Err(CampaignError::ConnectionNotReady {
                platform: campaign.platform,
                status: None,
            });
        }
    }

    if campaign.status != CampaignStatus::Ready {
        return Err(CampaignError::InvalidStatus {
            action: "activate",
            status: campaign.status,
            required: CampaignStatus::Ready,
        });
    }
    check_transition(campaign.status, CampaignStatus::Active)
}

/// Only ACTIVE campaigns can be paused.
pub fn check_pause(campaign: &Campaign) -> Result<(), CampaignError> {
    if campaign.status != CampaignStatus::Active {
        return Err(CampaignError::InvalidStatus {
            action: "pause",
            status: campaign.status,
            required: CampaignStatus::Active,
        });
    }
    check_transition(campaign.status, CampaignStatus::Paused)
}

/// ACTIVE campaigns running over a connection that is not CONNECTED.
pub fn connection_warnings(
    campaigns: &[Campaign],
    connections: &[PlatformConnection],
) -> Vec<ConnectionWarning> {
    campaigns
        .iter()
        .filter(|c| c.status == CampaignStatus::Active)
        .filter_map(|campaign| {
            let connection = connection_for(campaign.platform, connections);
            if connection.is_some_and(|c| c.is_connected()) {
                return None;
            }
            let connection_status = connection.map(|c| c.status);
            let message = match connection_status {
                Some(status) => format!(
                    "{} connection is {}; campaign '{}' may stop delivering",
                    campaign.platform, status, campaign.name
                ),
                None => format!(
                    "No {} connection; campaign '{}' may stop delivering",
                    campaign.platform, campaign.name
                ),
            };
            Some(ConnectionWarning {
                campaign_id: campaign.id.clone(),
                campaign_name: campaign.name.clone(),
                platform: campaign.platform,
                connection_status,
                message,
            })
        })
        .collect()
}
