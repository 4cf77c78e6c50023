//! Tests for the campaign service against a recording backend.

use super::*;
use crate::errors::Error;
use async_trait::async_trait;
use rust_decimal_macros::dec;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct MockCampaignApi {
    campaigns: Vec<Campaign>,
    connections: Vec<PlatformConnection>,
    preflight: PreflightResult,
    /// Endpoint calls in order, as "preflight:<id>", "activate:<id>", ...
    calls: Mutex<Vec<String>>,
}

impl MockCampaignApi {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CampaignApiTrait for MockCampaignApi {
    async fn list_campaigns(&self, owner_uid: &str) -> crate::Result<Vec<Campaign>> {
        assert_eq!(owner_uid, "owner-1");
        Ok(self.campaigns.clone())
    }

    async fn list_connections(&self, _owner_uid: &str) -> crate::Result<Vec<PlatformConnection>> {
        Ok(self.connections.clone())
    }

    async fn preflight_check(&self, campaign_id: &str) -> crate::Result<PreflightResult> {
        self.record(format!("preflight:{}", campaign_id));
        Ok(self.preflight.clone())
    }

    async fn activate(&self, campaign_id: &str) -> crate::Result<Option<Campaign>> {
        self.record(format!("activate:{}", campaign_id));
        Ok(None)
    }

    async fn pause(&self, campaign_id: &str) -> crate::Result<Option<Campaign>> {
        self.record(format!("pause:{}", campaign_id));
        let mut campaign = self
            .campaigns
            .iter()
            .find(|c| c.id == campaign_id)
            .cloned()
            .ok_or_else(|| Error::api(404, "Campaign not found"))?;
        campaign.status = CampaignStatus::Paused;
        Ok(Some(campaign))
    }

    async fn duplicate(&self, campaign_id: &str) -> crate::Result<Campaign> {
        self.record(format!("duplicate:{}", campaign_id));
        let source = self
            .campaigns
            .iter()
            .find(|c| c.id == campaign_id)
            .ok_or_else(|| Error::api(404, "Campaign not found"))?;
        Ok(Campaign {
            id: format!("{}-copy", source.id),
            name: format!("{} (copy)", source.name),
            status: CampaignStatus::Draft,
            ..source.clone()
        })
    }
}

fn campaign(id: &str, status: CampaignStatus) -> Campaign {
    Campaign {
        id: id.to_string(),
        name: "Spring open house".to_string(),
        platform: AdPlatform::Meta,
        status,
        daily_budget: Some(dec!(250)),
        created_at: None,
        updated_at: None,
    }
}

fn meta(status: ConnectionStatus) -> PlatformConnection {
    PlatformConnection {
        platform: AdPlatform::Meta,
        status,
        account_name: None,
        last_error: None,
    }
}

fn setup(api: MockCampaignApi) -> (CampaignService, Arc<MockCampaignApi>) {
    let api = Arc::new(api);
    (CampaignService::new(api.clone(), "owner-1"), api)
}

fn passing_preflight() -> PreflightResult {
    PreflightResult {
        can_activate: true,
        issues: vec![],
    }
}

// ============================================================================
// Activate
// ============================================================================

#[tokio::test]
async fn test_activate_runs_preflight_then_activates() {
    let (service, api) = setup(MockCampaignApi {
        preflight: passing_preflight(),
        ..Default::default()
    });
    let connection = meta(ConnectionStatus::Connected);

    let result = service
        .activate(&campaign("cmp-1", CampaignStatus::Ready), Some(&connection))
        .await
        .unwrap();

    assert_eq!(result.status, CampaignStatus::Active);
    assert_eq!(api.calls(), vec!["preflight:cmp-1", "activate:cmp-1"]);
}

#[tokio::test]
async fn test_preflight_rejection_never_activates() {
    let (service, api) = setup(MockCampaignApi {
        preflight: PreflightResult {
            can_activate: false,
            issues: vec!["Budget exceeds account limit".to_string()],
        },
        ..Default::default()
    });
    let connection = meta(ConnectionStatus::Connected);

    let err = service
        .activate(&campaign("cmp-1", CampaignStatus::Ready), Some(&connection))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Budget exceeds account limit");
    assert!(matches!(
        err,
        Error::Campaign(CampaignError::PreflightRejected { .. })
    ));
    assert_eq!(api.calls(), vec!["preflight:cmp-1"]);
}

#[tokio::test]
async fn test_preflight_issues_are_joined_by_newline() {
    let (service, _) = setup(MockCampaignApi {
        preflight: PreflightResult {
            can_activate: false,
            issues: vec![
                "Budget exceeds account limit".to_string(),
                "Ad creative missing".to_string(),
            ],
        },
        ..Default::default()
    });
    let connection = meta(ConnectionStatus::Connected);

    let err = service
        .activate(&campaign("cmp-1", CampaignStatus::Ready), Some(&connection))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Budget exceeds account limit\nAd creative missing"
    );
}

#[tokio::test]
async fn test_disconnected_platform_blocks_before_any_call() {
    for status in CampaignStatus::ALL {
        let (service, api) = setup(MockCampaignApi {
            preflight: passing_preflight(),
            ..Default::default()
        });
        let connection = meta(ConnectionStatus::Expired);

        let err = service
            .activate(&campaign("cmp-1", status), Some(&connection))
            .await
            .unwrap_err();

        assert!(
            matches!(
                err,
                Error::Campaign(CampaignError::ConnectionNotReady { .. })
            ),
            "{}",
            status
        );
        assert!(api.calls().is_empty());
    }
}

#[tokio::test]
async fn test_non_ready_campaign_is_refused() {
    let (service, api) = setup(MockCampaignApi {
        preflight: passing_preflight(),
        ..Default::default()
    });
    let connection = meta(ConnectionStatus::Connected);

    let err = service
        .activate(&campaign("cmp-1", CampaignStatus::Draft), Some(&connection))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Campaign(CampaignError::InvalidStatus { .. })
    ));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_activate_by_id_uses_platform_connection() {
    let (service, api) = setup(MockCampaignApi {
        campaigns: vec![campaign("cmp-1", CampaignStatus::Ready)],
        connections: vec![meta(ConnectionStatus::Connected)],
        preflight: passing_preflight(),
        ..Default::default()
    });

    let result = service.activate_by_id("cmp-1").await.unwrap();

    assert_eq!(result.status, CampaignStatus::Active);
    assert_eq!(api.calls(), vec!["preflight:cmp-1", "activate:cmp-1"]);
}

#[tokio::test]
async fn test_activate_by_unknown_id() {
    let (service, _) = setup(MockCampaignApi::default());

    let err = service.activate_by_id("cmp-404").await.unwrap_err();

    assert!(matches!(err, Error::Campaign(CampaignError::NotFound(_))));
}

// ============================================================================
// Pause / Duplicate / Warnings
// ============================================================================

#[tokio::test]
async fn test_pause_active_campaign() {
    let (service, api) = setup(MockCampaignApi {
        campaigns: vec![campaign("cmp-1", CampaignStatus::Active)],
        ..Default::default()
    });

    let result = service.pause_by_id("cmp-1").await.unwrap();

    assert_eq!(result.status, CampaignStatus::Paused);
    assert_eq!(api.calls(), vec!["pause:cmp-1"]);
}

#[tokio::test]
async fn test_pause_refused_unless_active() {
    let (service, api) = setup(MockCampaignApi::default());

    let err = service
        .pause(&campaign("cmp-1", CampaignStatus::Ready))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Cannot pause a campaign in READY status (must be ACTIVE)"
    );
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_duplicate_returns_draft_copy() {
    let (service, _) = setup(MockCampaignApi {
        campaigns: vec![campaign("cmp-1", CampaignStatus::Active)],
        ..Default::default()
    });

    let copy = service.duplicate_by_id("cmp-1").await.unwrap();

    assert_eq!(copy.id, "cmp-1-copy");
    assert_eq!(copy.status, CampaignStatus::Draft);
    assert_eq!(copy.daily_budget, Some(dec!(250)));
}

#[tokio::test]
async fn test_connection_warnings_do_not_pause() {
    let (service, api) = setup(MockCampaignApi {
        campaigns: vec![campaign("cmp-1", CampaignStatus::Active)],
        connections: vec![meta(ConnectionStatus::Disconnected)],
        ..Default::default()
    });

    let warnings = service.connection_warnings().await.unwrap();

    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].campaign_id, "cmp-1");
    assert!(api.calls().is_empty());
}
