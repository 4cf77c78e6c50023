//! Campaign and platform connection domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::PREFLIGHT_ISSUE_SEPARATOR;

/// Lifecycle status of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
    Draft,
    Ready,
    Scheduled,
    Active,
    Paused,
    Archived,
    Failed,
}

impl CampaignStatus {
    pub const ALL: [CampaignStatus; 7] = [
        CampaignStatus::Draft,
        CampaignStatus::Ready,
        CampaignStatus::Scheduled,
        CampaignStatus::Active,
        CampaignStatus::Paused,
        CampaignStatus::Archived,
        CampaignStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "DRAFT",
            CampaignStatus::Ready => "READY",
            CampaignStatus::Scheduled => "SCHEDULED",
            CampaignStatus::Active => "ACTIVE",
            CampaignStatus::Paused => "PAUSED",
            CampaignStatus::Archived => "ARCHIVED",
            CampaignStatus::Failed => "FAILED",
        }
    }

    /// Statuses reachable from this one in a single step.
    pub fn allowed_transitions(&self) -> &'static [CampaignStatus] {
        use CampaignStatus::*;
        match self {
            Draft => &[Ready, Archived],
            Ready => &[Active, Scheduled, Draft, Archived],
            Scheduled => &[Active, Ready, Archived, Failed],
            Active => &[Paused, Failed, Archived],
            Paused => &[Active, Archived],
            Failed => &[Draft, Archived],
            Archived => &[],
        }
    }

    pub fn can_transition_to(&self, next: CampaignStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Ads platform a campaign runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdPlatform {
    Meta,
    Google,
    TikTok,
    LinkedIn,
}

impl AdPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdPlatform::Meta => "META",
            AdPlatform::Google => "GOOGLE",
            AdPlatform::TikTok => "TIKTOK",
            AdPlatform::LinkedIn => "LINKEDIN",
        }
    }
}

impl fmt::Display for AdPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub platform: AdPlatform,
    pub status: CampaignStatus,
    #[serde(default)]
    pub daily_budget: Option<Decimal>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Authorization state of an ads platform link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    Expired,
    Error,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionStatus::Connected => "CONNECTED",
            ConnectionStatus::Disconnected => "DISCONNECTED",
            ConnectionStatus::Expired => "EXPIRED",
            ConnectionStatus::Error => "ERROR",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConnection {
    pub platform: AdPlatform,
    pub status: ConnectionStatus,
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(default)]
    pub last_error: Option<String>,
}

impl PlatformConnection {
    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }
}

/// Backend verdict on whether a campaign may go live.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreflightResult {
    pub can_activate: bool,
    #[serde(default)]
    pub issues: Vec<String>,
}

impl PreflightResult {
    /// Issues as one message, one per line, in backend order.
    pub fn issues_message(&self) -> String {
        self.issues.join(PREFLIGHT_ISSUE_SEPARATOR)
    }
}

/// An ACTIVE campaign whose platform link is no longer usable.
///
/// Shown as a badge; the campaign keeps running until someone acts on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionWarning {
    pub campaign_id: String,
    pub campaign_name: String,
    pub platform: AdPlatform,
    /// `None` when no connection exists for the platform
    pub connection_status: Option<ConnectionStatus>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transition_table() {
        use CampaignStatus::*;
        assert!(Draft.can_transition_to(Ready));
        assert!(!Draft.can_transition_to(Active));
        assert!(Ready.can_transition_to(Active));
        assert!(Ready.can_transition_to(Scheduled));
        assert!(Scheduled.can_transition_to(Failed));
        assert!(Active.can_transition_to(Paused));
        assert!(!Active.can_transition_to(Ready));
        assert!(Paused.can_transition_to(Active));
        assert!(!Paused.can_transition_to(Draft));
        assert!(Failed.can_transition_to(Draft));
        assert!(!Failed.can_transition_to(Active));
    }

    #[test]
    fn test_archived_is_the_only_terminal_status() {
        let terminal: Vec<_> = CampaignStatus::ALL
            .iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(terminal, vec![&CampaignStatus::Archived]);

        for status in CampaignStatus::ALL {
            assert!(!status.can_transition_to(status), "{} loops", status);
        }
    }

    #[test]
    fn test_deserialize_campaign() {
        let json = r#"{
            "id": "cmp-1",
            "name": "Spring open house",
            "platform": "TIKTOK",
            "status": "READY",
            "dailyBudget": 150.5,
            "createdAt": "2026-02-10T08:00:00Z"
        }"#;

        let campaign: Campaign = serde_json::from_str(json).unwrap();

        assert_eq!(campaign.platform, AdPlatform::TikTok);
        assert_eq!(campaign.status, CampaignStatus::Ready);
        assert_eq!(campaign.daily_budget, Some(dec!(150.5)));
        assert!(campaign.updated_at.is_none());
    }

    #[test]
    fn test_deserialize_connection() {
        let json = r#"{"platform":"LINKEDIN","status":"EXPIRED","accountName":"Acme Realty"}"#;
        let connection: PlatformConnection = serde_json::from_str(json).unwrap();
        assert_eq!(connection.platform, AdPlatform::LinkedIn);
        assert!(!connection.is_connected());
        assert_eq!(connection.account_name.as_deref(), Some("Acme Realty"));
    }

    #[test]
    fn test_preflight_issues_message() {
        let result: PreflightResult = serde_json::from_str(
            r#"{"canActivate":false,"issues":["Budget exceeds account limit","Missing creative"]}"#,
        )
        .unwrap();
        assert_eq!(
            result.issues_message(),
            "Budget exceeds account limit\nMissing creative"
        );

        let ok: PreflightResult = serde_json::from_str(r#"{"canActivate":true}"#).unwrap();
        assert!(ok.issues.is_empty());
    }
}
