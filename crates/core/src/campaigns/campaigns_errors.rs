use thiserror::Error;

use super::campaigns_model::{AdPlatform, CampaignStatus, ConnectionStatus};
use crate::constants::PREFLIGHT_ISSUE_SEPARATOR;

/// Errors raised by the campaign activation gate.
#[derive(Error, Debug)]
pub enum CampaignError {
    /// No usable platform link. `status` is `None` when no connection exists.
    #[error("{platform} account is not connected{}", status_suffix(.status))]
    ConnectionNotReady {
        platform: AdPlatform,
        status: Option<ConnectionStatus>,
    },

    #[error("Cannot {action} a campaign in {status} status (must be {required})")]
    InvalidStatus {
        action: &'static str,
        status: CampaignStatus,
        required: CampaignStatus,
    },

    #[error("Campaign cannot move from {from} to {to}")]
    InvalidTransition {
        from: CampaignStatus,
        to: CampaignStatus,
    },

    /// Backend preflight issues, verbatim, one per line.
    #[error("{}", .issues.join(PREFLIGHT_ISSUE_SEPARATOR))]
    PreflightRejected { issues: Vec<String> },

    #[error("Campaign not found: {0}")]
    NotFound(String),
}

fn status_suffix(status: &Option<ConnectionStatus>) -> String {
    match status {
        Some(s) => format!(" ({})", s),
        None => String::new(),
    }
}
