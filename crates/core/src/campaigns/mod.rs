//! Campaigns module - lifecycle state machine, activation gate and connection warnings.

mod activation;
mod campaigns_errors;
mod campaigns_model;
mod campaigns_service;
mod campaigns_traits;

#[cfg(test)]
mod campaigns_service_tests;

pub use activation::{
    check_activation, check_pause, check_transition, connection_for, connection_warnings,
};
pub use campaigns_errors::CampaignError;
pub use campaigns_model::{
    AdPlatform, Campaign, CampaignStatus, ConnectionStatus, ConnectionWarning,
    PlatformConnection, PreflightResult,
};
pub use campaigns_service::CampaignService;
pub use campaigns_traits::{CampaignApiTrait, CampaignServiceTrait};
