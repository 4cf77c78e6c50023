use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use leadflow_connect::LeadflowApiClient;
use leadflow_core::campaigns::{CampaignService, CampaignServiceTrait};
use leadflow_core::imports::{ImportConfig, ImportService, ImportServiceTrait};
use leadflow_core::sources::{SourceHealthService, SourceHealthServiceTrait};

use crate::config::Config;

pub struct AppContext {
    pub import_service: Arc<dyn ImportServiceTrait>,
    pub campaign_service: Arc<dyn CampaignServiceTrait>,
    pub source_health_service: Arc<dyn SourceHealthServiceTrait>,
}

/// Logs go to stderr so command output on stdout stays clean.
pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Builds the services. Callers that reach the backend check the owner first.
pub fn build_context(config: &Config, import_config: ImportConfig) -> anyhow::Result<AppContext> {
    let owner_uid = config.owner_uid.clone().unwrap_or_default();
    let client = Arc::new(LeadflowApiClient::new(
        &config.api_url,
        config.api_token.as_deref(),
        config.request_timeout,
    )?);
    tracing::debug!("Using backend at {}", client.base_url());

    let import_service: Arc<dyn ImportServiceTrait> = Arc::new(ImportService::new(
        client.clone(),
        owner_uid.clone(),
        import_config,
    ));
    let campaign_service: Arc<dyn CampaignServiceTrait> =
        Arc::new(CampaignService::new(client.clone(), owner_uid.clone()));
    let source_health_service: Arc<dyn SourceHealthServiceTrait> =
        Arc::new(SourceHealthService::new(client, owner_uid));

    Ok(AppContext {
        import_service,
        campaign_service,
        source_health_service,
    })
}

/// Import settings derived from the environment.
pub fn import_config(config: &Config) -> ImportConfig {
    ImportConfig {
        poll_interval: config.poll_interval,
        max_upload_bytes: config.max_upload_bytes,
        ..ImportConfig::default()
    }
}
