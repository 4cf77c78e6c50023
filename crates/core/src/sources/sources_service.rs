use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;

use super::sources_model::SourceHealthReport;
use super::sources_traits::{SourceHealthApiTrait, SourceHealthServiceTrait};
use crate::Result;

pub struct SourceHealthService {
    api: Arc<dyn SourceHealthApiTrait>,
    owner_uid: String,
}

impl SourceHealthService {
    pub fn new(api: Arc<dyn SourceHealthApiTrait>, owner_uid: impl Into<String>) -> Self {
        Self {
            api,
            owner_uid: owner_uid.into(),
        }
    }
}

#[async_trait]
impl SourceHealthServiceTrait for SourceHealthService {
    async fn refresh(&self) -> Result<SourceHealthReport> {
        let sources = self.api.get_source_health(&self.owner_uid).await?;
        let report = SourceHealthReport::from_sources(sources);
        for source in report.unhealthy() {
            warn!(
                "Lead source '{}' is unhealthy: {}",
                source.source,
                source.last_error.as_deref().unwrap_or("no error reported")
            );
        }
        info!(
            "{}/{} lead sources healthy",
            report.healthy_count,
            report.sources.len()
        );
        Ok(report)
    }
}
