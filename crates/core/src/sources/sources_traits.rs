use async_trait::async_trait;

use super::sources_model::{SourceHealth, SourceHealthReport};
use crate::Result;

/// Trait for the backend source health endpoint
#[async_trait]
pub trait SourceHealthApiTrait: Send + Sync {
    async fn get_source_health(&self, owner_uid: &str) -> Result<Vec<SourceHealth>>;
}

/// Trait for source health service operations
#[async_trait]
pub trait SourceHealthServiceTrait: Send + Sync {
    /// Fetch the current health of every lead source. Nothing is cached.
    async fn refresh(&self) -> Result<SourceHealthReport>;
}
