//! Sources module - health of lead ingestion sources.

mod sources_model;
mod sources_service;
mod sources_traits;

pub use sources_model::{SourceHealth, SourceHealthReport};
pub use sources_service::SourceHealthService;
pub use sources_traits::{SourceHealthApiTrait, SourceHealthServiceTrait};
