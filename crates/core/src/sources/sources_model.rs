//! Lead source health models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ingestion status of one lead source (form, webhook, ads platform...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceHealth {
    pub source: String,
    #[serde(default)]
    pub last_event_at: Option<DateTime<Utc>>,
    pub is_healthy: bool,
    #[serde(default)]
    pub last_error: Option<String>,
    #[serde(default)]
    pub last_error_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_leads: u64,
    #[serde(default)]
    pub today_leads: u64,
}

/// One refresh of the source health panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceHealthReport {
    pub sources: Vec<SourceHealth>,
    pub healthy_count: usize,
    pub total_leads: u64,
    pub today_leads: u64,
}

impl SourceHealthReport {
    /// Builds a report, unhealthy sources first, then by name.
    pub fn from_sources(mut sources: Vec<SourceHealth>) -> Self {
        sources.sort_by(|a, b| {
            a.is_healthy
                .cmp(&b.is_healthy)
                .then_with(|| a.source.cmp(&b.source))
        });
        Self {
            healthy_count: sources.iter().filter(|s| s.is_healthy).count(),
            total_leads: sources.iter().map(|s| s.total_leads).sum(),
            today_leads: sources.iter().map(|s| s.today_leads).sum(),
            sources,
        }
    }

    pub fn unhealthy(&self) -> impl Iterator<Item = &SourceHealth> {
        self.sources.iter().filter(|s| !s.is_healthy)
    }

    pub fn all_healthy(&self) -> bool {
        self.healthy_count == self.sources.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str, healthy: bool, total: u64, today: u64) -> SourceHealth {
        SourceHealth {
            source: name.to_string(),
            last_event_at: None,
            is_healthy: healthy,
            last_error: None,
            last_error_at: None,
            total_leads: total,
            today_leads: today,
        }
    }

    #[test]
    fn test_deserialize_source_health() {
        let json = r#"{
            "source": "facebook_lead_ads",
            "lastEventAt": "2026-03-01T08:59:00Z",
            "isHealthy": false,
            "lastError": "Webhook signature mismatch",
            "lastErrorAt": "2026-03-01T09:00:00Z",
            "totalLeads": 1200,
            "todayLeads": 14
        }"#;

        let health: SourceHealth = serde_json::from_str(json).unwrap();

        assert!(!health.is_healthy);
        assert_eq!(health.last_error.as_deref(), Some("Webhook signature mismatch"));
        assert_eq!(health.today_leads, 14);
    }

    #[test]
    fn test_report_orders_unhealthy_first_and_sums() {
        let report = SourceHealthReport::from_sources(vec![
            source("website", true, 300, 5),
            source("zapier", false, 20, 0),
            source("csv", true, 80, 2),
        ]);

        let names: Vec<&str> = report.sources.iter().map(|s| s.source.as_str()).collect();
        assert_eq!(names, vec!["zapier", "csv", "website"]);
        assert_eq!(report.healthy_count, 2);
        assert_eq!(report.total_leads, 400);
        assert_eq!(report.today_leads, 7);
        assert_eq!(report.unhealthy().count(), 1);
        assert!(!report.all_healthy());
    }

    #[test]
    fn test_empty_report_is_healthy() {
        let report = SourceHealthReport::from_sources(vec![]);
        assert!(report.all_healthy());
        assert_eq!(report.total_leads, 0);
    }
}
