//! HTTP client for the Leadflow backend API.
//!
//! One client serves every gateway trait the core crate defines, so the CLI
//! (or any other front end) only has to build it once.

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use std::time::Duration;

use leadflow_core::campaigns::{Campaign, CampaignApiTrait, PlatformConnection, PreflightResult};
use leadflow_core::errors::{Error, Result};
use leadflow_core::imports::{
    ColumnMapping, CsvPreview, ImportBatch, ImportCommitResult, LeadImportApiTrait, UploadFile,
};
use leadflow_core::sources::{SourceHealth, SourceHealthApiTrait};

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default base URL of the backend.
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

const CSV_MIME: &str = "text/csv";

// ─────────────────────────────────────────────────────────────────────────────
// API Response Types (internal, for unwrapping backend envelopes)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, serde::Deserialize)]
struct ApiHistoryResponse {
    #[serde(default)]
    batches: Vec<ImportBatch>,
}

#[derive(Debug, serde::Deserialize)]
struct ApiSourceHealthResponse {
    #[serde(default)]
    sources: Vec<SourceHealth>,
}

/// List endpoints answer either `{ "<key>": [...] }` or a bare array.
#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum ApiCampaignsResponse {
    Wrapped { campaigns: Vec<Campaign> },
    Bare(Vec<Campaign>),
}

#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum ApiConnectionsResponse {
    Wrapped { connections: Vec<PlatformConnection> },
    Bare(Vec<PlatformConnection>),
}

#[derive(Debug, serde::Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Leadflow API Client
// ─────────────────────────────────────────────────────────────────────────────

/// HTTP client for the Leadflow backend.
///
/// Implements [`LeadImportApiTrait`], [`CampaignApiTrait`] and
/// [`SourceHealthApiTrait`]. Requests are never retried.
///
/// ```ignore
/// let client = LeadflowApiClient::new("http://localhost:3000", None, Duration::from_secs(30))?;
/// let batches = client.list_import_batches("owner-1").await?;
/// ```
#[derive(Debug, Clone)]
pub struct LeadflowApiClient {
    client: reqwest::Client,
    base_url: String,
    auth_header: Option<HeaderValue>,
}

impl LeadflowApiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be used as a header value or the
    /// HTTP client cannot be initialized.
    pub fn new(base_url: &str, access_token: Option<&str>, timeout: Duration) -> Result<Self> {
        let auth_header = access_token
            .filter(|t| !t.trim().is_empty())
            .map(|t| {
                HeaderValue::from_str(&format!("Bearer {}", t.trim()))
                    .map_err(|e| Error::InvalidConfigValue(format!("Invalid API token: {}", e)))
            })
            .transpose()?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Unexpected(format!("Failed to initialize HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(auth) = &self.auth_header {
            headers.insert(AUTHORIZATION, auth.clone());
        }
        headers
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn owner_query(path: &str, owner_uid: &str) -> String {
        format!("{}?ownerUid={}", path, urlencoding::encode(owner_uid))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!("[LeadflowApi] GET {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers())
            .send()
            .await
            .map_err(transport_error)?;

        self.parse_response(response).await
    }

    /// POST without a body; returns the raw response text.
    async fn post_empty(&self, path: &str) -> Result<String> {
        let url = self.url(path);
        debug!("[LeadflowApi] POST {}", url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .send()
            .await
            .map_err(transport_error)?;

        self.read_body(response).await
    }

    async fn post_multipart<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T> {
        let url = self.url(path);
        debug!("[LeadflowApi] POST {} (multipart)", url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;

        self.parse_response(response).await
    }

    /// Parse an HTTP response, handling errors appropriately.
    async fn parse_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let body = self.read_body(response).await?;
        serde_json::from_str(&body).map_err(|e| {
            Error::Unexpected(format!(
                "Failed to parse response: {} - {}",
                e,
                body.chars().take(200).collect::<String>()
            ))
        })
    }

    /// Reads the body of a 2xx response; maps any other status to [`Error::Api`].
    async fn read_body(&self, response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            debug!("[LeadflowApi] HTTP {}: {}", status, body);
            return Err(api_error(status.as_u16(), &body));
        }
        Ok(body)
    }

    fn file_part(file: &UploadFile) -> Result<Part> {
        Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(CSV_MIME)
            .map_err(|e| Error::Unexpected(format!("Invalid upload part: {}", e)))
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    Error::Transport(err.to_string())
}

/// Builds the error for a non-2xx response. The backend message is kept verbatim.
fn api_error(status: u16, body: &str) -> Error {
    let message = serde_json::from_str::<ApiErrorResponse>(body)
        .ok()
        .and_then(|err| err.message.or(err.error))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            let snippet: String = body.trim().chars().take(200).collect();
            if snippet.is_empty() {
                format!("HTTP {}", status)
            } else {
                snippet
            }
        });
    Error::api(status, message)
}

/// Pulls a campaign out of an action response.
///
/// Accepts `{ "campaign": {...} }`, a bare campaign, or anything else
/// (`{ "success": true }`, empty body) as "no campaign returned".
fn campaign_from_body(body: &str) -> Option<Campaign> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let candidate = value.get("campaign").cloned().unwrap_or(value);
    serde_json::from_value(candidate).ok()
}

// ─────────────────────────────────────────────────────────────────────────────
// Gateway Trait Implementations
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl LeadImportApiTrait for LeadflowApiClient {
    async fn preview_csv(&self, owner_uid: &str, file: &UploadFile) -> Result<CsvPreview> {
        let form = Form::new()
            .part("file", Self::file_part(file)?)
            .text("ownerUid", owner_uid.to_string());
        self.post_multipart("/api/leads/csv-preview", form).await
    }

    async fn import_csv(
        &self,
        owner_uid: &str,
        file: &UploadFile,
        mapping: &ColumnMapping,
    ) -> Result<ImportCommitResult> {
        let form = Form::new()
            .part("file", Self::file_part(file)?)
            .text("ownerUid", owner_uid.to_string())
            .text("columnMapping", mapping.to_json_string()?);
        self.post_multipart("/api/leads/csv-import", form).await
    }

    async fn list_import_batches(&self, owner_uid: &str) -> Result<Vec<ImportBatch>> {
        let response: ApiHistoryResponse = self
            .get(&Self::owner_query("/api/leads/import-history", owner_uid))
            .await?;
        Ok(response.batches)
    }
}

#[async_trait]
impl CampaignApiTrait for LeadflowApiClient {
    async fn list_campaigns(&self, owner_uid: &str) -> Result<Vec<Campaign>> {
        let response: ApiCampaignsResponse = self
            .get(&Self::owner_query("/api/campaigns", owner_uid))
            .await?;
        Ok(match response {
            ApiCampaignsResponse::Wrapped { campaigns } => campaigns,
            ApiCampaignsResponse::Bare(campaigns) => campaigns,
        })
    }

    async fn list_connections(&self, owner_uid: &str) -> Result<Vec<PlatformConnection>> {
        let response: ApiConnectionsResponse = self
            .get(&Self::owner_query("/api/connections", owner_uid))
            .await?;
        Ok(match response {
            ApiConnectionsResponse::Wrapped { connections } => connections,
            ApiConnectionsResponse::Bare(connections) => connections,
        })
    }

    async fn preflight_check(&self, campaign_id: &str) -> Result<PreflightResult> {
        let path = format!(
            "/api/campaigns/{}/preflight-check",
            urlencoding::encode(campaign_id)
        );
        let body = self.post_empty(&path).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn activate(&self, campaign_id: &str) -> Result<Option<Campaign>> {
        let path = format!("/api/campaigns/{}/activate", urlencoding::encode(campaign_id));
        let body = self.post_empty(&path).await?;
        Ok(campaign_from_body(&body))
    }

    async fn pause(&self, campaign_id: &str) -> Result<Option<Campaign>> {
        let path = format!("/api/campaigns/{}/pause", urlencoding::encode(campaign_id));
        let body = self.post_empty(&path).await?;
        Ok(campaign_from_body(&body))
    }

    async fn duplicate(&self, campaign_id: &str) -> Result<Campaign> {
        let path = format!(
            "/api/campaigns/{}/duplicate",
            urlencoding::encode(campaign_id)
        );
        let body = self.post_empty(&path).await?;
        campaign_from_body(&body).ok_or_else(|| {
            Error::Unexpected(format!(
                "Duplicate of campaign {} returned no campaign",
                campaign_id
            ))
        })
    }
}

#[async_trait]
impl SourceHealthApiTrait for LeadflowApiClient {
    async fn get_source_health(&self, owner_uid: &str) -> Result<Vec<SourceHealth>> {
        let response: ApiSourceHealthResponse = self
            .get(&Self::owner_query("/api/leads/source-health", owner_uid))
            .await?;
        Ok(response.sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> LeadflowApiClient {
        LeadflowApiClient::new(DEFAULT_API_URL, None, Duration::from_millis(DEFAULT_TIMEOUT_MS))
            .unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = LeadflowApiClient::new(
            "http://localhost:3000",
            Some("test-token"),
            Duration::from_secs(5),
        );
        assert!(client.is_ok());
        assert!(client.unwrap().auth_header.is_some());
    }

    #[test]
    fn test_blank_token_sends_no_auth_header() {
        let client =
            LeadflowApiClient::new("http://localhost:3000", Some("  "), Duration::from_secs(5))
                .unwrap();
        assert!(!client.headers().contains_key(AUTHORIZATION));
    }

    #[test]
    fn test_invalid_token_is_rejected() {
        let result =
            LeadflowApiClient::new("http://localhost:3000", Some("bad\ntoken"), Duration::from_secs(5));
        assert!(matches!(result, Err(Error::InvalidConfigValue(_))));
    }

    #[test]
    fn test_client_url_normalization() {
        let client =
            LeadflowApiClient::new("http://localhost:3000/", None, Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
    }

    #[test]
    fn test_owner_query_is_encoded() {
        assert_eq!(
            LeadflowApiClient::owner_query("/api/campaigns", "team a&b"),
            "/api/campaigns?ownerUid=team%20a%26b"
        );
        assert_eq!(client().url("/api/x"), "http://localhost:3000/api/x");
    }

    #[test]
    fn test_api_error_prefers_message_then_error() {
        let err = api_error(422, r#"{"error":"Unprocessable","message":"Daily lead quota reached"}"#);
        assert_eq!(err.to_string(), "Daily lead quota reached");

        let err = api_error(400, r#"{"error":"Invalid ownerUid","code":"BAD_OWNER"}"#);
        assert_eq!(err.to_string(), "Invalid ownerUid");

        let err = api_error(502, "Bad Gateway");
        assert!(matches!(err, Error::Api { status: 502, .. }));
        assert_eq!(err.to_string(), "Bad Gateway");

        assert_eq!(api_error(500, "").to_string(), "HTTP 500");
    }

    #[test]
    fn test_campaign_from_body_shapes() {
        let campaign = r#"{"id":"c1","name":"N","platform":"META","status":"ACTIVE"}"#;

        assert_eq!(campaign_from_body(campaign).map(|c| c.id), Some("c1".to_string()));
        assert!(campaign_from_body(&format!(r#"{{"campaign":{}}}"#, campaign)).is_some());
        assert!(campaign_from_body(r#"{"success":true}"#).is_none());
        assert!(campaign_from_body("").is_none());
    }
}
