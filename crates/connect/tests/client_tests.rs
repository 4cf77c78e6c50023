use std::time::Duration;

use leadflow_connect::LeadflowApiClient;
use leadflow_core::campaigns::{AdPlatform, CampaignApiTrait, CampaignStatus, ConnectionStatus};
use leadflow_core::errors::Error;
use leadflow_core::imports::{ColumnMapping, ImportBatchStatus, LeadImportApiTrait, UploadFile};
use leadflow_core::leads::LeadField;
use leadflow_core::sources::SourceHealthApiTrait;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> LeadflowApiClient {
    LeadflowApiClient::new(&server.uri(), None, Duration::from_secs(5)).unwrap()
}

fn upload() -> UploadFile {
    UploadFile::from_bytes(
        "open-house.csv",
        b"Full Name,E-Mail\nDana Levi,dana@example.com\n".to_vec(),
        1024,
    )
    .unwrap()
}

fn campaign_json(status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "cmp-1",
        "name": "Spring open house",
        "platform": "META",
        "status": status,
        "dailyBudget": 250
    })
}

#[tokio::test]
async fn test_preview_csv_sends_multipart_form() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/leads/csv-preview"))
        .and(body_string_contains("name=\"ownerUid\""))
        .and(body_string_contains("filename=\"open-house.csv\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "headers": ["Full Name", "E-Mail"],
            "rows": [["Dana Levi", "dana@example.com"]],
            "totalRows": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let preview = client(&server)
        .preview_csv("owner-1", &upload())
        .await
        .unwrap();

    assert_eq!(preview.headers, vec!["Full Name", "E-Mail"]);
    assert_eq!(preview.total_rows, 1);
}

#[tokio::test]
async fn test_import_csv_sends_mapping_json() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/leads/csv-import"))
        .and(body_string_contains(
            r#"{"Full Name":"fullName","E-Mail":"email"}"#,
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "batchId": "batch-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mapping: ColumnMapping = vec![
        ("Full Name".to_string(), LeadField::FullName),
        ("E-Mail".to_string(), LeadField::Email),
    ]
    .into_iter()
    .collect();

    let result = client(&server)
        .import_csv("owner-1", &upload(), &mapping)
        .await
        .unwrap();

    assert_eq!(result.resolved_batch_id(), Some("batch-1"));
}

#[tokio::test]
async fn test_error_body_message_is_surfaced_verbatim() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/leads/csv-import"))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "error": "Unprocessable Entity",
            "message": "Daily lead quota reached",
            "code": "QUOTA"
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .import_csv("owner-1", &upload(), &ColumnMapping::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Api { status: 422, .. }));
    assert_eq!(err.to_string(), "Daily lead quota reached");
}

#[tokio::test]
async fn test_import_history_is_scoped_to_owner() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/leads/import-history"))
        .and(query_param("ownerUid", "owner-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "batches": [{
                "id": "batch-1",
                "filename": "open-house.csv",
                "totalRows": 10,
                "processedRows": 4,
                "successCount": 3,
                "errorCount": 1,
                "duplicateCount": 0,
                "status": "PROCESSING",
                "createdAt": "2026-03-01T09:00:00Z",
                "errors": [{"row": 2, "message": "Invalid email"}]
            }]
        })))
        .mount(&server)
        .await;

    let batches = client(&server)
        .list_import_batches("owner-1")
        .await
        .unwrap();

    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].status, ImportBatchStatus::Processing);
    assert_eq!(batches[0].progress_percent(), 40);
    assert_eq!(batches[0].errors[0].row, Some(2));
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/leads/source-health"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "sources": [{
                "source": "website",
                "isHealthy": true,
                "totalLeads": 42,
                "todayLeads": 3
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        LeadflowApiClient::new(&server.uri(), Some("secret-token"), Duration::from_secs(5))
            .unwrap();
    let sources = client.get_source_health("owner-1").await.unwrap();

    assert_eq!(sources.len(), 1);
    assert!(sources[0].is_healthy);
    assert_eq!(sources[0].total_leads, 42);
}

#[tokio::test]
async fn test_list_campaigns_and_connections() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/campaigns"))
        .and(query_param("ownerUid", "owner-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "campaigns": [campaign_json("READY")] })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/connections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"platform": "META", "status": "EXPIRED", "lastError": "Token expired"}
        ])))
        .mount(&server)
        .await;

    let client = client(&server);
    let campaigns = client.list_campaigns("owner-1").await.unwrap();
    let connections = client.list_connections("owner-1").await.unwrap();

    assert_eq!(campaigns[0].status, CampaignStatus::Ready);
    assert_eq!(connections[0].platform, AdPlatform::Meta);
    assert_eq!(connections[0].status, ConnectionStatus::Expired);
}

#[tokio::test]
async fn test_preflight_and_activate_endpoints() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/campaigns/cmp-1/preflight-check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "canActivate": false,
            "issues": ["Budget exceeds account limit"]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/campaigns/cmp-1/activate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/campaigns/cmp-1/pause"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "campaign": campaign_json("PAUSED") })),
        )
        .mount(&server)
        .await;

    let client = client(&server);

    let preflight = client.preflight_check("cmp-1").await.unwrap();
    assert!(!preflight.can_activate);
    assert_eq!(preflight.issues, vec!["Budget exceeds account limit"]);

    assert!(client.activate("cmp-1").await.unwrap().is_none());

    let paused = client.pause("cmp-1").await.unwrap().unwrap();
    assert_eq!(paused.status, CampaignStatus::Paused);
}

#[tokio::test]
async fn test_duplicate_returns_new_campaign() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/campaigns/cmp-1/duplicate"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": "cmp-2",
            "name": "Spring open house (copy)",
            "platform": "META",
            "status": "DRAFT"
        })))
        .mount(&server)
        .await;

    let copy = client(&server).duplicate("cmp-1").await.unwrap();

    assert_eq!(copy.id, "cmp-2");
    assert_eq!(copy.status, CampaignStatus::Draft);
}

#[tokio::test]
async fn test_unreachable_backend_is_a_transport_error() {
    // Bind then release a port so nothing is listening on it
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let uri = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = LeadflowApiClient::new(&uri, None, Duration::from_secs(2)).unwrap();
    let err = client.list_import_batches("owner-1").await.unwrap_err();

    assert!(err.is_transport());
}
