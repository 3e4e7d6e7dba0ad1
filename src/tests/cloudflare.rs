use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::api::models::ApiResponse;
use crate::api::{CloudflareClient, DnsApiClient, RecordBody, RecordType};

#[test]
fn test_record_body_serialization() {
    let body = RecordBody {
        r#type: RecordType::A,
        name: "data.example.com".to_string(),
        content: "203.0.113.5".to_string(),
        ttl: 300,
        proxied: false,
    };

    assert_eq!(
        serde_json::to_value(&body).unwrap(),
        json!({
            "type": "A",
            "name": "data.example.com",
            "content": "203.0.113.5",
            "ttl": 300,
            "proxied": false
        })
    );
}

#[test]
fn test_envelope_tolerates_null_result_and_missing_lists() {
    let parsed: ApiResponse<Vec<serde_json::Value>> =
        serde_json::from_str(r#"{ "success": false, "result": null }"#).unwrap();

    assert!(!parsed.success);
    assert!(parsed.result.is_none());
    assert!(parsed.errors.is_empty());
    assert!(parsed.messages.is_empty());
}

#[test]
fn test_debug_output_hides_token() {
    let client =
        CloudflareClient::new("super-secret-token", Duration::from_secs(5)).unwrap();
    let rendered = format!("{:?}", client);

    assert!(!rendered.contains("super-secret-token"));
    assert!(rendered.contains("api.cloudflare.com"));
}

#[tokio::test]
async fn test_list_records_sends_filters_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones/z1/dns_records"))
        .and(query_param("name", "nodes.example.com"))
        .and(query_param("type", "A"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "errors": [],
            "messages": [],
            "result": [{
                "id": "rec-1",
                "name": "nodes.example.com",
                "type": "A",
                "content": "203.0.113.5",
                "ttl": 1,
                "proxied": true,
                "zone_id": "z1",
                "created_on": "2024-01-01T00:00:00Z"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Trailing slash on the base URL must not produce a double slash.
    let client = CloudflareClient::with_base_url(
        "tok",
        format!("{}/", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap();
    let records = client
        .list_records("z1", "nodes.example.com", RecordType::A)
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "rec-1");
    assert_eq!(records[0].content, "203.0.113.5");
    assert!(records[0].proxied);
    assert_eq!(records[0].ttl, 1);
}
