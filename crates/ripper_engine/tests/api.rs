use std::collections::BTreeMap;
use std::time::Duration;

use pretty_assertions::assert_eq;
use ripper_engine::{
    ApiClient, ApiSettings, CountResponse, FailureKind, ReqwestApiClient, RipResponse,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ReqwestApiClient {
    ReqwestApiClient::new(ApiSettings {
        base_url: server.uri(),
        ..ApiSettings::default()
    })
    .expect("client")
}

#[tokio::test]
async fn rip_posts_target_and_decodes_links_and_hostnames() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/rip"))
        .and(header("content-type", "application/json"))
        .and(header("accept", "application/json"))
        .and(body_json(serde_json::json!({ "target": "http://example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "links": ["http://example.com/a", "/about"],
            "hostnames": { "example.com": 1, "": 1 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .rip("http://example.com")
        .await
        .expect("rip ok");

    let mut hostnames = BTreeMap::new();
    hostnames.insert("example.com".to_string(), 1);
    hostnames.insert(String::new(), 1);
    assert_eq!(
        response,
        RipResponse {
            links: Some(vec!["http://example.com/a".to_string(), "/about".to_string()]),
            hostnames: Some(hostnames),
        }
    );
}

#[tokio::test]
async fn rip_accepts_missing_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/rip"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "links": [] })),
        )
        .mount(&server)
        .await;

    let response = client_for(&server).rip("http://example.com").await.unwrap();
    assert_eq!(response.links, Some(Vec::new()));
    assert_eq!(response.hostnames, None);
}

#[tokio::test]
async fn failure_status_uses_service_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/rip"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "message": "Please submit a valid, absolute URL such as https://example.com"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).rip("/relative").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(400));
    assert_eq!(
        err.message.as_deref(),
        Some("Please submit a valid, absolute URL such as https://example.com")
    );
}

#[tokio::test]
async fn failure_status_without_json_uses_status_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/count"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Could not get ripCount"))
        .mount(&server)
        .await;

    let err = client_for(&server).usage_count().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
    assert_eq!(err.message.as_deref(), Some("Internal Server Error"));
    assert!(!err.kind.is_transport());
}

#[tokio::test]
async fn unparseable_success_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/rip"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).rip("http://example.com").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::MalformedBody);
    assert_eq!(err.message, None);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/count"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"count": 1234567}"#))
        .mount(&server)
        .await;

    let client = ReqwestApiClient::new(ApiSettings {
        base_url: server.uri(),
        max_bytes: 8,
        ..ApiSettings::default()
    })
    .unwrap();

    let err = client.usage_count().await.unwrap_err();
    assert!(matches!(
        err.kind,
        FailureKind::TooLarge { max_bytes: 8, .. }
    ));
}

#[tokio::test]
async fn oversized_failure_body_still_reports_status_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/rip"))
        .respond_with(ResponseTemplate::new(503).set_body_string("x".repeat(64)))
        .mount(&server)
        .await;

    let client = ReqwestApiClient::new(ApiSettings {
        base_url: server.uri(),
        max_bytes: 16,
        ..ApiSettings::default()
    })
    .unwrap();

    let err = client.rip("http://example.com").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
    assert_eq!(err.message.as_deref(), Some("Service Unavailable"));
}

#[tokio::test]
async fn count_decodes_present_and_absent_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "count": 42 })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(
        client.usage_count().await.unwrap(),
        CountResponse { count: Some(42) }
    );
    assert_eq!(client.usage_count().await.unwrap(), CountResponse { count: None });
}

#[tokio::test]
async fn slow_service_times_out_as_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/rip"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(serde_json::json!({ "links": [] })),
        )
        .mount(&server)
        .await;

    let client = ReqwestApiClient::new(ApiSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(50),
        ..ApiSettings::default()
    })
    .unwrap();

    let err = client.rip("http://example.com").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
    assert!(err.kind.is_transport());
}

#[tokio::test]
async fn unreachable_service_is_a_network_failure() {
    // Bind a port, then release it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ReqwestApiClient::new(ApiSettings {
        base_url: format!("http://{addr}"),
        connect_timeout: Duration::from_secs(2),
        ..ApiSettings::default()
    })
    .unwrap();

    let err = client.usage_count().await.unwrap_err();
    assert!(err.kind.is_transport(), "unexpected kind {:?}", err.kind);
    assert_eq!(err.message, None);
}

#[test]
fn invalid_base_url_is_rejected_up_front() {
    let err = ReqwestApiClient::new(ApiSettings {
        base_url: "localhost:3000/ no".to_string(),
        ..ApiSettings::default()
    })
    .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
