//! HTTP surface driven in-process with `oneshot`

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use protocol_scanner::api::{create_router, AppState};
use protocol_scanner::providers::ProtocolDirectory;
use protocol_scanner::{Collectors, ScanTelemetry, Scanner, ScannerConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

struct StalledDirectory;

#[async_trait]
impl ProtocolDirectory for StalledDirectory {
    async fn resolve_protocol_slug(&self, _name: &str) -> Option<String> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        None
    }

    fn source_name(&self) -> &'static str {
        "stalled"
    }
}

fn app_with(collectors: Collectors, config: ScannerConfig) -> Router {
    let scanner = Scanner::new(collectors, &config);
    let state = AppState::new(scanner, &config, Arc::new(ScanTelemetry::new()));
    create_router(Arc::new(state))
}

fn simulated_app() -> Router {
    app_with(Collectors::simulated(), ScannerConfig::default())
}

fn scan_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/scan")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoints() {
    for uri in ["/health", "/v1/health"] {
        let response = simulated_app().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "healthy");
        assert_eq!(body["data"]["fetchMode"], "sequential");
    }
}

#[tokio::test]
async fn test_scan_known_protocol() {
    let response = simulated_app()
        .oneshot(scan_request(json!({
            "query": "aave",
            "contractAddress": "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-ratelimit-remaining"));

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["protocolSlug"], "aave");
    assert_eq!(
        body["data"]["contractAddress"],
        "0x7a250d5630b4cf539739df2c5dacb4c659f2488d"
    );
    let report = &body["data"]["report"];
    assert_eq!(report["protocol"], "Aave");
    assert!(report["overallScore"].as_u64().unwrap() <= 100);
    assert!(["HIGH", "MEDIUM", "LOW"].contains(&report["riskLevel"].as_str().unwrap()));
}

#[tokio::test]
async fn test_scan_unresolved_is_not_found() {
    let response = simulated_app()
        .oneshot(scan_request(json!({ "query": "totally-unknown-protocol-xyz" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "SCAN_UNRESOLVED");
    assert_eq!(
        body["error"]["message"],
        "Could not resolve protocol: totally-unknown-protocol-xyz"
    );
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_blank_query_is_bad_request() {
    let response = simulated_app()
        .oneshot(scan_request(json!({ "query": "   " })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "API_BAD_REQUEST");
}

#[tokio::test]
async fn test_scan_deadline_returns_gateway_timeout() {
    let mut collectors = Collectors::simulated();
    collectors.directory = Arc::new(StalledDirectory);
    let config = ScannerConfig {
        scan_timeout: Duration::from_millis(50),
        ..ScannerConfig::default()
    };

    let response = app_with(collectors, config)
        .oneshot(scan_request(json!({ "query": "aave" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "SCAN_TIMEOUT");
}

#[tokio::test]
async fn test_stats_count_scan_outcomes() {
    let app = simulated_app();

    for query in ["lido", "totally-unknown-protocol-xyz"] {
        app.clone()
            .oneshot(scan_request(json!({ "query": query })))
            .await
            .unwrap();
    }

    let response = app.oneshot(get("/v1/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["totalScans"], 2);
    assert_eq!(body["data"]["completed"], 1);
    assert_eq!(body["data"]["failed"], 1);
    assert_eq!(body["data"]["apiVersion"], env!("CARGO_PKG_VERSION"));
}
