//! HTTP collectors against mock upstreams

use protocol_scanner::providers::{
    AuditRegistry, AuditRegistryClient, ContractExplorer, DefiLlamaClient, EthplorerClient,
    EtherscanClient, HttpFetcher, OnChainAnalytics, ProtocolDirectory, TvlSource,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "0x1f9840a85d5af5bf1d1762f925bdaddc4201f984";

fn fetcher() -> HttpFetcher {
    HttpFetcher::new("test", Duration::from_secs(2), 3).unwrap()
}

#[tokio::test]
async fn test_defillama_directory_is_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/protocols"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "Aave", "slug": "aave", "tvl": 1.0},
            {"name": "Curve DEX", "slug": "curve-dex"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = DefiLlamaClient::new(&server.uri(), fetcher());
    assert_eq!(client.resolve_protocol_slug("aave").await.as_deref(), Some("aave"));
    assert_eq!(
        client.resolve_protocol_slug("Curve DEX").await.as_deref(),
        Some("curve-dex")
    );
    assert!(client.resolve_protocol_slug("unknown").await.is_none());
}

#[tokio::test]
async fn test_defillama_tvl_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/protocol/aave"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Aave",
            "category": "Lending",
            "chains": ["Ethereum", "Polygon", "Arbitrum"],
            "currentChainTvls": {
                "Ethereum": 9000000000.0,
                "Polygon": 500000000.0,
                "Arbitrum": 500000000.0,
                "Ethereum-borrowed": 4000000000.0,
                "borrowed": 4000000000.0
            },
            "tvl": [
                {"date": 1699395200, "totalLiquidityUSD": 12500000000.0},
                {"date": 1699913600, "totalLiquidityUSD": 10500000000.0},
                {"date": 1700000000, "totalLiquidityUSD": 10000000000.0}
            ]
        })))
        .mount(&server)
        .await;

    let client = DefiLlamaClient::new(&server.uri(), fetcher());
    let data = client.get_tvl("aave").await.unwrap();

    assert_eq!(data.protocol_name, "Aave");
    assert_eq!(data.tvl, 10_000_000_000.0);
    assert_eq!(data.chains.len(), 3);
    assert!(!data.chain_tvls.contains_key("borrowed"));
    assert!((data.tvl_change_24h - (-100.0 * 0.5 / 10.5)).abs() < 1e-6);
    assert!((data.tvl_change_7d - (-20.0)).abs() < 1e-6);
}

#[tokio::test]
async fn test_defillama_failure_is_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/protocol/ghost"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;

    let client = DefiLlamaClient::new(&server.uri(), fetcher());
    assert!(client.get_tvl("ghost").await.is_none());
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/protocols"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/protocols"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "Lido", "slug": "lido"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = DefiLlamaClient::new(&server.uri(), fetcher());
    assert_eq!(client.resolve_protocol_slug("lido").await.as_deref(), Some("lido"));
}

#[tokio::test]
async fn test_audit_registry_record_and_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/audits/aave"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "audited": true,
            "auditor": "OpenZeppelin",
            "auditDate": "2024-03-01",
            "securityScore": 88.0,
            "kycVerified": true,
            "findings": [
                {"severity": "major", "title": "Oracle staleness", "resolved": false},
                {"severity": "minor", "title": "Gas", "resolved": false}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/audits/unknown"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = AuditRegistryClient::new(&server.uri(), "secret", fetcher());

    let audit = client.get_audit("Aave").await.unwrap();
    assert!(audit.is_audited);
    assert_eq!(audit.auditor.as_deref(), Some("OpenZeppelin"));
    assert_eq!(audit.unresolved_blocking().count(), 1);

    assert!(client.get_audit("unknown").await.is_none());
}

#[tokio::test]
async fn test_etherscan_contract_info() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("action", "getsourcecode"))
        .and(query_param("chainid", "1"))
        .and(query_param("apikey", "key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "1",
            "message": "OK",
            "result": [{
                "SourceCode": "contract Uni {}",
                "ContractName": "Uni",
                "Proxy": "0",
                "Implementation": ""
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("action", "txlist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "1",
            "message": "OK",
            "result": [{"timeStamp": "1600000000"}]
        })))
        .mount(&server)
        .await;

    let client = EtherscanClient::new(&format!("{}/api", server.uri()), "key", 1, fetcher());
    let info = client.get_contract_info(TOKEN).await.unwrap();

    assert!(info.is_verified);
    assert_eq!(info.contract_name.as_deref(), Some("Uni"));
    assert!(!info.is_proxy);
    // deployed September 2020
    assert!(info.age_in_days > 1_000);
}

async fn mount_verified_source(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("action", "getsourcecode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "1",
            "message": "OK",
            "result": [{
                "SourceCode": "contract Pair {}",
                "ContractName": "Pair",
                "Proxy": "0",
                "Implementation": ""
            }]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_etherscan_unknown_deployment_time_is_absent() {
    let server = MockServer::start().await;
    mount_verified_source(&server).await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("action", "txlist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "0",
            "message": "No transactions found",
            "result": []
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("action", "getcontractcreation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "0",
            "message": "No data found",
            "result": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = EtherscanClient::new(&format!("{}/api", server.uri()), "key", 1, fetcher());
    assert!(client.get_contract_info(TOKEN).await.is_none());
}

#[tokio::test]
async fn test_etherscan_factory_deployment_uses_creation_record() {
    let server = MockServer::start().await;
    mount_verified_source(&server).await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("action", "txlist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "0",
            "message": "No transactions found",
            "result": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("action", "getcontractcreation"))
        .and(query_param("contractaddresses", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "1",
            "message": "OK",
            "result": [{
                "contractAddress": TOKEN,
                "contractCreator": "0x5c69bee701ef814a2b6a3edd4b1652cb9cc5aa6f",
                "txHash": "0x4a53",
                "timestamp": "1600000000"
            }]
        })))
        .mount(&server)
        .await;

    let client = EtherscanClient::new(&format!("{}/api", server.uri()), "key", 1, fetcher());
    let info = client.get_contract_info(TOKEN).await.unwrap();

    assert_eq!(info.contract_name.as_deref(), Some("Pair"));
    // created September 2020
    assert!(info.age_in_days > 1_000);
}

#[tokio::test]
async fn test_etherscan_error_status_is_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "0",
            "message": "NOTOK",
            "result": "Invalid API Key"
        })))
        .mount(&server)
        .await;

    let client = EtherscanClient::new(&format!("{}/api", server.uri()), "bad", 1, fetcher());
    assert!(client.get_contract_info(TOKEN).await.is_none());
}

#[tokio::test]
async fn test_ethplorer_holder_analytics() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/getTokenInfo/{}", TOKEN)))
        .and(query_param("apiKey", "freekey"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "address": TOKEN,
            "holdersCount": 380000,
            "price": {"rate": 7.1, "diff": -3.2}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/getTopTokenHolders/{}", TOKEN)))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "holders": [
                {"address": "0x01", "share": 30.0},
                {"address": "0x02", "share": 12.5},
                {"address": "0x03", "share": 2.5}
            ]
        })))
        .mount(&server)
        .await;

    let client = EthplorerClient::new(&server.uri(), "freekey", fetcher());

    let behavior = client.get_onchain_behavior(TOKEN, "ethereum").await.unwrap();
    assert_eq!(behavior.unique_holders, 380_000);
    assert_eq!(behavior.whale_concentration, 45.0);
    assert!(!behavior.abnormal_activity);

    // other chains are not covered and make no request
    assert!(client.get_onchain_behavior(TOKEN, "polygon").await.is_none());
}
