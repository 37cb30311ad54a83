//! SDK tests against mocked API and JSON-RPC servers

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use agentmarket_sdk::{
    JsonRpcWallet, MarketClient, PaymentGateway, RunAgent, SdkError, Session,
};

const MARKETPLACE: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
const BUYER: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";

fn agent_json(id: &str, active: bool) -> Value {
    json!({
        "id": id,
        "contractId": 2,
        "owner": "0xowner",
        "name": "Reviewer",
        "description": "Reviews code",
        "agentType": "code",
        "price": "0.01",
        "metadata": {},
        "active": active,
        "earnings": "0",
        "totalSales": 0,
        "rating": 4.5,
        "ratingCount": 2,
        "createdAt": "2025-01-01T00:00:00Z",
        "updatedAt": "2025-01-01T00:00:00Z"
    })
}

fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": result}))
}

fn mined_receipt(tx_hash: &str, status: &str) -> Value {
    json!({
        "transactionHash": tx_hash,
        "blockNumber": "0x10",
        "gasUsed": "0x5208",
        "status": status
    })
}

// =============================================================================
// HTTP client
// =============================================================================

#[tokio::test]
async fn test_list_agents_with_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/agents"))
        .and(query_param("type", "code"))
        .and(query_param("owner", "0xowner"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "agents": [agent_json("a1", true)],
            "count": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = MarketClient::new(&server.uri()).unwrap();
    let agents = client.list_agents(Some("code"), Some("0xowner")).await.unwrap();

    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].id, "a1");
    assert_eq!(agents[0].rating, 4.5);
}

#[tokio::test]
async fn test_missing_agent_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/agent/nope"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"success": false, "error": "Agent not found"})),
        )
        .mount(&server)
        .await;

    let client = MarketClient::new(&server.uri()).unwrap();
    let err = client.get_agent("nope").await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "API error: 404 - Agent not found");
}

#[tokio::test]
async fn test_run_failure_results_are_values() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/agent/run"))
        .and(body_partial_json(json!({"agentType": "legal"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "error": "Invalid agent type",
            "agentType": "legal"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/agent/run"))
        .and(body_partial_json(json!({"agentType": "code"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "error": "Invalid request data",
            "details": [{"field": "prompt", "message": "must be 10-10000 characters"}]
        })))
        .mount(&server)
        .await;

    let client = MarketClient::new(&server.uri()).unwrap();

    let result = client
        .run_agent(&RunAgent::new("legal", "Draft a lease agreement"))
        .await
        .unwrap();
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Invalid agent type"));

    let err = client.run_agent(&RunAgent::new("code", "short")).await.unwrap_err();
    match err {
        SdkError::Api { status, message } => {
            assert_eq!(status, 400);
            assert!(message.contains("prompt: must be 10-10000 characters"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_rate_and_stats() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/agent/a1/rate"))
        .and(body_partial_json(json!({"rating": 4.0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "rating": 4.0, "ratingCount": 1
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "stats": {"totalAgents": 3, "totalUsers": 2, "totalTransactions": 5, "totalVolume": "0.05"}
        })))
        .mount(&server)
        .await;

    let client = MarketClient::new(&server.uri()).unwrap();

    let rating = client.rate_agent("a1", 4.0).await.unwrap();
    assert_eq!(rating.rating, 4.0);
    assert_eq!(rating.rating_count, 1);

    let stats = client.stats().await.unwrap();
    assert_eq!(stats.total_transactions, 5);
    assert_eq!(stats.total_volume, "0.05");
}

#[tokio::test]
async fn test_unhealthy_service_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "status": "unhealthy",
            "version": "0.1.0",
            "timestamp": "2025-01-01T00:00:00Z",
            "uptimeSecs": 12,
            "services": {"database": "disconnected", "ai": "connected"}
        })))
        .mount(&server)
        .await;

    let client = MarketClient::new(&server.uri()).unwrap();
    let health = client.health().await.unwrap();

    assert!(!health.is_healthy());
    assert_eq!(health.services.database, "disconnected");
}

// =============================================================================
// Wallet
// =============================================================================

#[tokio::test]
async fn test_connect_uses_first_account() {
    let node = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_accounts"})))
        .respond_with(rpc_result(json!(["0x70997970C51812dc3A010C7d01b50e0d17dc79C8"])))
        .mount(&node)
        .await;

    let wallet = JsonRpcWallet::connect(&node.uri(), MARKETPLACE).await.unwrap();
    assert_eq!(wallet.address(), BUYER);
}

#[tokio::test]
async fn test_connect_without_accounts() {
    let node = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_accounts"})))
        .respond_with(rpc_result(json!([])))
        .mount(&node)
        .await;

    let err = JsonRpcWallet::connect(&node.uri(), MARKETPLACE).await.err().unwrap();
    assert!(matches!(err, SdkError::WalletNotConnected));
}

#[tokio::test]
async fn test_submit_payment_encodes_call() {
    let node = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "eth_sendTransaction",
            "params": [{
                "from": BUYER,
                "to": MARKETPLACE,
                "value": "0x2386f26fc10000",
                "data": "0x0b1725700000000000000000000000000000000000000000000000000000000000000002"
            }]
        })))
        .respond_with(rpc_result(json!("0xabc123")))
        .expect(1)
        .mount(&node)
        .await;

    let wallet = JsonRpcWallet::new(&node.uri(), BUYER, MARKETPLACE).unwrap();
    let tx_hash = wallet.submit_payment(2, 10_000_000_000_000_000).await.unwrap();
    assert_eq!(tx_hash, "0xabc123");
}

#[tokio::test]
async fn test_rpc_error_surfaces() {
    let node = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32000, "message": "insufficient funds for gas * price + value"}
        })))
        .mount(&node)
        .await;

    let wallet = JsonRpcWallet::new(&node.uri(), BUYER, MARKETPLACE).unwrap();
    let err = wallet.submit_payment(2, 1).await.unwrap_err();
    match err {
        SdkError::Rpc { code, message } => {
            assert_eq!(code, -32000);
            assert!(message.starts_with("insufficient funds"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_receipt_polled_until_mined() {
    let node = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_getTransactionReceipt"})))
        .respond_with(rpc_result(Value::Null))
        .up_to_n_times(2)
        .mount(&node)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_getTransactionReceipt"})))
        .respond_with(rpc_result(mined_receipt("0xabc123", "0x1")))
        .mount(&node)
        .await;

    let wallet = JsonRpcWallet::new(&node.uri(), BUYER, MARKETPLACE)
        .unwrap()
        .with_poll_interval(Duration::from_millis(10));
    let receipt = wallet.wait_for_receipt("0xabc123").await.unwrap();

    assert_eq!(receipt.block_number, Some(16));
    assert_eq!(receipt.gas_used, Some(21000));
}

#[tokio::test]
async fn test_reverted_payment() {
    let node = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_getTransactionReceipt"})))
        .respond_with(rpc_result(mined_receipt("0xdead", "0x0")))
        .mount(&node)
        .await;

    let wallet = JsonRpcWallet::new(&node.uri(), BUYER, MARKETPLACE).unwrap();
    let err = wallet.wait_for_receipt("0xdead").await.unwrap_err();
    assert!(matches!(err, SdkError::PaymentReverted(hash) if hash == "0xdead"));
}

#[tokio::test]
async fn test_unconfirmed_payment_times_out() {
    let node = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_result(Value::Null))
        .mount(&node)
        .await;

    let wallet = JsonRpcWallet::new(&node.uri(), BUYER, MARKETPLACE)
        .unwrap()
        .with_poll_interval(Duration::from_millis(10))
        .with_confirmation_timeout(Duration::from_millis(50));
    let err = wallet.wait_for_receipt("0xslow").await.unwrap_err();
    assert!(matches!(err, SdkError::PaymentTimeout { .. }));
}

// =============================================================================
// Purchase flow
// =============================================================================

fn sample_agent(active: bool) -> agentmarket_sdk::Agent {
    serde_json::from_value(agent_json("a1", active)).unwrap()
}

#[tokio::test]
async fn test_purchase_requires_wallet() {
    let session = Session::new(MarketClient::new("http://localhost:1").unwrap());
    let err = session
        .purchase_and_run(&sample_agent(true), "Review this function")
        .await
        .unwrap_err();

    assert!(matches!(err, SdkError::WalletNotConnected));
    assert_eq!(err.to_string(), "Please connect your wallet");
}

#[tokio::test]
async fn test_purchase_and_run() {
    let node = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_sendTransaction"})))
        .respond_with(rpc_result(json!("0xfeed")))
        .mount(&node)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_getTransactionReceipt"})))
        .respond_with(rpc_result(mined_receipt("0xfeed", "0x1")))
        .mount(&node)
        .await;

    let api = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/agent/run"))
        .and(body_partial_json(json!({
            "agentType": "code",
            "agentId": "a1",
            "buyer": BUYER,
            "txHash": "0xfeed",
            "amount": "0.01"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": "Looks good",
            "agentType": "code",
            "tokensUsed": 42
        })))
        .expect(1)
        .mount(&api)
        .await;

    let mut session = Session::new(MarketClient::new(&api.uri()).unwrap());
    session.connect_wallet(Arc::new(
        JsonRpcWallet::new(&node.uri(), BUYER, MARKETPLACE).unwrap(),
    ));
    assert_eq!(session.address(), Some(BUYER));

    let purchase = session
        .purchase_and_run(&sample_agent(true), "Review this function")
        .await
        .unwrap();

    assert_eq!(purchase.receipt.tx_hash, "0xfeed");
    assert_eq!(purchase.result.result.as_deref(), Some("Looks good"));
}

#[tokio::test]
async fn test_reverted_payment_never_runs_agent() {
    let node = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_sendTransaction"})))
        .respond_with(rpc_result(json!("0xfeed")))
        .mount(&node)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "eth_getTransactionReceipt"})))
        .respond_with(rpc_result(mined_receipt("0xfeed", "0x0")))
        .mount(&node)
        .await;

    let api = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/agent/run"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&api)
        .await;

    let mut session = Session::new(MarketClient::new(&api.uri()).unwrap());
    session.connect_wallet(Arc::new(
        JsonRpcWallet::new(&node.uri(), BUYER, MARKETPLACE).unwrap(),
    ));

    let err = session
        .purchase_and_run(&sample_agent(true), "Review this function")
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::PaymentReverted(_)));
}

#[tokio::test]
async fn test_inactive_agent_cannot_be_bought() {
    let mut session = Session::new(MarketClient::new("http://localhost:1").unwrap());
    session.connect_wallet(Arc::new(
        JsonRpcWallet::new("http://localhost:1", BUYER, MARKETPLACE).unwrap(),
    ));

    let err = session
        .purchase_and_run(&sample_agent(false), "Review this function")
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::AgentInactive));
}
