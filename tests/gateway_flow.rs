//! End-to-end tests for the gateway: admission decisions, parameter
//! sanitization, quota headers, and upstream relay against a mock node.

use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;

use rpc_gateway::config::schema::{GatewayConfig, UserConfig};
use rpc_gateway::http::HttpServer;

mod common;

const NODE_RESPONSE: &str = r#"{"balance":"325586539664609129644855132177"}"#;

fn base_config(upstream: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.upstream.url = format!("http://{upstream}");
    config.actions.public = vec![
        "account_balance".to_string(),
        "accounts_balances".to_string(),
    ];
    config.actions.max_count = HashMap::from([("account_balance".to_string(), 50)]);
    config.actions.max_accounts = HashMap::from([("accounts_balances".to_string(), 3)]);
    config.users = vec![UserConfig {
        token: "valid-token".to_string(),
        extra_actions: vec!["account_history".to_string()],
    }];
    config
}

async fn start_gateway(config: GatewayConfig) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).expect("gateway construction failed");
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });
    addr
}

fn api_url(gateway: SocketAddr) -> String {
    format!("http://{gateway}/api")
}

#[tokio::test]
async fn missing_action_is_rejected_without_reaching_upstream() {
    let (node, seen) = common::start_mock_node(NODE_RESPONSE).await;
    let gateway = start_gateway(base_config(node)).await;

    let res = reqwest::Client::new()
        .post(api_url(gateway))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 422);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Action field is required");
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn anonymous_request_is_forwarded_with_quota_headers() {
    let (node, seen) = common::start_mock_node(NODE_RESPONSE).await;
    let gateway = start_gateway(base_config(node)).await;

    let res = reqwest::Client::new()
        .post(api_url(gateway))
        .json(&json!({"action": "account_balance", "account": "xrb_1abc"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["x-ratelimit-limit"], "100");
    assert_eq!(res.headers()["x-ratelimit-remaining"], "99");

    let body: Value = res.json().await.unwrap();
    assert_eq!(body, serde_json::from_str::<Value>(NODE_RESPONSE).unwrap());

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0]["action"], "account_balance");
    assert_eq!(seen[0]["account"], "xrb_1abc");
}

#[tokio::test]
async fn unknown_credential_is_rejected_regardless_of_quota() {
    let (node, seen) = common::start_mock_node(NODE_RESPONSE).await;
    let gateway = start_gateway(base_config(node)).await;

    let res = reqwest::Client::new()
        .post(api_url(gateway))
        .header("Authorization", "typo-token")
        .json(&json!({"action": "account_balance"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 403);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Invalid authorization token provided.");
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn authenticated_extra_action_skips_the_quota() {
    let (node, _seen) = common::start_mock_node(NODE_RESPONSE).await;
    let mut config = base_config(node);
    config.rate_limit.requests_limit = 2;
    let gateway = start_gateway(config).await;
    let client = reqwest::Client::new();

    // Far more requests than the quota would allow anonymously.
    for _ in 0..5 {
        let res = client
            .post(api_url(gateway))
            .header("Authorization", "valid-token")
            .json(&json!({"action": "account_history", "account": "xrb_1abc"}))
            .send()
            .await
            .unwrap();

        assert_eq!(res.status(), 200);
        assert!(!res.headers().contains_key("x-ratelimit-remaining"));
    }

    // The anonymous quota for this IP is still intact.
    let res = client
        .post(api_url(gateway))
        .json(&json!({"action": "account_balance"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
}

#[tokio::test]
async fn quota_exhaustion_returns_429_with_retry_guidance() {
    let (node, _seen) = common::start_mock_node(NODE_RESPONSE).await;
    let mut config = base_config(node);
    config.rate_limit.requests_limit = 2;
    let gateway = start_gateway(config).await;
    let client = reqwest::Client::new();

    for _ in 0..2 {
        let res = client
            .post(api_url(gateway))
            .json(&json!({"action": "account_balance"}))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
    }

    let res = client
        .post(api_url(gateway))
        .json(&json!({"action": "account_balance"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 429);
    assert_eq!(res.headers()["x-ratelimit-remaining"], "0");
    assert_eq!(res.headers()["x-ratelimit-limit"], "2");
    assert!(res.headers().contains_key("retry-after"));
    assert!(res.headers().contains_key("x-ratelimit-reset"));

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Too Many Requests");
}

#[tokio::test]
async fn oversized_count_is_clamped_before_forwarding() {
    let (node, seen) = common::start_mock_node(NODE_RESPONSE).await;
    let gateway = start_gateway(base_config(node)).await;

    let res = reqwest::Client::new()
        .post(api_url(gateway))
        .json(&json!({"action": "account_balance", "count": 10_000}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let seen = seen.lock().unwrap();
    assert_eq!(seen[0]["count"], json!(50));
}

#[tokio::test]
async fn query_string_counts_are_clamped_as_strings() {
    let (node, seen) = common::start_mock_node(NODE_RESPONSE).await;
    let gateway = start_gateway(base_config(node)).await;

    let res = reqwest::Client::new()
        .get(format!(
            "{}?action=account_balance&count=10000",
            api_url(gateway)
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let seen = seen.lock().unwrap();
    assert_eq!(seen[0]["count"], json!("50"));
}

#[tokio::test]
async fn accounts_list_is_truncated_before_forwarding() {
    let (node, seen) = common::start_mock_node(NODE_RESPONSE).await;
    let gateway = start_gateway(base_config(node)).await;

    let res = reqwest::Client::new()
        .post(api_url(gateway))
        .json(&json!({
            "action": "accounts_balances",
            "accounts": ["a", "b", "c", "d", "e"]
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let seen = seen.lock().unwrap();
    assert_eq!(seen[0]["accounts"], json!(["a", "b", "c"]));
}

#[tokio::test]
async fn disallowed_action_is_rejected() {
    let (node, seen) = common::start_mock_node(NODE_RESPONSE).await;
    let gateway = start_gateway(base_config(node)).await;

    let res = reqwest::Client::new()
        .post(api_url(gateway))
        .json(&json!({"action": "process"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 403);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Action is not allowed");
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn privileged_ip_is_never_rate_limited() {
    let (node, _seen) = common::start_mock_node(NODE_RESPONSE).await;
    let mut config = base_config(node);
    config.rate_limit.requests_limit = 1;
    config.privileged_ips = vec!["127.0.0.1".to_string()];
    let gateway = start_gateway(config).await;
    let client = reqwest::Client::new();

    for _ in 0..3 {
        let res = client
            .post(api_url(gateway))
            .json(&json!({"action": "account_balance"}))
            .send()
            .await
            .unwrap();

        assert_eq!(res.status(), 200);
        assert!(!res.headers().contains_key("x-ratelimit-remaining"));
    }
}

#[tokio::test]
async fn upstream_failure_maps_to_503() {
    // Reserve a port, then drop the listener so nothing answers there.
    let unused = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = unused.local_addr().unwrap();
    drop(unused);

    let gateway = start_gateway(base_config(dead_addr)).await;

    let res = reqwest::Client::new()
        .post(api_url(gateway))
        .json(&json!({"action": "account_balance"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 503);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Something wrong happened, maybe the upstream node is currently down"
    );
}

#[tokio::test]
async fn root_returns_hint_to_the_api_route() {
    let (node, _seen) = common::start_mock_node(NODE_RESPONSE).await;
    let gateway = start_gateway(base_config(node)).await;

    let res = reqwest::Client::new()
        .get(format!("http://{gateway}/"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body["message"],
        "RPC requests are supposed to be sent to /api"
    );
}
