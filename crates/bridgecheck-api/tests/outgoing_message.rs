//! End-to-end tests for the `outgoing-message` API scenario
//!
//! An axum server stands in for the bridge's API gateway so each test can
//! choose the status code, latency and captured payload.

use std::io::Write;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use bridgecheck_api::{registry, ApiConfig, ApiTransport};
use bridgecheck_core::{Harness, HarnessConfig, Invocation, Outcome, EXIT_FAILURE, EXIT_SUCCESS};
use serde_json::Value;
use tokio::sync::mpsc;

#[derive(Clone)]
struct FakeBridge {
    status: StatusCode,
    delay: Duration,
    seen: mpsc::UnboundedSender<(HeaderMap, Value)>,
}

async fn receive_message(
    State(bridge): State<FakeBridge>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    let _ = bridge.seen.send((headers, body));
    tokio::time::sleep(bridge.delay).await;
    let reply = if bridge.status == StatusCode::OK {
        String::new()
    } else {
        "gateway test not found".to_string()
    };
    (bridge.status, reply)
}

async fn spawn_bridge(
    status: StatusCode,
    delay: Duration,
) -> anyhow::Result<(SocketAddr, mpsc::UnboundedReceiver<(HeaderMap, Value)>)> {
    let (seen, received) = mpsc::unbounded_channel();
    let app = Router::new()
        .route("/api/message", post(receive_message))
        .with_state(FakeBridge { status, delay, seen });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((addr, received))
}

fn config_for(addr: SocketAddr) -> HarnessConfig<ApiConfig> {
    let mut config = HarnessConfig::<ApiConfig>::default();
    config.transport.base_url = format!("http://{}/api", addr);
    config
}

fn outgoing(timeout: Duration) -> Invocation {
    Invocation {
        scenario: "outgoing-message".to_string(),
        timeout,
    }
}

fn harness() -> Harness<ApiTransport> {
    Harness::new(registry().expect("registry should build"))
}

#[tokio::test]
async fn test_accepted_message_passes() {
    let (addr, mut received) = spawn_bridge(StatusCode::OK, Duration::ZERO).await.unwrap();

    let outcome = harness()
        .execute(&outgoing(Duration::from_secs(5)), &config_for(addr))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(outcome.summary("outgoing-message"), "OK: Scenario outgoing-message");

    let (headers, body) = received.recv().await.expect("bridge should see one message");
    assert_eq!(headers["content-type"], "application/json");
    assert!(headers.get("authorization").is_none());
    assert_eq!(body["text"], "outgoing-message-test");
    assert_eq!(body["channel"], "testchannel");
    assert_eq!(body["username"], "apitest");
    assert_eq!(body["userid"], "apitest_id");
    assert_eq!(body["account"], "api.test");
    assert_eq!(body["protocol"], "api");
    assert_eq!(body["gateway"], "test");
    assert_eq!(body["timestamp"], "2019-01-09T22:53:51.618575236+01:00");
    for field in ["avatar", "event", "parent_id", "id", "extra"] {
        assert!(body.get(field).is_some(), "missing field {}", field);
    }
}

#[tokio::test]
async fn test_server_error_fails_with_body() {
    let (addr, _received) = spawn_bridge(StatusCode::INTERNAL_SERVER_ERROR, Duration::ZERO)
        .await
        .unwrap();

    let outcome = harness()
        .execute(&outgoing(Duration::from_secs(5)), &config_for(addr))
        .await
        .unwrap();

    match &outcome {
        Outcome::Failure(reason) => {
            assert!(reason.contains("Failed to POST message to the API"));
            assert!(reason.contains("500"));
            assert!(reason.contains("gateway test not found"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(outcome.exit_code(), EXIT_FAILURE);
}

#[tokio::test]
async fn test_slow_bridge_times_out() {
    let (addr, _received) = spawn_bridge(StatusCode::OK, Duration::from_secs(30)).await.unwrap();

    let outcome = harness()
        .execute(&outgoing(Duration::from_millis(300)), &config_for(addr))
        .await
        .unwrap();

    assert!(outcome.is_timeout());
    assert_eq!(outcome.exit_code(), EXIT_FAILURE);
}

#[tokio::test]
async fn test_unreachable_bridge_fails() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let outcome = harness()
        .execute(&outgoing(Duration::from_secs(5)), &config_for(addr))
        .await
        .unwrap();

    assert!(matches!(outcome, Outcome::Failure(_)));
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let (addr, mut received) = spawn_bridge(StatusCode::OK, Duration::ZERO).await.unwrap();
    let mut config = config_for(addr);
    config.transport.token = Some("s3cret".to_string());

    let outcome = harness()
        .execute(&outgoing(Duration::from_secs(5)), &config)
        .await
        .unwrap();

    assert!(outcome.is_success());
    let (headers, _) = received.recv().await.unwrap();
    assert_eq!(headers["authorization"], "Bearer s3cret");
}

#[tokio::test]
async fn test_exit_code_through_command_line() {
    let (addr, _received) = spawn_bridge(StatusCode::OK, Duration::ZERO).await.unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[transport]\nbase_url = \"http://{}/api\"", addr).unwrap();
    let path = file.path().to_string_lossy().into_owned();

    let code = harness()
        .run_from_args(["bridgecheck-api", "--config", path.as_str(), "outgoing-message", "5"])
        .await;
    assert_eq!(code, EXIT_SUCCESS);

    let code = harness()
        .run_from_args(["bridgecheck-api", "--config", path.as_str(), "outgoing-message", "abc"])
        .await;
    assert_eq!(code, EXIT_FAILURE);
}
