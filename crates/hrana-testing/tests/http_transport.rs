//! End-to-end tests of the HTTP transport against the mock Hrana server.
//!
//! These tests use the real `reqwest` client over loopback TCP.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use hrana_client::{Client, Config, Error, StreamState};
use hrana_protocol::Value;
use hrana_testing::{MockColumn, MockHranaServer, MockResponse};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

async fn server_with_users() -> MockHranaServer {
    MockHranaServer::builder()
        .with_response(
            "SELECT id, name FROM users",
            MockResponse::rows(
                vec![MockColumn::integer("id"), MockColumn::text("name")],
                vec![
                    vec![Value::Integer(1), Value::Text("Alice".into())],
                    vec![Value::Integer(2), Value::Text("Bob".into())],
                ],
            ),
        )
        .build()
        .await
        .expect("mock server should start")
}

// =============================================================================
// Wire Conformance
// =============================================================================

#[tokio::test]
async fn test_round_trip_over_http() {
    init_tracing();
    let server = server_with_users().await;
    let client = Client::new(Config::new().base_url(server.base_url())).unwrap();
    let mut stream = client.open_stream();

    let result = stream.execute("SELECT id, name FROM users").await.unwrap();
    assert_eq!(result.rows().len(), 2);
    assert_eq!(result.rows()[1].get::<String>(1).unwrap(), "Bob");
    assert_eq!(stream.state(), StreamState::Active);

    stream.close().await.unwrap();
    assert_eq!(server.open_streams().await, 0);
}

#[tokio::test]
async fn test_request_headers() {
    let server = server_with_users().await;
    let client = Client::new(
        Config::new()
            .base_url(server.base_url())
            .auth_token("tok-123"),
    )
    .unwrap();
    let mut stream = client.open_stream();
    stream.execute("SELECT 1").await.unwrap();

    let requests = server.requests().await;
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.target, "/v3-protobuf/pipeline");
    assert_eq!(request.authorization.as_deref(), Some("Bearer tok-123"));
    assert_eq!(request.content_type.as_deref(), Some("application/x-protobuf"));
    assert_eq!(request.accept.as_deref(), Some("application/x-protobuf"));
}

#[tokio::test]
async fn test_missing_token_sends_empty_bearer() {
    let server = server_with_users().await;
    let client = Client::new(Config::new().base_url(server.base_url())).unwrap();
    let mut stream = client.open_stream();
    stream.execute("SELECT 1").await.unwrap();

    let requests = server.requests().await;
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer"));
}

// =============================================================================
// HTTP Failures
// =============================================================================

#[tokio::test]
async fn test_unauthorized_is_transport_error() {
    let server = MockHranaServer::builder()
        .with_auth_token("right")
        .build()
        .await
        .unwrap();
    let client = Client::new(
        Config::new()
            .base_url(server.base_url())
            .auth_token("wrong"),
    )
    .unwrap();
    let mut stream = client.open_stream();

    let err = stream.execute("SELECT 1").await.unwrap_err();
    assert!(matches!(err, Error::Transport { status: 401 }));
    assert!(!err.is_transient());
    assert_eq!(stream.state(), StreamState::Fresh);
    assert_eq!(stream.baton(), None);
}

#[tokio::test]
async fn test_server_error_status_keeps_baton() {
    let server = server_with_users().await;
    let client = Client::new(Config::new().base_url(server.base_url())).unwrap();
    let mut stream = client.open_stream();

    stream.execute("SELECT 1").await.unwrap();
    let baton = stream.baton().map(String::from);

    server.set_http_status(Some(503)).await;
    let err = stream.execute("SELECT 2").await.unwrap_err();
    assert!(matches!(err, Error::Transport { status: 503 }));
    assert_eq!(stream.baton().map(String::from), baton);

    server.set_http_status(None).await;
    stream.execute("SELECT 3").await.unwrap();
}

#[tokio::test]
async fn test_connection_refused() {
    let server = MockHranaServer::builder().build().await.unwrap();
    let base_url = server.base_url();
    server.stop();
    drop(server);
    // Give the server task a moment to release the listener.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = Client::new(Config::new().base_url(base_url)).unwrap();
    let mut stream = client.open_stream();
    let err = stream.execute("SELECT 1").await.unwrap_err();
    assert!(err.is_transient(), "unexpected error: {err:?}");
}

// =============================================================================
// Redirects and Deadlines
// =============================================================================

#[tokio::test]
async fn test_base_url_redirect_to_path_prefix() {
    let server = server_with_users().await;
    let client = Client::new(Config::new().base_url(server.base_url())).unwrap();
    let mut stream = client.open_stream();

    server
        .set_base_url(Some(format!("{}/replica/", server.base_url())))
        .await;
    stream.execute("SELECT 1").await.unwrap();
    server.set_base_url(None).await;
    stream.execute("SELECT 2").await.unwrap();

    let targets: Vec<String> = server
        .requests()
        .await
        .into_iter()
        .map(|r| r.target)
        .collect();
    assert_eq!(
        targets,
        vec!["/v3-protobuf/pipeline", "/replica/v3-protobuf/pipeline"]
    );
}

#[tokio::test]
async fn test_request_timeout() {
    let server = MockHranaServer::builder()
        .with_delay(Duration::from_millis(500))
        .build()
        .await
        .unwrap();
    let client = Client::new(Config::new().base_url(server.base_url())).unwrap();
    let mut stream = client.open_stream();

    let err = stream
        .execute_with_timeout("UPDATE t SET x = 1", Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RequestTimeout));
    assert!(err.is_ambiguous());
    assert_eq!(stream.state(), StreamState::Fresh);
    assert_eq!(stream.baton(), None);
}

#[tokio::test]
async fn test_concurrent_streams() {
    let server = server_with_users().await;
    let client = Client::new(Config::new().base_url(server.base_url())).unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            let mut conn = client.connect();
            conn.set_autocommit(false).await.unwrap();
            let mut rs = conn.query("SELECT id, name FROM users", &[]).await.unwrap();
            let mut count = 0;
            while rs.next() {
                count += 1;
            }
            conn.commit().await.unwrap();
            conn.close().await.unwrap();
            count
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), 2);
    }
    assert_eq!(server.streams_opened().await, 8);
    assert_eq!(server.open_streams().await, 0);
}
