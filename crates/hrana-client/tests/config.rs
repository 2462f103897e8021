//! Database URL parsing edge case tests.
//!
//! Tests edge cases that users commonly encounter with database URLs.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use hrana_client::{Config, Error, TimeoutConfig};

// ============================================================================
// Scheme Handling
// ============================================================================

#[test]
fn test_libsql_scheme_maps_to_https() {
    let config = Config::from_url("libsql://example.turso.io").unwrap();
    assert_eq!(config.base_url, "https://example.turso.io");
}

#[test]
fn test_http_scheme_is_kept() {
    let config = Config::from_url("http://localhost:8080").unwrap();
    assert_eq!(config.base_url, "http://localhost:8080");
    assert_eq!(
        config.pipeline_url(),
        "http://localhost:8080/v3-protobuf/pipeline"
    );
}

#[test]
fn test_scheme_is_case_insensitive() {
    let config = Config::from_url("HTTP://Example.COM:8080").unwrap();
    assert_eq!(config.base_url, "http://example.com:8080");
}

#[test]
fn test_unsupported_schemes_rejected() {
    for url in ["ws://localhost", "file:local.db", "postgres://h/db"] {
        let err = Config::from_url(url).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "{url} should be rejected");
    }
}

// ============================================================================
// Host, Port and Path
// ============================================================================

#[test]
fn test_default_port_is_not_added() {
    let config = Config::from_url("https://db.example.com:443").unwrap();
    assert_eq!(config.base_url, "https://db.example.com");
}

#[test]
fn test_explicit_port_kept() {
    let config = Config::from_url("libsql://127.0.0.1:8081").unwrap();
    assert_eq!(config.base_url, "https://127.0.0.1:8081");
}

#[test]
fn test_trailing_slashes_trimmed() {
    let config = Config::from_url("http://localhost:8080/ns/db//").unwrap();
    assert_eq!(config.base_url, "http://localhost:8080/ns/db");
    assert_eq!(
        config.pipeline_url(),
        "http://localhost:8080/ns/db/v3-protobuf/pipeline"
    );
}

#[test]
fn test_surrounding_whitespace_ignored() {
    let config = Config::from_url("  libsql://db.example.com  ").unwrap();
    assert_eq!(config.base_url, "https://db.example.com");
}

#[test]
fn test_empty_url_rejected() {
    assert!(matches!(Config::from_url(""), Err(Error::Config(_))));
}

// ============================================================================
// Tokens
// ============================================================================

#[test]
fn test_jwt_query_parameter() {
    let config = Config::from_url("libsql://db.example.com?jwt=eyJhbGciOi").unwrap();
    assert!(config.credentials.has_token());
    assert_eq!(config.credentials.bearer(), "Bearer eyJhbGciOi");
}

#[test]
fn test_other_query_parameters_ignored() {
    let config = Config::from_url("libsql://db.example.com?tls=0&jwt=t").unwrap();
    assert_eq!(config.base_url, "https://db.example.com");
    assert_eq!(config.credentials.bearer(), "Bearer t");
}

#[test]
fn test_token_not_in_debug_output() {
    let config = Config::from_url("libsql://db.example.com?jwt=super-secret").unwrap();
    let debug = format!("{config:?}");
    assert!(!debug.contains("super-secret"));
}

#[test]
fn test_missing_token_sends_empty_bearer() {
    let config = Config::from_url("http://localhost:8080").unwrap();
    assert_eq!(config.credentials.bearer(), "Bearer ");
}

// ============================================================================
// Timeouts
// ============================================================================

#[test]
fn test_default_timeouts() {
    let config = Config::new();
    assert_eq!(config.timeouts.connect_timeout, Duration::from_secs(10));
    assert_eq!(config.timeouts.request_timeout, Duration::from_secs(30));
}

#[test]
fn test_timeout_config_builder() {
    let config = Config::new().timeouts(
        TimeoutConfig::new()
            .connect_timeout(Duration::from_secs(2))
            .request_timeout(Duration::from_millis(1500)),
    );
    assert_eq!(config.timeouts.connect_timeout, Duration::from_secs(2));
    assert_eq!(config.timeouts.request_timeout, Duration::from_millis(1500));
}

#[test]
fn test_url_parsing_keeps_default_timeouts() {
    let config = Config::from_url("libsql://db.example.com").unwrap();
    assert_eq!(config.timeouts.request_timeout, Duration::from_secs(30));
    assert!(config.user_agent.starts_with("hrana-client/"));
}
