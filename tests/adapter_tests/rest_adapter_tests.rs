//! REST Adapter Tests
//!
//! Mock servers run on a dedicated runtime; the blocking client is driven
//! from the test thread.

use cachecompat::adapter::RestAdapter;
use cachecompat::config::Credentials;
use cachecompat::{CacheAdapter, CompatError, Config, Lookup, ProtocolKind};
use tokio::runtime::Runtime;
use wiremock::matchers::{body_bytes, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AUTHORIZATION: &str = "Basic dXNlcjp1c2Vy";

// =============================================================================
// Helper Functions
// =============================================================================

fn start_server(rt: &Runtime) -> MockServer {
    rt.block_on(MockServer::start())
}

fn mount(rt: &Runtime, server: &MockServer, mock: Mock) {
    rt.block_on(mock.mount(server));
}

fn adapter_for(server: &MockServer) -> RestAdapter {
    RestAdapter::new(
        &format!("{}/rest/compat", server.uri()),
        Credentials::new("user", "user"),
        5_000,
    )
    .unwrap()
}

// =============================================================================
// PUT Tests
// =============================================================================

#[test]
fn test_put_sends_octet_stream_with_credentials() {
    let rt = Runtime::new().unwrap();
    let server = start_server(&rt);
    mount(
        &rt,
        &server,
        Mock::given(method("PUT"))
            .and(path("/rest/compat/KEY2"))
            .and(header("authorization", AUTHORIZATION))
            .and(header("content-type", "application/octet-stream"))
            .and(body_bytes(vec![4u8, 5, 6]))
            .respond_with(ResponseTemplate::new(200))
            .expect(1),
    );

    let mut adapter = adapter_for(&server);
    assert_eq!(adapter.protocol(), ProtocolKind::Rest);
    adapter.put("KEY2", &[4, 5, 6]).unwrap();

    rt.block_on(server.verify());
}

#[test]
fn test_put_accepts_any_success_status() {
    let rt = Runtime::new().unwrap();
    let server = start_server(&rt);
    mount(
        &rt,
        &server,
        Mock::given(method("PUT")).respond_with(ResponseTemplate::new(204)),
    );

    let mut adapter = adapter_for(&server);
    adapter.put("KEY2", &[1]).unwrap();
}

#[test]
fn test_put_server_error() {
    let rt = Runtime::new().unwrap();
    let server = start_server(&rt);
    mount(
        &rt,
        &server,
        Mock::given(method("PUT")).respond_with(ResponseTemplate::new(500)),
    );

    let mut adapter = adapter_for(&server);
    let err = adapter.put("KEY2", &[1]).unwrap_err();

    match &err {
        CompatError::UnexpectedStatus { method, url, status } => {
            assert_eq!(method, "PUT");
            assert!(url.ends_with("/rest/compat/KEY2"));
            assert_eq!(*status, 500);
        }
        other => panic!("Expected UnexpectedStatus, got {:?}", other),
    }
    assert_eq!(err.origin(), Some(ProtocolKind::Rest));
    assert!(err.to_string().starts_with("REST protocol error"));
}

#[test]
fn test_put_unauthorized() {
    let rt = Runtime::new().unwrap();
    let server = start_server(&rt);
    mount(
        &rt,
        &server,
        Mock::given(method("PUT"))
            .and(header("authorization", AUTHORIZATION))
            .respond_with(ResponseTemplate::new(200)),
    );

    let mut adapter = RestAdapter::new(
        &format!("{}/rest/compat", server.uri()),
        Credentials::new("user", "wrong"),
        5_000,
    )
    .unwrap();

    // wiremock answers unmatched requests with 404
    assert!(matches!(
        adapter.put("KEY2", &[1]),
        Err(CompatError::UnexpectedStatus { status: 404, .. })
    ));
}

// =============================================================================
// GET Tests
// =============================================================================

#[test]
fn test_get_returns_body() {
    let rt = Runtime::new().unwrap();
    let server = start_server(&rt);
    mount(
        &rt,
        &server,
        Mock::given(method("GET"))
            .and(path("/rest/compat/KEY1"))
            .and(header("authorization", AUTHORIZATION))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3])),
    );

    let mut adapter = adapter_for(&server);
    assert_eq!(adapter.get("KEY1").unwrap(), Lookup::Found(vec![1, 2, 3]));
}

#[test]
fn test_get_empty_body_is_found() {
    let rt = Runtime::new().unwrap();
    let server = start_server(&rt);
    mount(
        &rt,
        &server,
        Mock::given(method("GET")).respond_with(ResponseTemplate::new(200)),
    );

    let mut adapter = adapter_for(&server);
    assert_eq!(adapter.get("KEY1").unwrap(), Lookup::Found(Vec::new()));
}

#[test]
fn test_get_requires_exactly_ok() {
    let rt = Runtime::new().unwrap();
    let server = start_server(&rt);
    mount(
        &rt,
        &server,
        Mock::given(method("GET")).respond_with(ResponseTemplate::new(204)),
    );

    let mut adapter = adapter_for(&server);
    assert!(matches!(
        adapter.get("KEY1"),
        Err(CompatError::UnexpectedStatus { status: 204, .. })
    ));
}

#[test]
fn test_get_not_found_is_an_error() {
    let rt = Runtime::new().unwrap();
    let server = start_server(&rt);
    mount(
        &rt,
        &server,
        Mock::given(method("GET")).respond_with(ResponseTemplate::new(404)),
    );

    let mut adapter = adapter_for(&server);
    match adapter.get("KEY1") {
        Err(CompatError::UnexpectedStatus { method, status, .. }) => {
            assert_eq!(method, "GET");
            assert_eq!(status, 404);
        }
        other => panic!("Expected UnexpectedStatus, got {:?}", other),
    }
}

// =============================================================================
// URL Tests
// =============================================================================

#[test]
fn test_connect_uses_configured_base_url() {
    let config = Config::builder().host("cache.local").rest_port(8181).build();
    let adapter = RestAdapter::connect(&config).unwrap();

    assert_eq!(
        adapter.base_url().as_str(),
        "http://cache.local:8181/rest/compat"
    );
}

#[test]
fn test_key_url_appends_segment() {
    let adapter =
        RestAdapter::new("http://localhost:8080/rest/compat/", Credentials::new("u", "p"), 0)
            .unwrap();

    assert_eq!(
        adapter.key_url("KEY1").unwrap().as_str(),
        "http://localhost:8080/rest/compat/KEY1"
    );
}

#[test]
fn test_key_url_escapes_key() {
    let adapter =
        RestAdapter::new("http://localhost:8080/rest/compat", Credentials::new("u", "p"), 0)
            .unwrap();

    assert_eq!(
        adapter.key_url("a b/c").unwrap().as_str(),
        "http://localhost:8080/rest/compat/a%20b%2Fc"
    );
}

#[test]
fn test_invalid_base_url() {
    assert!(matches!(
        RestAdapter::new("not a url", Credentials::new("u", "p"), 0),
        Err(CompatError::Config(_))
    ));
    assert!(matches!(
        RestAdapter::new("mailto:someone@example.com", Credentials::new("u", "p"), 0),
        Err(CompatError::Config(_))
    ));
}

// =============================================================================
// Release Tests
// =============================================================================

#[test]
fn test_operations_after_close_fail() {
    let mut adapter =
        RestAdapter::new("http://127.0.0.1:1/rest/compat", Credentials::new("u", "p"), 0)
            .unwrap();

    adapter.close().unwrap();
    adapter.close().unwrap();

    assert!(matches!(
        adapter.get("KEY1"),
        Err(CompatError::Communication { protocol: ProtocolKind::Rest, .. })
    ));
}

#[test]
fn test_unreachable_server_is_communication_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mut adapter = RestAdapter::new(
        &format!("http://127.0.0.1:{port}/rest/compat"),
        Credentials::new("u", "p"),
        2_000,
    )
    .unwrap();

    assert!(matches!(
        adapter.put("KEY1", &[1]),
        Err(CompatError::Communication { protocol: ProtocolKind::Rest, .. })
    ));
}
