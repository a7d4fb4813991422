//! Hot Rod Adapter Tests
//!
//! Runs the adapter against the fake cluster and a few scripted servers.

#[path = "../support/mod.rs"]
mod support;

use std::io::{BufReader, BufWriter};
use std::net::TcpListener;
use std::thread;

use cachecompat::adapter::HotRodAdapter;
use cachecompat::protocol::hotrod::{self, Opcode, Response};
use cachecompat::{CacheAdapter, CompatError, Config, Lookup, ProtocolKind};
use support::cluster::FakeCluster;

// =============================================================================
// Helper Functions
// =============================================================================

/// Port with nothing listening on it
fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Serve one connection, answering every request through `answer`
fn scripted_server<F>(answer: F) -> u16
where
    F: Fn(hotrod::Request) -> Response + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut writer = BufWriter::new(stream);
        while let Ok(request) = hotrod::read_request(&mut reader) {
            if hotrod::write_response(&mut writer, &answer(request)).is_err() {
                break;
            }
        }
    });

    port
}

fn config_for(port: u16) -> Config {
    Config::builder()
        .host("127.0.0.1")
        .hotrod_port(port)
        .hotrod_connect_timeout_ms(2_000)
        .hotrod_socket_timeout_ms(2_000)
        .build()
}

// =============================================================================
// Basic Operations
// =============================================================================

#[test]
fn test_put_then_get() {
    let cluster = FakeCluster::start();
    let mut adapter = HotRodAdapter::connect(&cluster.config()).unwrap();

    assert_eq!(adapter.protocol(), ProtocolKind::HotRod);
    adapter.put("KEY1", &[1, 2, 3]).unwrap();

    assert_eq!(adapter.get("KEY1").unwrap(), Lookup::Found(vec![1, 2, 3]));
    assert_eq!(cluster.stored("KEY1"), Some(vec![1, 2, 3]));
}

#[test]
fn test_get_sees_value_written_elsewhere() {
    let cluster = FakeCluster::start();
    cluster.insert("KEY2", &[4, 5, 6]);

    let mut adapter = HotRodAdapter::connect(&cluster.config()).unwrap();
    assert_eq!(adapter.get("KEY2").unwrap(), Lookup::Found(vec![4, 5, 6]));
}

#[test]
fn test_get_missing_key() {
    let cluster = FakeCluster::start();
    let mut adapter = HotRodAdapter::connect(&cluster.config()).unwrap();

    assert_eq!(adapter.get("nope").unwrap(), Lookup::Missing);
}

#[test]
fn test_empty_value_is_found() {
    let cluster = FakeCluster::start();
    let mut adapter = HotRodAdapter::connect(&cluster.config()).unwrap();

    adapter.put("empty", &[]).unwrap();
    assert_eq!(adapter.get("empty").unwrap(), Lookup::Found(Vec::new()));
}

#[test]
fn test_overwrite() {
    let cluster = FakeCluster::start();
    let mut adapter = HotRodAdapter::connect(&cluster.config()).unwrap();

    adapter.put("k", &[1]).unwrap();
    adapter.put("k", &[2, 2]).unwrap();
    assert_eq!(adapter.get("k").unwrap(), Lookup::Found(vec![2, 2]));
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_unknown_cache_fails_on_connect() {
    let cluster = FakeCluster::start();
    let mut config = cluster.config();
    config.cache_name = "missing".to_string();

    match HotRodAdapter::connect(&config) {
        Err(CompatError::Protocol { protocol, message }) => {
            assert_eq!(protocol, ProtocolKind::HotRod);
            assert!(message.contains("missing"));
        }
        Err(other) => panic!("Expected protocol error, got {:?}", other),
        Ok(_) => panic!("Expected connect to fail"),
    }
}

#[test]
fn test_connection_refused() {
    let result = HotRodAdapter::connect(&config_for(closed_port()));

    match result {
        Err(CompatError::Communication { protocol, .. }) => {
            assert_eq!(protocol, ProtocolKind::HotRod)
        }
        Err(other) => panic!("Expected communication error, got {:?}", other),
        Ok(_) => panic!("Expected connect to fail"),
    }
}

#[test]
fn test_mismatched_message_id() {
    let port = scripted_server(|request| match request.operation {
        hotrod::Operation::Ping => Response::ok(request.message_id, Opcode::PingResponse),
        _ => Response::ok(request.message_id + 100, Opcode::GetResponse),
    });

    let mut adapter = HotRodAdapter::connect(&config_for(port)).unwrap();
    match adapter.get("KEY1") {
        Err(CompatError::Protocol { message, .. }) => assert!(message.contains("does not match")),
        other => panic!("Expected protocol error, got {:?}", other),
    }
}

#[test]
fn test_unexpected_response_opcode() {
    let port = scripted_server(|request| match request.operation {
        hotrod::Operation::Ping => Response::ok(request.message_id, Opcode::PingResponse),
        _ => Response::ok(request.message_id, Opcode::PingResponse),
    });

    let mut adapter = HotRodAdapter::connect(&config_for(port)).unwrap();
    assert!(matches!(
        adapter.put("KEY1", &[1]),
        Err(CompatError::Protocol { .. })
    ));
}

#[test]
fn test_server_hangup_is_communication_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        // Accept and immediately drop
        let _ = listener.accept().unwrap();
    });

    match HotRodAdapter::connect(&config_for(port)) {
        Err(CompatError::Communication { protocol, .. }) => {
            assert_eq!(protocol, ProtocolKind::HotRod)
        }
        Err(other) => panic!("Expected communication error, got {:?}", other),
        Ok(_) => panic!("Expected connect to fail"),
    }
}

// =============================================================================
// Release Tests
// =============================================================================

#[test]
fn test_close_is_idempotent() {
    let cluster = FakeCluster::start();
    let mut adapter = HotRodAdapter::connect(&cluster.config()).unwrap();

    adapter.close().unwrap();
    adapter.close().unwrap();
}

#[test]
fn test_operations_after_close_fail() {
    let cluster = FakeCluster::start();
    let mut adapter = HotRodAdapter::connect(&cluster.config()).unwrap();
    adapter.close().unwrap();

    assert!(matches!(
        adapter.get("KEY1"),
        Err(CompatError::Communication { .. })
    ));
    assert!(matches!(
        adapter.put("KEY1", &[1]),
        Err(CompatError::Communication { .. })
    ));
}
