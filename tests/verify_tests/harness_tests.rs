//! Harness Lifecycle Tests
//!
//! These tests verify:
//! - Adapters are released exactly once on success, failure and drop
//! - Connecting validates the config and stops at the first failed front-end

#[path = "../support/mod.rs"]
mod support;

use std::net::TcpListener;

use cachecompat::ProtocolKind::{HotRod, Memcached, Rest};
use cachecompat::{CompatError, Config, FailurePolicy, Harness, Scenario};
use support::cluster::FakeCluster;
use support::memory::{Fault, MemoryCluster};

// =============================================================================
// Release Tests
// =============================================================================

#[test]
fn test_shutdown_releases_each_adapter_once() {
    let cluster = MemoryCluster::new();
    let mut harness = Harness::with_adapters(Config::default(), cluster.adapter_set());

    let report = harness.run(&Scenario::reference()).unwrap();
    assert_eq!(report.comparisons().len(), 9);

    harness.shutdown().unwrap();
    assert_eq!(cluster.closes(), vec![HotRod, Rest, Memcached]);
}

#[test]
fn test_failed_run_still_releases_once() {
    let cluster = MemoryCluster::new();
    let mut harness = Harness::with_adapters(
        Config::default(),
        cluster.adapter_set_with(Rest, Fault::RejectWrites),
    );

    assert!(harness.run(&Scenario::reference()).is_err());
    assert!(cluster.closes().is_empty());

    harness.shutdown().unwrap();
    assert_eq!(cluster.closes(), vec![HotRod, Rest, Memcached]);
}

#[test]
fn test_drop_releases_each_adapter_once() {
    let cluster = MemoryCluster::new();
    {
        let _harness = Harness::with_adapters(Config::default(), cluster.adapter_set());
    }
    assert_eq!(cluster.closes(), vec![HotRod, Rest, Memcached]);
}

#[test]
fn test_divergence_becomes_inconsistent_error() {
    let cluster = MemoryCluster::new();
    let config = Config::builder()
        .failure_policy(FailurePolicy::Aggregate)
        .build();
    let mut harness = Harness::with_adapters(
        config,
        cluster.adapter_set_with(Memcached, Fault::UndecodableReads),
    );

    match harness.run(&Scenario::reference()) {
        Err(CompatError::Inconsistent { divergences }) => {
            assert_eq!(divergences.len(), 3);
            assert!(divergences.iter().all(|d| d.reader == Memcached));
        }
        other => panic!("Expected Inconsistent, got {:?}", other.map(|r| r.steps().len())),
    }
}

// =============================================================================
// Connect Tests
// =============================================================================

#[test]
fn test_connect_and_run_against_cluster() {
    let cluster = FakeCluster::start();
    let mut harness = Harness::connect(cluster.config()).unwrap();

    assert_eq!(harness.config().cache_name, "compat");
    let report = harness.run(&Scenario::reference()).unwrap();
    assert!(report.is_success());

    harness.shutdown().unwrap();
}

#[test]
fn test_connect_rejects_invalid_config() {
    let config = Config::builder().host("").build();
    assert!(matches!(Harness::connect(config), Err(CompatError::Config(_))));

    let config = Config::builder().memcached_port(0).build();
    assert!(matches!(Harness::connect(config), Err(CompatError::Config(_))));
}

#[test]
fn test_connect_fails_on_unreachable_memcached() {
    let cluster = FakeCluster::start();
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let mut config = cluster.config();
    config.memcached_port = port;

    match Harness::connect(config) {
        Err(err) => {
            assert_eq!(err.origin(), Some(Memcached));
            assert!(matches!(err, CompatError::Communication { .. }));
        }
        Ok(_) => panic!("Expected connect to fail"),
    }
}

#[test]
fn test_connect_fails_on_unknown_cache() {
    let cluster = FakeCluster::start();
    let mut config = cluster.config();
    config.cache_name = "other".to_string();

    match Harness::connect(config) {
        Err(err) => assert_eq!(err.origin(), Some(HotRod)),
        Ok(_) => panic!("Expected connect to fail"),
    }
}
