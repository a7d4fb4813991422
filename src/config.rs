//! Configuration for cachecompat
//!
//! Centralized configuration with defaults matching a local
//! compatibility-mode cluster.

use std::fmt;

use crate::codec::MAX_PAYLOAD_SIZE;
use crate::error::{CompatError, Result};

/// Main configuration for a verification run
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Cluster Configuration
    // -------------------------------------------------------------------------
    /// Host every front-end listens on
    pub host: String,

    /// Name of the cache shared by all front-ends
    pub cache_name: String,

    // -------------------------------------------------------------------------
    // Hot Rod Configuration
    // -------------------------------------------------------------------------
    /// Hot Rod port
    pub hotrod_port: u16,

    /// Hot Rod connect timeout (milliseconds)
    pub hotrod_connect_timeout_ms: u64,

    /// Hot Rod socket read/write timeout (milliseconds, 0 = none)
    pub hotrod_socket_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // REST Configuration
    // -------------------------------------------------------------------------
    /// REST port
    pub rest_port: u16,

    /// Basic credentials presented on every REST request
    pub credentials: Credentials,

    /// REST request timeout (milliseconds, 0 = none)
    pub rest_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // memcached Configuration
    // -------------------------------------------------------------------------
    /// memcached port
    pub memcached_port: u16,

    /// memcached operation timeout (milliseconds, 0 = none)
    pub memcached_timeout_ms: u64,

    /// Expiration applied to every memcached write (seconds)
    pub memcached_expiration_secs: u32,

    // -------------------------------------------------------------------------
    // Codec Configuration
    // -------------------------------------------------------------------------
    /// Largest value the byte codec will wrap or unwrap (bytes, length prefix excluded)
    pub max_payload_size: usize,

    // -------------------------------------------------------------------------
    // Verification Configuration
    // -------------------------------------------------------------------------
    /// What to do after the first divergence
    pub failure_policy: FailurePolicy,
}

/// How the verifier reacts to a divergence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop the run at the first divergence
    #[default]
    AbortOnFirst,

    /// Keep going and report every divergence
    Aggregate,
}

/// Username/password pair for HTTP basic authentication
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            cache_name: "compat".to_string(),
            hotrod_port: 11222,
            hotrod_connect_timeout_ms: 60_000,
            hotrod_socket_timeout_ms: 60_000,
            rest_port: 8080,
            credentials: Credentials::new("user", "user"),
            rest_timeout_ms: 60_000,
            memcached_port: 11211,
            memcached_timeout_ms: 60_000,
            memcached_expiration_secs: 3600,
            max_payload_size: MAX_PAYLOAD_SIZE,
            failure_policy: FailurePolicy::AbortOnFirst,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that the config describes a reachable cluster
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(CompatError::Config("host must not be empty".to_string()));
        }
        if self.cache_name.trim().is_empty() {
            return Err(CompatError::Config("cache name must not be empty".to_string()));
        }
        for (name, port) in [
            ("hotrod", self.hotrod_port),
            ("rest", self.rest_port),
            ("memcached", self.memcached_port),
        ] {
            if port == 0 {
                return Err(CompatError::Config(format!("{name} port must not be 0")));
            }
        }
        if self.max_payload_size == 0 {
            return Err(CompatError::Config(
                "max payload size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// `host:port` of the Hot Rod front-end
    pub fn hotrod_addr(&self) -> String {
        format!("{}:{}", self.host, self.hotrod_port)
    }

    /// `host:port` of the memcached front-end
    pub fn memcached_addr(&self) -> String {
        format!("{}:{}", self.host, self.memcached_port)
    }

    /// Base URL of the cache's REST resource, e.g. `http://localhost:8080/rest/compat`
    pub fn rest_base_url(&self) -> String {
        format!(
            "http://{}:{}/rest/{}",
            self.host, self.rest_port, self.cache_name
        )
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the host shared by all front-ends
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the cache name
    pub fn cache_name(mut self, name: impl Into<String>) -> Self {
        self.config.cache_name = name.into();
        self
    }

    /// Set the Hot Rod port
    pub fn hotrod_port(mut self, port: u16) -> Self {
        self.config.hotrod_port = port;
        self
    }

    /// Set the Hot Rod connect timeout (in milliseconds)
    pub fn hotrod_connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.hotrod_connect_timeout_ms = ms;
        self
    }

    /// Set the Hot Rod socket timeout (in milliseconds)
    pub fn hotrod_socket_timeout_ms(mut self, ms: u64) -> Self {
        self.config.hotrod_socket_timeout_ms = ms;
        self
    }

    /// Set the REST port
    pub fn rest_port(mut self, port: u16) -> Self {
        self.config.rest_port = port;
        self
    }

    /// Set the REST basic credentials
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.credentials = Credentials::new(username, password);
        self
    }

    /// Set the REST request timeout (in milliseconds)
    pub fn rest_timeout_ms(mut self, ms: u64) -> Self {
        self.config.rest_timeout_ms = ms;
        self
    }

    /// Set the memcached port
    pub fn memcached_port(mut self, port: u16) -> Self {
        self.config.memcached_port = port;
        self
    }

    /// Set the memcached operation timeout (in milliseconds)
    pub fn memcached_timeout_ms(mut self, ms: u64) -> Self {
        self.config.memcached_timeout_ms = ms;
        self
    }

    /// Set the memcached expiration (in seconds)
    pub fn memcached_expiration_secs(mut self, secs: u32) -> Self {
        self.config.memcached_expiration_secs = secs;
        self
    }

    /// Set the byte codec payload limit (in bytes)
    pub fn max_payload_size(mut self, size: usize) -> Self {
        self.config.max_payload_size = size;
        self
    }

    /// Set the failure policy
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
