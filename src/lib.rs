//! # cachecompat
//!
//! Cross-protocol consistency verifier for a cache cluster that serves the
//! same data through three front-ends:
//! - Hot Rod (binary RPC)
//! - REST (HTTP/1.1)
//! - memcached (text protocol)
//!
//! A value written through any one front-end must read back byte-for-byte
//! identical through all the others.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Harness                              │
//! │           (acquire all adapters / release once)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Verifier                              │
//! │        (write → self-read → cross-reads, per step)          │
//! └──────┬──────────────────────┬────────────────────────┬──────┘
//!        │                      │                        │
//!        ▼                      ▼                        ▼
//! ┌─────────────┐       ┌─────────────┐        ┌─────────────────┐
//! │   Hot Rod   │       │    REST     │        │    memcached    │
//! │   adapter   │       │   adapter   │        │     adapter     │
//! └─────────────┘       └─────────────┘        │  (transcoder →  │
//!                                              │   byte codec)   │
//!                                              └─────────────────┘
//! ```
//!
//! Every read is checked by the equality [`oracle`].

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod oracle;
pub mod protocol;
pub mod adapter;
pub mod verify;
pub mod harness;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CompatError, Result};
pub use config::{Config, FailurePolicy};
pub use adapter::{AdapterSet, CacheAdapter, Lookup};
pub use protocol::ProtocolKind;
pub use verify::{Report, Scenario, ScenarioStep, Verifier};
pub use harness::{run, Harness};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of cachecompat
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
