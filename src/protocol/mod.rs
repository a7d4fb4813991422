//! Protocol Module
//!
//! Wire codecs for the cache front-ends.
//!
//! ## Front-ends
//! - [`hotrod`]: Hot Rod 2.0, length-prefixed binary frames
//! - [`memcached`]: memcached text protocol, CRLF-terminated lines
//! - REST needs no codec of its own; bodies travel as
//!   `application/octet-stream`

use std::fmt;

pub mod hotrod;
pub mod memcached;

/// The wire protocols a cache front-end can speak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProtocolKind {
    HotRod,
    Rest,
    Memcached,
}

impl ProtocolKind {
    /// Every protocol, in the fixed order reads are issued
    pub const ALL: [ProtocolKind; 3] = [
        ProtocolKind::HotRod,
        ProtocolKind::Rest,
        ProtocolKind::Memcached,
    ];

    /// Human-readable protocol name
    pub fn name(&self) -> &'static str {
        match self {
            ProtocolKind::HotRod => "Hot Rod",
            ProtocolKind::Rest => "REST",
            ProtocolKind::Memcached => "memcached",
        }
    }
}

impl fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
