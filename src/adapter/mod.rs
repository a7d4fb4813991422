//! Adapter Module
//!
//! Protocol-specific clients behind one key/value contract.
//!
//! ## Adapters
//! - [`HotRodAdapter`]: byte-native, no codec
//! - [`RestAdapter`]: byte-native, octet-stream bodies
//! - [`MemcachedAdapter`]: values pass through a [`Transcoder`] built on
//!   the byte codec; decode failures degrade to [`Lookup::Undecodable`]
//!   instead of erroring
//!
//! Each adapter owns one connection and releases it exactly once, either
//! through [`CacheAdapter::close`] or on drop.

mod hotrod;
mod memcached;
mod rest;

pub use hotrod::HotRodAdapter;
pub use memcached::{ByteTranscoder, CachedData, MemcachedAdapter, Transcoder};
pub use rest::RestAdapter;

use std::io;
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::{CompatError, Result};
use crate::protocol::ProtocolKind;

/// Open a TCP connection to `addr` and configure it for request/response use
///
/// Tries every resolved address in turn. Timeouts of 0 mean "none".
pub(crate) fn open_stream(addr: &str, connect_ms: u64, io_ms: u64) -> Result<TcpStream> {
    let mut last_error = None;

    for socket_addr in addr.to_socket_addrs()? {
        let attempt = if connect_ms > 0 {
            TcpStream::connect_timeout(&socket_addr, Duration::from_millis(connect_ms))
        } else {
            TcpStream::connect(socket_addr)
        };

        match attempt {
            Ok(stream) => {
                // Disable Nagle's algorithm for low latency
                stream.set_nodelay(true)?;
                if io_ms > 0 {
                    stream.set_read_timeout(Some(Duration::from_millis(io_ms)))?;
                    stream.set_write_timeout(Some(Duration::from_millis(io_ms)))?;
                }
                return Ok(stream);
            }
            Err(e) => {
                tracing::debug!("Connect to {} failed: {}", socket_addr, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{addr} did not resolve")))
        .into())
}

/// Shut a stream down, treating an already-disconnected peer as success
pub(crate) fn shutdown_stream(stream: &TcpStream) -> io::Result<()> {
    match stream.shutdown(Shutdown::Both) {
        Err(e) if e.kind() != io::ErrorKind::NotConnected => Err(e),
        _ => Ok(()),
    }
}

/// Outcome of a read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The key holds these bytes
    Found(Vec<u8>),

    /// The key is not set
    Missing,

    /// The front-end returned a value that could not be decoded
    Undecodable,
}

impl Lookup {
    /// Bytes as seen by the equality oracle; `None` unless found
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Lookup::Found(bytes) => Some(bytes),
            Lookup::Missing | Lookup::Undecodable => None,
        }
    }

    /// Whether the key held a decodable value (possibly empty)
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

/// Uniform put/get contract over one cache front-end
pub trait CacheAdapter {
    /// Protocol this adapter speaks
    fn protocol(&self) -> ProtocolKind;

    /// Store `value` under `key`; returns once the front-end acknowledged
    fn put(&mut self, key: &str, value: &[u8]) -> Result<()>;

    /// Read the value stored under `key`
    fn get(&mut self, key: &str) -> Result<Lookup>;

    /// Release the underlying connection. Calling it again is a no-op.
    fn close(&mut self) -> Result<()>;
}

/// One adapter per protocol, iterated in [`ProtocolKind::ALL`] order
pub struct AdapterSet {
    adapters: Vec<Box<dyn CacheAdapter>>,
}

impl AdapterSet {
    /// Build a set; rejects an empty list and duplicate protocols
    pub fn new(mut adapters: Vec<Box<dyn CacheAdapter>>) -> Result<Self> {
        if adapters.is_empty() {
            return Err(CompatError::Config("no adapters configured".to_string()));
        }

        adapters.sort_by_key(|a| a.protocol());
        if let Some(pair) = adapters
            .windows(2)
            .find(|pair| pair[0].protocol() == pair[1].protocol())
        {
            return Err(CompatError::Config(format!(
                "duplicate adapter for {}",
                pair[0].protocol()
            )));
        }

        Ok(Self { adapters })
    }

    /// Registered protocols in read order
    pub fn protocols(&self) -> Vec<ProtocolKind> {
        self.adapters.iter().map(|a| a.protocol()).collect()
    }

    pub fn contains(&self, protocol: ProtocolKind) -> bool {
        self.adapters.iter().any(|a| a.protocol() == protocol)
    }

    /// Adapter for `protocol`
    pub fn get_mut(&mut self, protocol: ProtocolKind) -> Result<&mut dyn CacheAdapter> {
        match self.adapters.iter_mut().find(|a| a.protocol() == protocol) {
            Some(adapter) => Ok(adapter.as_mut()),
            None => Err(CompatError::Config(format!(
                "no adapter registered for {protocol}"
            ))),
        }
    }

    /// Close every adapter, even if some fail; returns the first failure
    pub fn close_all(&mut self) -> Result<()> {
        let mut first_error = None;

        for adapter in &mut self.adapters {
            if let Err(e) = adapter.close() {
                tracing::warn!("Failed to close {} adapter: {}", adapter.protocol(), e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
