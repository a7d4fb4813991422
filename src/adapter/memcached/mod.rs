//! memcached adapter
//!
//! Values go through a [`Transcoder`] before hitting the wire. Every write
//! carries the configured expiration.
//!
//! Unlike the other adapters, a payload that cannot be decoded is not an
//! error: `get` returns [`Lookup::Undecodable`] and the verifier reports it
//! as a mismatch.

mod transcoder;

pub use transcoder::{ByteTranscoder, CachedData, Transcoder};

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;

use crate::config::Config;
use crate::error::{CompatError, Result};
use crate::protocol::memcached::{read_reply, write_command, Command, Reply};
use crate::protocol::ProtocolKind;

use super::{open_stream, shutdown_stream, CacheAdapter, Lookup};

const PROTOCOL: ProtocolKind = ProtocolKind::Memcached;

/// Buffered halves of one TCP connection
struct Connection {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

/// Client for a memcached front-end
pub struct MemcachedAdapter<T = ByteTranscoder> {
    /// `None` once released
    connection: Option<Connection>,

    transcoder: T,

    /// Expiration sent with every `set` (seconds)
    expiration_secs: u32,

    /// Peer address for logging
    peer_addr: String,
}

impl MemcachedAdapter<ByteTranscoder> {
    /// Connect with the byte-codec transcoder
    pub fn connect(config: &Config) -> Result<Self> {
        Self::connect_with(config, ByteTranscoder::new(config.max_payload_size))
    }
}

impl<T: Transcoder<Vec<u8>>> MemcachedAdapter<T> {
    /// Connect to the configured memcached endpoint with a custom transcoder
    ///
    /// The operation timeout doubles as the connect timeout.
    pub fn connect_with(config: &Config, transcoder: T) -> Result<Self> {
        let addr = config.memcached_addr();
        let stream = open_stream(
            &addr,
            config.memcached_timeout_ms,
            config.memcached_timeout_ms,
        )
        .map_err(|e| e.on_wire(PROTOCOL))?;

        let adapter = Self::from_stream(stream, transcoder, config.memcached_expiration_secs)?;
        tracing::debug!("memcached connection established to {}", adapter.peer_addr);
        Ok(adapter)
    }

    /// Wrap an already-connected stream
    pub fn from_stream(stream: TcpStream, transcoder: T, expiration_secs: u32) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        let read_stream = stream.try_clone().map_err(|e| CompatError::from(e).on_wire(PROTOCOL))?;

        Ok(Self {
            connection: Some(Connection {
                reader: BufReader::new(read_stream),
                writer: BufWriter::new(stream),
            }),
            transcoder,
            expiration_secs,
            peer_addr,
        })
    }

    /// Send one command and read its reply
    fn round_trip(&mut self, command: &Command) -> Result<Reply> {
        let connection = self
            .connection
            .as_mut()
            .ok_or_else(|| CompatError::communication(PROTOCOL, "connection already closed"))?;

        write_command(&mut connection.writer, command).map_err(|e| e.on_wire(PROTOCOL))?;
        let reply = read_reply(&mut connection.reader).map_err(|e| e.on_wire(PROTOCOL))?;

        if reply.is_error() {
            return Err(CompatError::protocol(
                PROTOCOL,
                format!("server rejected command: {reply:?}"),
            ));
        }
        Ok(reply)
    }

    /// Turn a stored payload back into bytes, degrading instead of failing
    fn decode(&self, flags: u32, data: Vec<u8>) -> Lookup {
        let cached = match CachedData::new(flags, data, self.transcoder.max_size()) {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!("Discarding memcached payload: {}", e);
                return Lookup::Undecodable;
            }
        };

        if self.transcoder.supports_async_decode(&cached) {
            tracing::trace!("Transcoder allows deferred decode; decoding inline");
        }

        match self.transcoder.decode(&cached) {
            Some(value) => Lookup::Found(value),
            None => Lookup::Undecodable,
        }
    }
}

impl<T> MemcachedAdapter<T> {
    /// Say goodbye and shut the socket down; no-op once released
    fn release(&mut self) -> Result<()> {
        if let Some(mut connection) = self.connection.take() {
            if let Err(e) = write_command(&mut connection.writer, &Command::Quit) {
                tracing::debug!("memcached quit to {} not delivered: {}", self.peer_addr, e);
            }
            shutdown_stream(connection.writer.get_ref())
                .map_err(|e| CompatError::from(e).on_wire(PROTOCOL))?;
            tracing::debug!("memcached connection to {} released", self.peer_addr);
        }
        Ok(())
    }
}

impl<T: Transcoder<Vec<u8>>> CacheAdapter for MemcachedAdapter<T> {
    fn protocol(&self) -> ProtocolKind {
        PROTOCOL
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<()> {
        tracing::trace!("memcached set {:?} ({} bytes)", key, value.len());

        let cached = self.transcoder.encode(&value.to_vec())?;
        let command = Command::Set {
            key: key.to_string(),
            flags: cached.flags(),
            exptime: self.expiration_secs,
            data: cached.into_data(),
        };

        match self.round_trip(&command)? {
            Reply::Stored => Ok(()),
            other => Err(CompatError::protocol(
                PROTOCOL,
                format!("set {key:?} not stored: {other:?}"),
            )),
        }
    }

    fn get(&mut self, key: &str) -> Result<Lookup> {
        tracing::trace!("memcached get {:?}", key);

        let command = Command::Get {
            key: key.to_string(),
        };

        match self.round_trip(&command)? {
            Reply::Values(items) => match items.into_iter().find(|item| item.key == key) {
                Some(item) => Ok(self.decode(item.flags, item.data)),
                None => Ok(Lookup::Missing),
            },
            other => Err(CompatError::protocol(
                PROTOCOL,
                format!("unexpected reply to get {key:?}: {other:?}"),
            )),
        }
    }

    fn close(&mut self) -> Result<()> {
        self.release()
    }
}

impl<T> Drop for MemcachedAdapter<T> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!("Error releasing memcached connection to {}: {}", self.peer_addr, e);
        }
    }
}
