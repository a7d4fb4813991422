//! Hot Rod adapter
//!
//! Byte-native: values travel as Hot Rod byte arrays without any codec.

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;

use crate::config::Config;
use crate::error::{CompatError, Result};
use crate::protocol::hotrod::{
    read_response, write_request, Opcode, Operation, Request, Response, Status,
};
use crate::protocol::ProtocolKind;

use super::{open_stream, shutdown_stream, CacheAdapter, Lookup};

const PROTOCOL: ProtocolKind = ProtocolKind::HotRod;

/// Buffered halves of one TCP connection
struct Connection {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

/// Client for one named cache over Hot Rod
pub struct HotRodAdapter {
    /// `None` once released
    connection: Option<Connection>,

    cache_name: String,

    /// Id for the next request; responses must echo it
    next_message_id: u64,

    /// Peer address for logging
    peer_addr: String,
}

impl HotRodAdapter {
    /// Connect to the configured Hot Rod endpoint and ping the cache
    pub fn connect(config: &Config) -> Result<Self> {
        let addr = config.hotrod_addr();
        let stream = open_stream(
            &addr,
            config.hotrod_connect_timeout_ms,
            config.hotrod_socket_timeout_ms,
        )
        .map_err(|e| e.on_wire(PROTOCOL))?;

        let mut adapter = Self::from_stream(stream, &config.cache_name)?;
        adapter.ping()?;

        tracing::debug!(
            "Hot Rod connection established to {} (cache {})",
            adapter.peer_addr,
            adapter.cache_name
        );
        Ok(adapter)
    }

    /// Wrap an already-connected stream
    pub fn from_stream(stream: TcpStream, cache_name: &str) -> Result<Self> {
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
            cache_name: cache_name.to_string(),
            next_message_id: 1,
            peer_addr,
        })
    }

    /// Health check against the named cache
    pub fn ping(&mut self) -> Result<()> {
        self.execute(Operation::Ping)?;
        Ok(())
    }

    /// Send one request and wait for its response
    fn execute(&mut self, operation: Operation) -> Result<Response> {
        let message_id = self.next_message_id;
        self.next_message_id += 1;

        let request = Request::new(message_id, self.cache_name.clone(), operation);
        let expected = request.operation.opcode().response();

        let connection = self
            .connection
            .as_mut()
            .ok_or_else(|| CompatError::communication(PROTOCOL, "connection already closed"))?;

        write_request(&mut connection.writer, &request).map_err(|e| e.on_wire(PROTOCOL))?;
        let response = read_response(&mut connection.reader).map_err(|e| e.on_wire(PROTOCOL))?;

        tracing::trace!("Hot Rod #{} → {:?} {:?}", message_id, response.opcode, response.status);

        if response.message_id != message_id {
            return Err(CompatError::protocol(
                PROTOCOL,
                format!(
                    "response id {} does not match request id {}",
                    response.message_id, message_id
                ),
            ));
        }

        if response.opcode == Opcode::ErrorResponse || response.status.is_error() {
            let message = response
                .error_message()
                .unwrap_or_else(|| "no message".to_string());
            return Err(CompatError::protocol(
                PROTOCOL,
                format!("server error {:?}: {}", response.status, message),
            ));
        }

        if response.opcode != expected {
            return Err(CompatError::protocol(
                PROTOCOL,
                format!("expected {:?}, got {:?}", expected, response.opcode),
            ));
        }

        Ok(response)
    }
}

impl CacheAdapter for HotRodAdapter {
    fn protocol(&self) -> ProtocolKind {
        PROTOCOL
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<()> {
        tracing::trace!("Hot Rod put {:?} ({} bytes)", key, value.len());

        let response = self.execute(Operation::Put {
            key: key.as_bytes().to_vec(),
            lifespan_secs: 0,
            max_idle_secs: 0,
            value: value.to_vec(),
        })?;

        match response.status {
            Status::Ok => Ok(()),
            status => Err(CompatError::protocol(
                PROTOCOL,
                format!("put {key:?} not acknowledged: {status:?}"),
            )),
        }
    }

    fn get(&mut self, key: &str) -> Result<Lookup> {
        tracing::trace!("Hot Rod get {:?}", key);

        let response = self.execute(Operation::Get {
            key: key.as_bytes().to_vec(),
        })?;

        match response.status {
            Status::Ok => Ok(Lookup::Found(response.payload.unwrap_or_default())),
            Status::KeyDoesNotExist => Ok(Lookup::Missing),
            status => Err(CompatError::protocol(
                PROTOCOL,
                format!("get {key:?} failed: {status:?}"),
            )),
        }
    }

    fn close(&mut self) -> Result<()> {
        if let Some(connection) = self.connection.take() {
            shutdown_stream(connection.writer.get_ref())
                .map_err(|e| CompatError::from(e).on_wire(PROTOCOL))?;
            tracing::debug!("Hot Rod connection to {} released", self.peer_addr);
        }
        Ok(())
    }
}

impl Drop for HotRodAdapter {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("Error releasing Hot Rod connection to {}: {}", self.peer_addr, e);
        }
    }
}
