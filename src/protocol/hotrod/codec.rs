//! Hot Rod codec
//!
//! Encoding and decoding functions for request and response frames.
//! Encoding builds a complete frame in memory; decoding reads field by
//! field from any `Read`, since frame length is only known once every
//! variable-length field has been parsed.

use std::io::{Cursor, Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{CompatError, Result};
use crate::protocol::ProtocolKind;

use super::varint::{
    put_array, put_vint, put_vlong, read_array, read_string, read_u8, read_vint, read_vlong,
};
use super::{Opcode, Operation, Request, Response, Status, REQUEST_MAGIC, RESPONSE_MAGIC};

fn violation(message: impl Into<String>) -> CompatError {
    CompatError::protocol(ProtocolKind::HotRod, message)
}

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a request frame
pub fn encode_request(request: &Request) -> Bytes {
    let mut buf = BytesMut::with_capacity(64);

    // Header
    buf.put_u8(REQUEST_MAGIC);
    put_vlong(&mut buf, request.message_id);
    buf.put_u8(request.version);
    buf.put_u8(request.operation.opcode() as u8);
    put_array(&mut buf, request.cache_name.as_bytes());
    put_vint(&mut buf, request.flags);
    buf.put_u8(request.client_intelligence);
    put_vint(&mut buf, request.topology_id);

    // Body
    match &request.operation {
        Operation::Put {
            key,
            lifespan_secs,
            max_idle_secs,
            value,
        } => {
            put_array(&mut buf, key);
            put_vint(&mut buf, *lifespan_secs);
            put_vint(&mut buf, *max_idle_secs);
            put_array(&mut buf, value);
        }
        Operation::Get { key } => put_array(&mut buf, key),
        Operation::Ping => {}
    }

    buf.freeze()
}

/// Read a complete request frame from a stream
///
/// Blocks until a complete request is received or an error occurs
pub fn read_request<R: Read>(reader: &mut R) -> Result<Request> {
    let magic = read_u8(reader)?;
    if magic != REQUEST_MAGIC {
        return Err(violation(format!("Invalid request magic: 0x{magic:02x}")));
    }

    let message_id = read_vlong(reader)?;
    let version = read_u8(reader)?;
    let opcode_byte = read_u8(reader)?;
    let cache_name = read_string(reader)?;
    let flags = read_vint(reader)?;
    let client_intelligence = read_u8(reader)?;
    let topology_id = read_vint(reader)?;

    let operation = match Opcode::from_u8(opcode_byte) {
        Some(Opcode::PutRequest) => {
            let key = read_array(reader)?;
            let lifespan_secs = read_vint(reader)?;
            let max_idle_secs = read_vint(reader)?;
            let value = read_array(reader)?;
            Operation::Put {
                key,
                lifespan_secs,
                max_idle_secs,
                value,
            }
        }
        Some(Opcode::GetRequest) => Operation::Get {
            key: read_array(reader)?,
        },
        Some(Opcode::PingRequest) => Operation::Ping,
        _ => {
            return Err(violation(format!(
                "Unknown request opcode: 0x{opcode_byte:02x}"
            )))
        }
    };

    Ok(Request {
        message_id,
        version,
        cache_name,
        flags,
        client_intelligence,
        topology_id,
        operation,
    })
}

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    writer.write_all(&encode_request(request))?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Whether a response with this opcode/status carries a payload
fn has_payload(opcode: Opcode, status: Status) -> bool {
    match opcode {
        Opcode::ErrorResponse => true,
        Opcode::GetResponse => status == Status::Ok,
        _ => false,
    }
}

/// Encode a response frame
pub fn encode_response(response: &Response) -> Bytes {
    let mut buf = BytesMut::with_capacity(16);

    buf.put_u8(RESPONSE_MAGIC);
    put_vlong(&mut buf, response.message_id);
    buf.put_u8(response.opcode as u8);
    buf.put_u8(response.status as u8);
    buf.put_u8(0); // no topology change

    if has_payload(response.opcode, response.status) {
        put_array(&mut buf, response.payload.as_deref().unwrap_or(&[]));
    }

    buf.freeze()
}

/// Read a complete response frame from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let magic = read_u8(reader)?;
    if magic != RESPONSE_MAGIC {
        return Err(violation(format!("Invalid response magic: 0x{magic:02x}")));
    }

    let message_id = read_vlong(reader)?;

    let opcode_byte = read_u8(reader)?;
    let opcode = Opcode::from_u8(opcode_byte)
        .ok_or_else(|| violation(format!("Unknown response opcode: 0x{opcode_byte:02x}")))?;

    let status_byte = read_u8(reader)?;
    let status = Status::from_u8(status_byte)
        .ok_or_else(|| violation(format!("Unknown response status: 0x{status_byte:02x}")))?;

    // Basic intelligence never asks for topology, so the server must not send one
    let topology_marker = read_u8(reader)?;
    if topology_marker != 0 {
        return Err(violation("Unexpected topology change in response"));
    }

    let payload = if has_payload(opcode, status) {
        Some(read_array(reader)?)
    } else {
        None
    };

    Ok(Response {
        message_id,
        opcode,
        status,
        payload,
    })
}

/// Decode a response from a complete buffer
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let mut cursor = Cursor::new(bytes);
    let response = read_response(&mut cursor)?;

    let consumed = cursor.position() as usize;
    if consumed != bytes.len() {
        return Err(violation(format!(
            "Trailing bytes after response: {}",
            bytes.len() - consumed
        )));
    }

    Ok(response)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    writer.write_all(&encode_response(response))?;
    writer.flush()?;
    Ok(())
}
