//! Hot Rod Protocol (2.0)
//!
//! Binary request/response protocol. All variable-length integers are
//! `vInt`/`vLong` (7 bits per byte, low group first); byte arrays are a
//! `vInt` length followed by the bytes.
//!
//! ### Request Header
//! ```text
//! ┌───────────┬──────────┬─────────┬──────────┬────────────┬─────────┬───────────┬─────────────┐
//! │ 0xA0 (1)  │ id vLong │ ver (1) │ op (1)   │ cache arr  │ flags   │ intel (1) │ topo vInt   │
//! └───────────┴──────────┴─────────┴──────────┴────────────┴─────────┴───────────┴─────────────┘
//! ```
//!
//! ### Response Header
//! ```text
//! ┌───────────┬──────────┬──────────┬────────────┬─────────────────┐
//! │ 0xA1 (1)  │ id vLong │ op (1)   │ status (1) │ topo change (1) │
//! └───────────┴──────────┴──────────┴────────────┴─────────────────┘
//! ```
//!
//! ### Bodies
//! - PUT  (0x01 → 0x02): key arr + lifespan vInt + max-idle vInt + value arr
//! - GET  (0x03 → 0x04): key arr; response carries value arr on status OK
//! - PING (0x17 → 0x18): empty
//! - ERROR response (0x50): message arr

mod codec;
mod request;
mod response;
mod varint;

pub use codec::{
    decode_response, encode_request, encode_response, read_request, read_response,
    write_request, write_response,
};
pub use request::{Operation, Request};
pub use response::{Response, Status};

/// First byte of every request
pub const REQUEST_MAGIC: u8 = 0xA0;

/// First byte of every response
pub const RESPONSE_MAGIC: u8 = 0xA1;

/// Protocol version spoken by this client (2.0)
pub const PROTOCOL_VERSION: u8 = 20;

/// Basic client intelligence: no topology or hash awareness
pub const CLIENT_INTELLIGENCE_BASIC: u8 = 0x01;

/// Maximum size of any byte array on the wire (16 MB)
pub const MAX_ARRAY_SIZE: usize = 16 * 1024 * 1024;

/// Operation codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    PutRequest = 0x01,
    PutResponse = 0x02,
    GetRequest = 0x03,
    GetResponse = 0x04,
    PingRequest = 0x17,
    PingResponse = 0x18,
    ErrorResponse = 0x50,
}

impl Opcode {
    /// Parse an opcode byte
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Opcode::PutRequest),
            0x02 => Some(Opcode::PutResponse),
            0x03 => Some(Opcode::GetRequest),
            0x04 => Some(Opcode::GetResponse),
            0x17 => Some(Opcode::PingRequest),
            0x18 => Some(Opcode::PingResponse),
            0x50 => Some(Opcode::ErrorResponse),
            _ => None,
        }
    }

    /// The opcode a successful answer to this request carries
    pub fn response(self) -> Self {
        match self {
            Opcode::PutRequest => Opcode::PutResponse,
            Opcode::GetRequest => Opcode::GetResponse,
            Opcode::PingRequest => Opcode::PingResponse,
            other => other,
        }
    }
}
