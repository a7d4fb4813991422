//! Hot Rod request definitions

use super::{Opcode, CLIENT_INTELLIGENCE_BASIC, PROTOCOL_VERSION};

/// Operation carried by a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Store a value
    Put {
        key: Vec<u8>,
        lifespan_secs: u32,
        max_idle_secs: u32,
        value: Vec<u8>,
    },

    /// Fetch a value
    Get { key: Vec<u8> },

    /// Health check; also validates the cache name
    Ping,
}

impl Operation {
    /// Request opcode for this operation
    pub fn opcode(&self) -> Opcode {
        match self {
            Operation::Put { .. } => Opcode::PutRequest,
            Operation::Get { .. } => Opcode::GetRequest,
            Operation::Ping => Opcode::PingRequest,
        }
    }
}

/// A complete request frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub message_id: u64,
    pub version: u8,
    pub cache_name: String,
    pub flags: u32,
    pub client_intelligence: u8,
    pub topology_id: u32,
    pub operation: Operation,
}

impl Request {
    /// Request with default header fields for a basic-intelligence client
    pub fn new(message_id: u64, cache_name: impl Into<String>, operation: Operation) -> Self {
        Self {
            message_id,
            version: PROTOCOL_VERSION,
            cache_name: cache_name.into(),
            flags: 0,
            client_intelligence: CLIENT_INTELLIGENCE_BASIC,
            topology_id: 0,
            operation,
        }
    }
}
