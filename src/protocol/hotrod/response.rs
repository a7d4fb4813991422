//! Hot Rod response definitions

use super::Opcode;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotExecuted = 0x01,
    KeyDoesNotExist = 0x02,
    InvalidMagicOrMessageId = 0x81,
    UnknownCommand = 0x82,
    UnknownVersion = 0x83,
    ParseError = 0x84,
    ServerError = 0x85,
    Timeout = 0x86,
}

impl Status {
    /// Parse a status byte
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Status::Ok),
            0x01 => Some(Status::NotExecuted),
            0x02 => Some(Status::KeyDoesNotExist),
            0x81 => Some(Status::InvalidMagicOrMessageId),
            0x82 => Some(Status::UnknownCommand),
            0x83 => Some(Status::UnknownVersion),
            0x84 => Some(Status::ParseError),
            0x85 => Some(Status::ServerError),
            0x86 => Some(Status::Timeout),
            _ => None,
        }
    }

    /// True for the 0x8x server-side error family
    pub fn is_error(&self) -> bool {
        (*self as u8) >= 0x81
    }
}

/// A complete response frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub message_id: u64,
    pub opcode: Opcode,
    pub status: Status,

    /// Value for a successful GET, message for an ERROR, otherwise empty
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Successful response without a body
    pub fn ok(message_id: u64, opcode: Opcode) -> Self {
        Self {
            message_id,
            opcode,
            status: Status::Ok,
            payload: None,
        }
    }

    /// Successful GET carrying a value
    pub fn value(message_id: u64, value: Vec<u8>) -> Self {
        Self {
            message_id,
            opcode: Opcode::GetResponse,
            status: Status::Ok,
            payload: Some(value),
        }
    }

    /// Key-does-not-exist response for `opcode`
    pub fn key_does_not_exist(message_id: u64, opcode: Opcode) -> Self {
        Self {
            message_id,
            opcode,
            status: Status::KeyDoesNotExist,
            payload: None,
        }
    }

    /// ERROR response with a message
    pub fn error(message_id: u64, status: Status, message: &str) -> Self {
        Self {
            message_id,
            opcode: Opcode::ErrorResponse,
            status,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Error message of an ERROR response, lossily decoded
    pub fn error_message(&self) -> Option<String> {
        match (self.opcode, &self.payload) {
            (Opcode::ErrorResponse, Some(bytes)) => {
                Some(String::from_utf8_lossy(bytes).into_owned())
            }
            _ => None,
        }
    }
}
