//! Byte Codec
//!
//! Whole-object serialization of in-process values to and from opaque byte
//! sequences. Only the memcached front-end needs it: its transcoder carries
//! structured values, so raw bytes are wrapped in an encoded `Vec<u8>`
//! before framing.
//!
//! ## Format
//! bincode with fixed-width integers and no version header. It only has to
//! round-trip within this process's own types, so no cross-language
//! compatibility is attempted.
//!
//! ```text
//! Vec<u8> [1, 2, 3]  →  03 00 00 00 00 00 00 00 | 01 02 03
//!                       └── len (u64 LE) ──────┘  └ data ┘
//! ```

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CompatError, Result};

/// Default payload limit (1 MiB)
pub const MAX_PAYLOAD_SIZE: usize = 1024 * 1024;

/// bincode's `u64` length in front of a byte sequence
pub const LENGTH_PREFIX: usize = 8;

/// Serializer with an enforced payload limit
#[derive(Debug, Clone, Copy)]
pub struct ByteCodec {
    max_size: usize,
}

impl Default for ByteCodec {
    fn default() -> Self {
        Self::new(MAX_PAYLOAD_SIZE)
    }
}

impl ByteCodec {
    /// Create a codec that rejects payloads larger than `max_size` bytes
    ///
    /// The limit applies to the value's payload. The 8-byte length prefix
    /// bincode puts in front of a byte sequence is allowed on top of it.
    pub fn new(max_size: usize) -> Self {
        Self { max_size }
    }

    /// Largest payload this codec accepts
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Largest encoded form this codec produces or accepts
    pub fn max_encoded_size(&self) -> usize {
        self.max_size.saturating_add(LENGTH_PREFIX)
    }

    /// Encode a value
    ///
    /// The encoded size is computed first so oversized values are rejected
    /// before any buffer is allocated.
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        let size = bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .serialized_size(value)
            .map_err(|e| CompatError::Codec(format!("cannot size value: {e}")))?
            as usize;

        self.check_encoded_size(size)?;

        self.options()
            .serialize(value)
            .map_err(|e| CompatError::Codec(format!("cannot encode value: {e}")))
    }

    /// Decode a value; trailing bytes are an error
    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        self.check_encoded_size(bytes.len())?;

        self.options()
            .deserialize(bytes)
            .map_err(|e| CompatError::Codec(format!("cannot decode value: {e}")))
    }

    /// Errors report the payload size, without the length prefix
    fn check_encoded_size(&self, size: usize) -> Result<()> {
        if size > self.max_encoded_size() {
            return Err(CompatError::PayloadTooLarge {
                size: size - LENGTH_PREFIX,
                max: self.max_size,
            });
        }
        Ok(())
    }

    fn options(&self) -> impl Options {
        bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .with_limit(self.max_encoded_size() as u64)
    }
}

/// Encode with the default 1 MiB limit
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    ByteCodec::default().encode(value)
}

/// Decode with the default 1 MiB limit
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    ByteCodec::default().decode(bytes)
}
