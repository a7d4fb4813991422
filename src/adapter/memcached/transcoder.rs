//! Value transcoding for the memcached adapter
//!
//! The memcached client stores structured values, so raw bytes are wrapped
//! by the byte codec on the way out and unwrapped on the way back.
//!
//! Decode failures are logged and swallowed: the read degrades to "absent"
//! instead of failing the caller. Encode failures are returned.

use crate::codec::ByteCodec;
use crate::error::{CompatError, Result};

/// Flags and payload exactly as stored by memcached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedData {
    flags: u32,
    data: Vec<u8>,
}

impl CachedData {
    /// Wrap a payload; fails if it exceeds `max_size`
    pub fn new(flags: u32, data: Vec<u8>, max_size: usize) -> Result<Self> {
        if data.len() > max_size {
            return Err(CompatError::PayloadTooLarge {
                size: data.len(),
                max: max_size,
            });
        }
        Ok(Self { flags, data })
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// Converts values of `T` to and from stored payloads
pub trait Transcoder<T> {
    /// Encode a value for storage
    fn encode(&self, value: &T) -> Result<CachedData>;

    /// Decode a stored payload; `None` if it cannot be decoded
    fn decode(&self, data: &CachedData) -> Option<T>;

    /// Whether decoding may be deferred past the read. Decoding here always
    /// completes before `get` returns.
    fn supports_async_decode(&self, _data: &CachedData) -> bool {
        false
    }

    /// Largest stored payload this transcoder produces or accepts
    fn max_size(&self) -> usize;
}

/// Transcoder for raw bytes built on the byte codec
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteTranscoder {
    codec: ByteCodec,
}

impl ByteTranscoder {
    /// Transcoder for values of at most `max_size` bytes
    pub fn new(max_size: usize) -> Self {
        Self {
            codec: ByteCodec::new(max_size),
        }
    }
}

impl Transcoder<Vec<u8>> for ByteTranscoder {
    fn encode(&self, value: &Vec<u8>) -> Result<CachedData> {
        let data = self.codec.encode(value)?;
        CachedData::new(0, data, self.max_size())
    }

    fn decode(&self, data: &CachedData) -> Option<Vec<u8>> {
        match self.codec.decode::<Vec<u8>>(data.data()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(
                    "Discarding undecodable memcached payload ({} bytes, flags {}): {}",
                    data.data().len(),
                    data.flags(),
                    e
                );
                None
            }
        }
    }

    /// Encoded form of the largest accepted value, length prefix included
    fn max_size(&self) -> usize {
        self.codec.max_encoded_size()
    }
}
