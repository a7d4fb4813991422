//! Variable-length integers and byte arrays

use std::io::Read;

use bytes::{BufMut, BytesMut};

use crate::error::{CompatError, Result};
use crate::protocol::ProtocolKind;

use super::MAX_ARRAY_SIZE;

const VINT_MAX_BYTES: usize = 5;
const VLONG_MAX_BYTES: usize = 10;

pub fn put_vint(buf: &mut BytesMut, value: u32) {
    put_vlong(buf, u64::from(value));
}

pub fn put_vlong(buf: &mut BytesMut, mut value: u64) {
    while value >= 0x80 {
        buf.put_u8((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

pub fn put_array(buf: &mut BytesMut, bytes: &[u8]) {
    put_vint(buf, bytes.len() as u32);
    buf.put_slice(bytes);
}

pub fn read_u8<R: Read>(reader: &mut R) -> Result<u8> {
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte)?;
    Ok(byte[0])
}

pub fn read_vint<R: Read>(reader: &mut R) -> Result<u32> {
    let value = read_varint(reader, VINT_MAX_BYTES)?;
    u32::try_from(value).map_err(|_| {
        CompatError::protocol(ProtocolKind::HotRod, format!("vInt out of range: {value}"))
    })
}

pub fn read_vlong<R: Read>(reader: &mut R) -> Result<u64> {
    read_varint(reader, VLONG_MAX_BYTES)
}

pub fn read_array<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let len = read_vint(reader)? as usize;
    if len > MAX_ARRAY_SIZE {
        return Err(CompatError::protocol(
            ProtocolKind::HotRod,
            format!("Array too large: {len} bytes (max {MAX_ARRAY_SIZE})"),
        ));
    }

    let mut bytes = vec![0u8; len];
    if len > 0 {
        reader.read_exact(&mut bytes)?;
    }
    Ok(bytes)
}

pub fn read_string<R: Read>(reader: &mut R) -> Result<String> {
    let bytes = read_array(reader)?;
    String::from_utf8(bytes).map_err(|e| {
        CompatError::protocol(ProtocolKind::HotRod, format!("invalid UTF-8 string: {e}"))
    })
}

fn read_varint<R: Read>(reader: &mut R, max_bytes: usize) -> Result<u64> {
    let mut value: u64 = 0;
    for i in 0..max_bytes {
        let byte = read_u8(reader)?;
        value |= u64::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(CompatError::protocol(
        ProtocolKind::HotRod,
        format!("variable-length integer exceeds {max_bytes} bytes"),
    ))
}
