//! memcached codec
//!
//! Reads and writes commands and replies over buffered streams.

use std::io::{BufRead, Read, Write};

use crate::error::{CompatError, Result};
use crate::protocol::ProtocolKind;

use super::{Command, Item, Reply, CRLF, MAX_DATA_SIZE, MAX_KEY_LENGTH, MAX_LINE_LENGTH};

fn violation(message: impl Into<String>) -> CompatError {
    CompatError::protocol(ProtocolKind::Memcached, message)
}

/// Check a key against the protocol's key rules
///
/// Keys must be 1..=250 bytes with no whitespace or control characters.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(violation("Key must not be empty"));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(violation(format!(
            "Key too long: {} bytes (max {})",
            key.len(),
            MAX_KEY_LENGTH
        )));
    }
    if key.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(violation(format!(
            "Key contains whitespace or control characters: {key:?}"
        )));
    }
    Ok(())
}

// =============================================================================
// Line and data block helpers
// =============================================================================

/// Read one CRLF-terminated line, without the terminator
fn read_line<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut line = Vec::new();
    let read = reader
        .by_ref()
        .take(MAX_LINE_LENGTH as u64 + CRLF.len() as u64)
        .read_until(b'\n', &mut line)?;

    if read == 0 {
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
    }
    if !line.ends_with(CRLF) {
        return Err(violation(format!(
            "Line not terminated by CRLF within {MAX_LINE_LENGTH} bytes"
        )));
    }
    line.truncate(line.len() - CRLF.len());

    String::from_utf8(line).map_err(|e| violation(format!("Line is not UTF-8: {e}")))
}

/// Read a data block of `len` bytes followed by CRLF
fn read_data<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    if len > MAX_DATA_SIZE {
        return Err(violation(format!(
            "Data block too large: {len} bytes (max {MAX_DATA_SIZE})"
        )));
    }

    let mut data = vec![0u8; len];
    reader.read_exact(&mut data)?;

    let mut terminator = [0u8; 2];
    reader.read_exact(&mut terminator)?;
    if terminator != CRLF {
        return Err(violation("Data block not terminated by CRLF"));
    }

    Ok(data)
}

fn parse_number<T: std::str::FromStr>(field: Option<&str>, what: &str) -> Result<T> {
    let field = field.ok_or_else(|| violation(format!("Missing {what}")))?;
    field
        .parse()
        .map_err(|_| violation(format!("Invalid {what}: {field:?}")))
}

// =============================================================================
// Commands
// =============================================================================

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    if let Some(key) = command.key() {
        validate_key(key)?;
    }

    match command {
        Command::Get { key } => {
            write!(writer, "get {key}\r\n")?;
        }
        Command::Set {
            key,
            flags,
            exptime,
            data,
        } => {
            write!(writer, "set {key} {flags} {exptime} {}\r\n", data.len())?;
            writer.write_all(data)?;
            writer.write_all(CRLF)?;
        }
        Command::Quit => {
            writer.write_all(b"quit\r\n")?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Read a complete command from a stream
pub fn read_command<R: BufRead>(reader: &mut R) -> Result<Command> {
    let line = read_line(reader)?;
    let mut fields = line.split_whitespace();

    match fields.next() {
        Some("get") => {
            let key = fields
                .next()
                .ok_or_else(|| violation("get: missing key"))?
                .to_string();
            Ok(Command::Get { key })
        }
        Some("set") => {
            let key = fields
                .next()
                .ok_or_else(|| violation("set: missing key"))?
                .to_string();
            let flags = parse_number(fields.next(), "flags")?;
            let exptime = parse_number(fields.next(), "exptime")?;
            let len: usize = parse_number(fields.next(), "byte count")?;
            let data = read_data(reader, len)?;
            Ok(Command::Set {
                key,
                flags,
                exptime,
                data,
            })
        }
        Some("quit") => Ok(Command::Quit),
        Some(other) => Err(violation(format!("Unknown command: {other}"))),
        None => Err(violation("Empty command line")),
    }
}

// =============================================================================
// Replies
// =============================================================================

/// Write a reply to a stream
pub fn write_reply<W: Write>(writer: &mut W, reply: &Reply) -> Result<()> {
    match reply {
        Reply::Stored => writer.write_all(b"STORED\r\n")?,
        Reply::NotStored => writer.write_all(b"NOT_STORED\r\n")?,
        Reply::Exists => writer.write_all(b"EXISTS\r\n")?,
        Reply::NotFound => writer.write_all(b"NOT_FOUND\r\n")?,
        Reply::Error => writer.write_all(b"ERROR\r\n")?,
        Reply::ClientError(message) => write!(writer, "CLIENT_ERROR {message}\r\n")?,
        Reply::ServerError(message) => write!(writer, "SERVER_ERROR {message}\r\n")?,
        Reply::Values(items) => {
            for item in items {
                write!(
                    writer,
                    "VALUE {} {} {}\r\n",
                    item.key,
                    item.flags,
                    item.data.len()
                )?;
                writer.write_all(&item.data)?;
                writer.write_all(CRLF)?;
            }
            writer.write_all(b"END\r\n")?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Read a complete reply from a stream
///
/// A retrieval reply is consumed through its terminating `END`.
pub fn read_reply<R: BufRead>(reader: &mut R) -> Result<Reply> {
    let mut items = Vec::new();

    loop {
        let line = read_line(reader)?;

        if let Some(header) = line.strip_prefix("VALUE ") {
            let mut fields = header.split_whitespace();
            let key = fields
                .next()
                .ok_or_else(|| violation("VALUE: missing key"))?
                .to_string();
            let flags = parse_number(fields.next(), "flags")?;
            let len: usize = parse_number(fields.next(), "byte count")?;
            let data = read_data(reader, len)?;
            items.push(Item { key, flags, data });
            continue;
        }

        if !items.is_empty() && line != "END" {
            return Err(violation(format!("Expected VALUE or END, got {line:?}")));
        }

        return match line.as_str() {
            "END" => Ok(Reply::Values(items)),
            "STORED" => Ok(Reply::Stored),
            "NOT_STORED" => Ok(Reply::NotStored),
            "EXISTS" => Ok(Reply::Exists),
            "NOT_FOUND" => Ok(Reply::NotFound),
            "ERROR" => Ok(Reply::Error),
            other => {
                if let Some(message) = other.strip_prefix("CLIENT_ERROR ") {
                    Ok(Reply::ClientError(message.to_string()))
                } else if let Some(message) = other.strip_prefix("SERVER_ERROR ") {
                    Ok(Reply::ServerError(message.to_string()))
                } else {
                    Err(violation(format!("Unexpected reply: {other:?}")))
                }
            }
        };
    }
}
