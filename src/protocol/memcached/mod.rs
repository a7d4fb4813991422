//! memcached Text Protocol
//!
//! Line-based protocol; every line ends with `\r\n`.
//!
//! ### Commands
//! ```text
//! get <key>\r\n
//! set <key> <flags> <exptime> <bytes>\r\n<data>\r\n
//! quit\r\n
//! ```
//!
//! ### Replies
//! ```text
//! STORED | NOT_STORED | EXISTS | NOT_FOUND | ERROR
//! CLIENT_ERROR <msg> | SERVER_ERROR <msg>
//! VALUE <key> <flags> <bytes>\r\n<data>\r\n ... END
//! ```

mod codec;
mod command;
mod reply;

pub use codec::{read_command, read_reply, validate_key, write_command, write_reply};
pub use command::Command;
pub use reply::{Item, Reply};

/// Longest key the protocol accepts (bytes)
pub const MAX_KEY_LENGTH: usize = 250;

/// Longest command or reply line, excluding data blocks
pub const MAX_LINE_LENGTH: usize = 2048;

/// Largest data block accepted from the wire (16 MB)
pub const MAX_DATA_SIZE: usize = 16 * 1024 * 1024;

/// Line terminator
pub const CRLF: &[u8] = b"\r\n";
