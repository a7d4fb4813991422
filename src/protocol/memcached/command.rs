//! memcached command definitions

/// A memcached command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch a single key
    Get { key: String },

    /// Store a value unconditionally
    Set {
        key: String,
        flags: u32,
        exptime: u32,
        data: Vec<u8>,
    },

    /// Close the connection
    Quit,
}

impl Command {
    /// Key the command addresses, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            Command::Get { key } | Command::Set { key, .. } => Some(key.as_str()),
            Command::Quit => None,
        }
    }
}
