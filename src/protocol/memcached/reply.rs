//! memcached reply definitions

/// One `VALUE` entry of a retrieval reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub key: String,
    pub flags: u32,
    pub data: Vec<u8>,
}

/// A server reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Stored,
    NotStored,
    Exists,
    NotFound,

    /// Retrieval result; empty when no key was found
    Values(Vec<Item>),

    /// Unknown command
    Error,
    ClientError(String),
    ServerError(String),
}

impl Reply {
    /// True for `ERROR`, `CLIENT_ERROR` and `SERVER_ERROR`
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Reply::Error | Reply::ClientError(_) | Reply::ServerError(_)
        )
    }
}
