//! Error types for cachecompat
//!
//! Provides a unified error type for all operations, grouped by the
//! failure taxonomy of a verification run.

use thiserror::Error;

use crate::protocol::ProtocolKind;
use crate::verify::Comparison;

/// Result type alias using CompatError
pub type Result<T> = std::result::Result<T, CompatError>;

/// Unified error type for cachecompat operations
#[derive(Debug, Error)]
pub enum CompatError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Communication Errors
    // -------------------------------------------------------------------------
    #[error("{protocol} communication error: {message}")]
    Communication {
        protocol: ProtocolKind,
        message: String,
    },

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("{protocol} protocol error: {message}")]
    Protocol {
        protocol: ProtocolKind,
        message: String,
    },

    #[error("REST protocol error: {method} {url} returned status {status}")]
    UnexpectedStatus {
        method: String,
        url: String,
        status: u16,
    },

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    // -------------------------------------------------------------------------
    // Verification Errors
    // -------------------------------------------------------------------------
    #[error("Length mismatch: left has {left} bytes, right has {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error(
        "Consistency check failed with {} divergence(s):\n{}",
        .divergences.len(),
        summarize(.divergences)
    )]
    Inconsistent { divergences: Vec<Comparison> },

    #[error("Step {step} (key {key:?}) failed via {protocol}: {source}")]
    Step {
        step: usize,
        key: String,
        protocol: ProtocolKind,
        source: Box<CompatError>,
    },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CompatError {
    /// Shorthand for a protocol error raised by `protocol`
    pub fn protocol(protocol: ProtocolKind, message: impl Into<String>) -> Self {
        CompatError::Protocol {
            protocol,
            message: message.into(),
        }
    }

    /// Shorthand for a communication error raised by `protocol`
    pub fn communication(protocol: ProtocolKind, message: impl Into<String>) -> Self {
        CompatError::Communication {
            protocol,
            message: message.into(),
        }
    }

    /// Reclassify raw I/O failures as communication errors of `protocol`.
    ///
    /// Every other variant passes through untouched.
    pub fn on_wire(self, protocol: ProtocolKind) -> Self {
        match self {
            CompatError::Io(e) => CompatError::communication(protocol, e.to_string()),
            other => other,
        }
    }

    /// Attach step context. Errors that already carry it are returned as-is.
    pub fn in_step(self, step: usize, key: &str, protocol: ProtocolKind) -> Self {
        match self {
            err @ CompatError::Step { .. } => err,
            other => CompatError::Step {
                step,
                key: key.to_string(),
                protocol,
                source: Box::new(other),
            },
        }
    }

    /// The protocol this error originated from, if any
    pub fn origin(&self) -> Option<ProtocolKind> {
        match self {
            CompatError::Communication { protocol, .. }
            | CompatError::Protocol { protocol, .. }
            | CompatError::Step { protocol, .. } => Some(*protocol),
            CompatError::UnexpectedStatus { .. } => Some(ProtocolKind::Rest),
            _ => None,
        }
    }

    /// Innermost error, looking through step context
    pub fn root(&self) -> &CompatError {
        match self {
            CompatError::Step { source, .. } => source.root(),
            other => other,
        }
    }
}

fn summarize(divergences: &[Comparison]) -> String {
    divergences
        .iter()
        .map(|d| format!("  - {d}"))
        .collect::<Vec<_>>()
        .join("\n")
}
