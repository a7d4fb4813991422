//! Equality Oracle
//!
//! Strict byte-sequence comparison used after every read.
//!
//! Rules, in order:
//! 1. both absent → equal
//! 2. exactly one absent → not equal
//! 3. different lengths → [`CompatError::LengthMismatch`]; a structurally
//!    broken payload, not a plain inequality
//! 4. same length → equal iff every byte matches

use crate::error::{CompatError, Result};

/// Compare two optional byte sequences
pub fn equals(left: Option<&[u8]>, right: Option<&[u8]>) -> Result<bool> {
    match (left, right) {
        (None, None) => Ok(true),
        (None, Some(_)) | (Some(_), None) => Ok(false),
        (Some(l), Some(r)) if l.len() != r.len() => Err(CompatError::LengthMismatch {
            left: l.len(),
            right: r.len(),
        }),
        (Some(l), Some(r)) => Ok(l.iter().zip(r).all(|(a, b)| a == b)),
    }
}
