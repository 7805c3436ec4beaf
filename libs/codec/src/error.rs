//! Codec-level errors for event decoding and ordering-key assignment
//!
//! Each variant carries enough context to identify the offending record
//! without re-decoding it: the event kind for payload failures, the
//! component name and its budget for ordering-key overflow.

use thiserror::Error;

/// Decoding and key-assignment errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Payload is not a well-formed record of the declared kind
    #[error("Malformed {kind} payload: {reason}")]
    MalformedPayload { kind: &'static str, reason: String },

    /// Ordering-key component exceeds its bit budget
    #[error("Ordering key overflow: {component} = {value} exceeds {limit} ({bits}-bit budget)")]
    Overflow {
        component: &'static str,
        value: u64,
        limit: u64,
        bits: u32,
    },
}

impl CodecError {
    pub fn malformed(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            kind,
            reason: reason.into(),
        }
    }

    /// Payload byte length differs from the kind's fixed width
    pub fn wrong_length(kind: &'static str, expected: usize, got: usize) -> Self {
        Self::malformed(kind, format!("expected {expected} bytes, got {got}"))
    }

    pub fn overflow(component: &'static str, value: u64, bits: u32) -> Self {
        Self::Overflow {
            component,
            value,
            limit: (1u64 << bits) - 1,
            bits,
        }
    }
}

/// Result type for codec operations
pub type CodecResult<T> = std::result::Result<T, CodecError>;
