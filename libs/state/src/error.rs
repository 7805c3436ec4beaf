//! Engine error taxonomy
//!
//! Every rejected write aborts its whole transaction, so a caller that sees
//! an error can assume the store is exactly as it was before the call.
//! Absent data on read paths is `None`, never an error.

use codec::CodecError;
use thiserror::Error;
use types::ValidationError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Payload could not be decoded, or a decoded field is out of range
    #[error("Malformed {kind} payload: {reason}")]
    MalformedPayload { kind: &'static str, reason: String },

    /// Attempted mutation of an immutable event row
    #[error("Updates are not allowed on {table}: {reason}")]
    ImmutableRecord { table: &'static str, reason: String },

    /// Ordering-key component exceeds its bit budget
    #[error("Ordering key overflow: {component} = {value} exceeds {bits}-bit budget")]
    Overflow {
        component: &'static str,
        value: u64,
        bits: u32,
    },

    /// Write violates a key, reference or pool configuration constraint
    #[error("Constraint violation on {table}: {reason}")]
    ConstraintViolation { table: &'static str, reason: String },

    /// Query argument outside its accepted domain
    #[error("Invalid argument {argument}: {reason}")]
    InvalidArgument {
        argument: &'static str,
        reason: String,
    },
}

impl EngineError {
    pub fn immutable(table: &'static str, reason: impl Into<String>) -> Self {
        Self::ImmutableRecord {
            table,
            reason: reason.into(),
        }
    }

    pub fn constraint(table: &'static str, reason: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            table,
            reason: reason.into(),
        }
    }

    pub fn invalid_argument(argument: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument,
            reason: reason.into(),
        }
    }
}

impl From<CodecError> for EngineError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::MalformedPayload { kind, reason } => Self::MalformedPayload { kind, reason },
            CodecError::Overflow {
                component,
                value,
                bits,
                ..
            } => Self::Overflow {
                component,
                value,
                bits,
            },
        }
    }
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        Self::constraint("pool_keys", err.to_string())
    }
}

/// Result type for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;
