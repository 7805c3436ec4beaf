//! Error types for identifier parsing and pool configuration validation

use thiserror::Error;

/// Errors raised while validating typed identifiers and pool metadata
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Hex input could not be parsed into a fixed-width identifier
    #[error("Invalid hex for {what}: '{input}' ({reason})")]
    InvalidHex {
        what: &'static str,
        input: String,
        reason: String,
    },

    /// A concentrated pool was declared without a tick spacing
    #[error("Concentrated pool requires a tick spacing")]
    MissingTickSpacing,

    /// A stableswap pool was declared without its center tick or amplification
    #[error("Stableswap pool requires {field}")]
    MissingStableswapField { field: &'static str },

    /// Fields of one pool type were set on a pool of the other type
    #[error("{pool_type} pool must not set {field}")]
    ForbiddenField {
        pool_type: &'static str,
        field: &'static str,
    },

    /// Amplification outside the accepted range
    #[error("Amplification {value} is not in allowed range [{min}, {max}]")]
    AmplificationOutOfRange { value: u8, min: u8, max: u8 },

    /// Center tick outside the representable tick range
    #[error("Center tick {value} is not in allowed range [{min}, {max}]")]
    CenterTickOutOfRange { value: i32, min: i32, max: i32 },

    /// Pool tokens must be sorted and distinct
    #[error("Pool tokens must satisfy token0 < token1")]
    UnsortedTokens,

    /// Custom validation failure with message
    #[error("Validation failed: {message}")]
    Custom { message: String },
}
