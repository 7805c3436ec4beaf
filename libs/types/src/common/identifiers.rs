//! # Typed Identifiers
//!
//! Zero-cost newtype wrappers for every identifier the indexer passes around.
//! Chain ids, pool key ids and event ids are plain integers on the wire, and
//! mixing them up is the classic bug in an event store keyed by several of
//! them at once. The wrappers make that a compile error.
//!
//! Byte-array identifiers (`Address`, `Hash32`) render as fixed-width hex.
//! `Address` uses mixed-case checksum formatting so rendered values compare
//! equal to what block explorers and decoders elsewhere print.

use crate::common::errors::ValidationError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

/// Macro for generating typed `u64` ID wrappers
///
/// ```rust
/// use types::define_typed_id;
///
/// define_typed_id!(
///     /// Example identifier
///     WidgetId
/// );
///
/// let id = WidgetId::new(7);
/// assert_eq!(id.inner(), 7);
/// ```
#[macro_export]
macro_rules! define_typed_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Default,
            serde::Serialize,
            serde::Deserialize
        )]
        #[serde(transparent)]
        #[repr(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Create a new typed ID
            #[inline(always)]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Extract the inner u64 value
            #[inline(always)]
            pub const fn inner(&self) -> u64 {
                self.0
            }

            /// Generate next sequential ID
            #[inline(always)]
            pub fn next(&self) -> Self {
                Self(self.0.wrapping_add(1))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<u64> for $name {
            #[inline(always)]
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            #[inline(always)]
            fn from(id: $name) -> u64 {
                id.0
            }
        }
    };
}

/// Macro for fixed-width byte identifiers rendered as hex
macro_rules! define_byte_wrapper {
    (
        $(#[$meta:meta])*
        $name:ident, $len:expr, $what:expr
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[repr(transparent)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Width of the identifier in bytes
            pub const LEN: usize = $len;

            /// All-zero value
            pub const ZERO: Self = Self([0u8; $len]);

            #[inline(always)]
            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            #[inline(always)]
            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            /// Lowercase hex with `0x` prefix
            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }

            /// Build from a big-endian byte slice, left-padding with zeros
            ///
            /// Returns `None` when the slice is wider than the identifier.
            pub fn from_be_slice(bytes: &[u8]) -> Option<Self> {
                if bytes.len() > $len {
                    return None;
                }
                let mut out = [0u8; $len];
                out[$len - bytes.len()..].copy_from_slice(bytes);
                Some(Self(out))
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let digits = s.strip_prefix("0x").unwrap_or(s);
                let invalid = |reason: String| ValidationError::InvalidHex {
                    what: $what,
                    input: s.to_string(),
                    reason,
                };
                if digits.len() != $len * 2 {
                    return Err(invalid(format!(
                        "expected {} hex digits, got {}",
                        $len * 2,
                        digits.len()
                    )));
                }
                let mut out = [0u8; $len];
                hex::decode_to_slice(digits, &mut out).map_err(|e| invalid(e.to_string()))?;
                Ok(Self(out))
            }
        }

        impl From<[u8; $len]> for $name {
            #[inline(always)]
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

define_typed_id!(
    /// Blockchain network identifier (EIP-155 chain id)
    ChainId
);

define_typed_id!(
    /// Surrogate key assigned to a pool key when it is first recorded
    PoolKeyId
);

define_byte_wrapper!(
    /// 20-byte account or contract address
    Address, 20, "address"
);

define_byte_wrapper!(
    /// 32-byte opaque identifier (pool ids, salts, transaction hashes, token ids)
    Hash32, 32, "hash"
);

impl Address {
    /// Mixed-case checksum rendering (EIP-55)
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = Keccak256::digest(lower.as_bytes());
        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Totally ordered event identifier, unique per chain
///
/// Values are produced by the ordering-key assignor in the codec crate; the
/// ordering of `EventId`s is the ordering of `(block, transaction, event)`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct EventId(pub i64);

impl EventId {
    /// Smallest possible id, useful as an exclusive lower bound in range scans
    pub const MIN: EventId = EventId(i64::MIN);
    pub const MAX: EventId = EventId(i64::MAX);

    #[inline(always)]
    pub const fn inner(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventId({})", self.0)
    }
}
