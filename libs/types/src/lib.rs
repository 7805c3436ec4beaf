//! # Strata Types Library
//!
//! Shared type system for the Strata pool-event indexer.
//!
//! ## Design Philosophy
//!
//! - **Typed Identifiers**: chain ids, pool key ids and event ids cannot be mixed up
//! - **No Precision Loss**: every field wider than 64 bits is an arbitrary-precision integer
//! - **Validated Metadata**: pool configuration is classified once, at construction
//! - **Clear Boundaries**: decoding lives in `codec`, projection logic in `state-engine`;
//!   this crate only defines the facts they exchange
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{Address, ChainId, PoolConfig};
//!
//! let chain = ChainId::new(1);
//! let token: Address = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".parse().unwrap();
//! assert_eq!(token.to_string(), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
//!
//! let config = PoolConfig::from_parts(Some(100), None, None).unwrap();
//! assert_eq!(config.tick_spacing(), Some(100));
//! # let _ = chain;
//! ```

pub mod chain;
pub mod common;
pub mod events;
pub mod pool;

pub use chain::{Block, BlockRef, ChainCursor};
pub use common::errors::ValidationError;
pub use common::identifiers::{Address, ChainId, EventId, Hash32, PoolKeyId};
pub use events::{
    EventKind, EventLocation, EventPayload, FeesAccumulated, FeesDonated, LimitOrderClosed,
    LimitOrderPlaced, NewEvent, NftTransfer, OracleSnapshot, OrderProceedsWithdrawn, OrderUpdated,
    PoolBoosted, PoolInitialized, PositionFeesCollected, PositionUpdated, Swapped,
    VirtualOrdersExecuted,
};
pub use pool::{sort_tokens, PoolConfig, PoolKey, PoolKeyParams, MAX_TICK, MIN_TICK};

// Arbitrary-precision integers appear in every public payload
pub use num_bigint::{BigInt, BigUint};
