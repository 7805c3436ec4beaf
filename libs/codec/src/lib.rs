//! # Strata Event Codec
//!
//! ## Purpose
//!
//! The "rules" layer between raw chain data and the state engine:
//! - Decoding of fixed-layout packed event payloads into typed facts
//! - Ordering-key assignment for every event position
//!
//! ## Architecture Role
//!
//! ```text
//! ingestion → [codec] → state-engine
//!     ↑          ↓           ↓
//! hex payloads  typed facts  event store + projections
//!               event ids
//! ```
//!
//! ## What This Crate Does NOT Contain
//! - Storage, projections or reorg handling (belongs in `state-engine`)
//! - Data structure definitions (belongs in `libs/types`)
//!
//! Decoding is pure: a decoder allocates nothing beyond the struct it returns
//! and rejects any payload whose byte length differs from the kind's width.

pub mod decoders;
pub mod error;
pub mod event_id;
pub mod packed;

pub use decoders::{decode_payload, payload_len, PackedEvent};
pub use error::{CodecError, CodecResult};
pub use event_id::{
    block_start, compute_event_id, decompose_event_id, event_id_for, BLOCK_NUMBER_BITS,
    EVENT_INDEX_BITS, MIN_ANCHOR, TRANSACTION_INDEX_BITS,
};
pub use packed::PackedReader;
