//! # Event Ordering Keys
//!
//! Maps `(block_number, transaction_index, event_index)` onto one `i64` that
//! sorts exactly like the triple. Components get 32, 16 and 16 bits
//! respectively, packed below a fixed anchor:
//!
//! ```text
//! key = MIN_ANCHOR + block_number * 2^32 + transaction_index * 2^16 + event_index
//! ```
//!
//! `MIN_ANCHOR` is `i64::MIN`, so the whole 64-bit component space lands on
//! `[i64::MIN, i64::MAX]` with nothing left over on either side. A component
//! outside its budget is an `Overflow` error; it never wraps into a
//! neighbouring block's range.

use crate::error::{CodecError, CodecResult};
use types::{EventId, EventLocation};

pub const MIN_ANCHOR: i64 = i64::MIN;

pub const BLOCK_NUMBER_BITS: u32 = 32;
pub const TRANSACTION_INDEX_BITS: u32 = 16;
pub const EVENT_INDEX_BITS: u32 = 16;

const fn budget(bits: u32) -> u64 {
    (1u64 << bits) - 1
}

fn check(component: &'static str, value: u64, bits: u32) -> CodecResult<()> {
    if value > budget(bits) {
        return Err(CodecError::overflow(component, value, bits));
    }
    Ok(())
}

/// Ordering key for one event position
pub fn compute_event_id(
    block_number: u64,
    transaction_index: u64,
    event_index: u64,
) -> CodecResult<EventId> {
    check("block_number", block_number, BLOCK_NUMBER_BITS)?;
    check("transaction_index", transaction_index, TRANSACTION_INDEX_BITS)?;
    check("event_index", event_index, EVENT_INDEX_BITS)?;

    let offset = (block_number << (TRANSACTION_INDEX_BITS + EVENT_INDEX_BITS))
        | (transaction_index << EVENT_INDEX_BITS)
        | event_index;
    // offset <= u64::MAX and MIN_ANCHOR = i64::MIN, so the sum is in range
    Ok(EventId(MIN_ANCHOR.wrapping_add(offset as i64)))
}

/// Ordering key for an event's addressing tuple
pub fn event_id_for(location: &EventLocation) -> CodecResult<EventId> {
    compute_event_id(
        location.block_number,
        location.transaction_index,
        location.event_index,
    )
}

/// Recover `(block_number, transaction_index, event_index)` from a key
pub fn decompose_event_id(id: EventId) -> (u64, u64, u64) {
    let offset = id.0.wrapping_sub(MIN_ANCHOR) as u64;
    (
        offset >> (TRANSACTION_INDEX_BITS + EVENT_INDEX_BITS),
        (offset >> EVENT_INDEX_BITS) & budget(TRANSACTION_INDEX_BITS),
        offset & budget(EVENT_INDEX_BITS),
    )
}

/// First key of a block; every event of the block sorts at or after it
pub fn block_start(block_number: u64) -> CodecResult<EventId> {
    compute_event_id(block_number, 0, 0)
}
