//! Chain-level records: blocks and the per-chain ingestion cursor

use crate::common::identifiers::{ChainId, Hash32};
use serde::{Deserialize, Serialize};

/// A block observed by the ingestion process
///
/// Unique per `(chain_id, number)`. Deleting a block is the unit of reorg
/// rollback: every event recorded at the block goes with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub chain_id: ChainId,
    pub number: u64,
    pub hash: Hash32,
    /// Unix seconds
    pub time: u64,
    pub num_events: u32,
    /// Stamped from the chain's current fork epoch when `None` at insert time
    pub fork_epoch: Option<u64>,
}

impl Block {
    pub fn new(chain_id: ChainId, number: u64, hash: Hash32, time: u64) -> Self {
        Self {
            chain_id,
            number,
            hash,
            time,
            num_events: 0,
            fork_epoch: None,
        }
    }

    pub fn block_ref(&self) -> BlockRef {
        BlockRef {
            chain_id: self.chain_id,
            number: self.number,
        }
    }
}

/// Addressing pair for a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockRef {
    pub chain_id: ChainId,
    pub number: u64,
}

impl BlockRef {
    pub const fn new(chain_id: ChainId, number: u64) -> Self {
        Self { chain_id, number }
    }
}

/// Per-chain ingestion cursor plus the fork epoch counter
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChainCursor {
    pub order_key: u64,
    pub unique_key: Option<Hash32>,
    /// Unix seconds of the last cursor write
    pub last_updated: u64,
    pub fork_epoch: u64,
}
