//! # Fork Ledger
//!
//! One cursor record per chain. The `fork_epoch` counter moves forward once
//! per delete statement that removed at least one event row of the chain,
//! however many rows that statement removed. Blocks inserted without an
//! explicit epoch are stamped with the chain's current value.

use crate::journal::{JournaledMap, Transactional};
use std::collections::BTreeSet;
use tracing::info;
use types::{ChainCursor, ChainId, Hash32};

#[derive(Debug, Clone, Default)]
pub struct ForkLedger {
    chains: JournaledMap<ChainId, ChainCursor>,
}

impl ForkLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a chain at epoch 0; known chains are left untouched
    pub fn register(&mut self, chain_id: ChainId) {
        if !self.chains.contains_key(&chain_id) {
            self.chains.insert(chain_id, ChainCursor::default());
        }
    }

    pub fn cursor(&self, chain_id: ChainId) -> Option<&ChainCursor> {
        self.chains.get(&chain_id)
    }

    /// Current epoch; chains never seen are at 0
    pub fn epoch(&self, chain_id: ChainId) -> u64 {
        self.chains
            .get(&chain_id)
            .map(|cursor| cursor.fork_epoch)
            .unwrap_or(0)
    }

    pub fn chains(&self) -> impl Iterator<Item = ChainId> + '_ {
        self.chains.iter().map(|(id, _)| *id)
    }

    /// Advance each chain of one statement's delete set by exactly one
    pub fn bump(&mut self, touched: &BTreeSet<ChainId>) {
        for chain_id in touched {
            let mut cursor = self.chains.get(chain_id).cloned().unwrap_or_default();
            cursor.fork_epoch += 1;
            info!(
                chain_id = chain_id.inner(),
                fork_epoch = cursor.fork_epoch,
                "Fork epoch advanced"
            );
            self.chains.insert(*chain_id, cursor);
        }
    }

    /// Record the ingestion position; the epoch is never taken from the caller
    pub fn upsert_cursor(
        &mut self,
        chain_id: ChainId,
        order_key: u64,
        unique_key: Option<Hash32>,
        last_updated: u64,
    ) -> ChainCursor {
        let fork_epoch = self.epoch(chain_id);
        let cursor = ChainCursor {
            order_key,
            unique_key,
            last_updated,
            fork_epoch,
        };
        self.chains.insert(chain_id, cursor.clone());
        cursor
    }
}

impl Transactional for ForkLedger {
    fn commit(&mut self) {
        self.chains.commit();
    }

    fn rollback(&mut self) {
        self.chains.rollback();
    }
}
