//! # Event Store
//!
//! Append-only event log keyed by `(chain_id, event_id)` with the secondary
//! indexes projections need, plus the block and pool key tables events
//! reference. Rows are never updated in place: the only mutations are insert
//! and delete, and a delete always hands the removed row back so the caller
//! can fan out projection reverts for it.

use crate::error::{EngineError, EngineResult};
use crate::journal::{JournaledMap, Transactional};
use serde::{Deserialize, Serialize};
use std::ops::Bound;
use types::{
    sort_tokens, Address, Block, ChainId, EventId, EventKind, EventLocation, EventPayload, Hash32,
    PoolKey, PoolKeyId,
};

/// An event row as recorded in the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub event_id: EventId,
    pub location: EventLocation,
    pub pool_key_id: Option<PoolKeyId>,
    /// Time of the owning block, fixed at insert
    pub block_time: u64,
    pub payload: EventPayload,
}

impl StoredEvent {
    pub fn chain_id(&self) -> ChainId {
        self.location.chain_id
    }

    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    pub fn key(&self) -> (ChainId, EventId) {
        (self.location.chain_id, self.event_id)
    }
}

type PoolIndexKey = (PoolKeyId, EventKind, EventId);
type NftIndexKey = (ChainId, Address, Hash32, EventId);

/// Event rows and their secondary indexes
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: JournaledMap<(ChainId, EventId), StoredEvent>,
    by_block: JournaledMap<(ChainId, u64, EventId), ()>,
    by_pool: JournaledMap<PoolIndexKey, ChainId>,
    by_nft: JournaledMap<NftIndexKey, ()>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, chain_id: ChainId, event_id: EventId) -> Option<&StoredEvent> {
        self.events.get(&(chain_id, event_id))
    }

    /// Every event in `(chain_id, event_id)` order
    pub fn iter(&self) -> impl Iterator<Item = &StoredEvent> {
        self.events.iter().map(|(_, event)| event)
    }

    /// Append a row; an existing `(chain_id, event_id)` is never overwritten
    pub fn insert(&mut self, event: StoredEvent) -> EngineResult<()> {
        let key = event.key();
        if self.events.contains_key(&key) {
            return Err(EngineError::immutable(
                event.kind().table_name(),
                format!(
                    "event {} already recorded on chain {}",
                    event.event_id, key.0
                ),
            ));
        }

        self.by_block
            .insert((key.0, event.location.block_number, event.event_id), ());
        if let Some(pool) = event.pool_key_id {
            self.by_pool.insert((pool, event.kind(), event.event_id), key.0);
        }
        if let EventPayload::NftTransfer(transfer) = &event.payload {
            self.by_nft.insert(
                (key.0, event.location.emitter, transfer.token_id, event.event_id),
                (),
            );
        }
        self.events.insert(key, event);
        Ok(())
    }

    /// Remove a row and its index entries, returning it
    pub fn remove(&mut self, chain_id: ChainId, event_id: EventId) -> Option<StoredEvent> {
        let event = self.events.remove(&(chain_id, event_id))?;

        self.by_block
            .remove(&(chain_id, event.location.block_number, event_id));
        if let Some(pool) = event.pool_key_id {
            self.by_pool.remove(&(pool, event.kind(), event_id));
        }
        if let EventPayload::NftTransfer(transfer) = &event.payload {
            self.by_nft.remove(&(
                chain_id,
                event.location.emitter,
                transfer.token_id,
                event_id,
            ));
        }
        Some(event)
    }

    /// Ids of a block's events, ascending
    pub fn block_event_ids(&self, chain_id: ChainId, block_number: u64) -> Vec<EventId> {
        self.by_block
            .range((chain_id, block_number, EventId::MIN)..=(chain_id, block_number, EventId::MAX))
            .map(|((_, _, id), _)| *id)
            .collect()
    }

    fn pool_range(
        &self,
        pool: PoolKeyId,
        kind: EventKind,
        after: Option<EventId>,
    ) -> impl DoubleEndedIterator<Item = &StoredEvent> {
        let lower = match after {
            Some(id) => Bound::Excluded((pool, kind, id)),
            None => Bound::Included((pool, kind, EventId::MIN)),
        };
        let upper = Bound::Included((pool, kind, EventId::MAX));
        self.by_pool
            .range((lower, upper))
            .filter_map(move |((_, _, id), chain)| self.get(*chain, *id))
    }

    /// A pool's events of one kind, ascending, optionally strictly after an id
    pub fn pool_events(
        &self,
        pool: PoolKeyId,
        kind: EventKind,
        after: Option<EventId>,
    ) -> impl DoubleEndedIterator<Item = &StoredEvent> {
        self.pool_range(pool, kind, after)
    }

    /// Greatest-id event of the pool among `kinds`
    pub fn latest_pool_event(&self, pool: PoolKeyId, kinds: &[EventKind]) -> Option<&StoredEvent> {
        kinds
            .iter()
            .filter_map(|kind| self.pool_range(pool, *kind, None).next_back())
            .max_by_key(|event| event.event_id)
    }

    /// Whether any event still references the pool key
    pub fn pool_has_events(&self, pool: PoolKeyId) -> bool {
        self.by_pool
            // PoolInitialization is the lowest kind
            .range((pool, EventKind::PoolInitialization, EventId::MIN)..)
            .next()
            .is_some_and(|((p, _, _), _)| *p == pool)
    }

    /// Latest transfer of one token, by event id
    pub fn latest_nft_transfer(
        &self,
        chain_id: ChainId,
        nft: Address,
        token_id: Hash32,
    ) -> Option<&StoredEvent> {
        self.by_nft
            .range((chain_id, nft, token_id, EventId::MIN)..=(chain_id, nft, token_id, EventId::MAX))
            .next_back()
            .and_then(|((chain, _, _, id), _)| self.get(*chain, *id))
    }
}

impl Transactional for EventLog {
    fn commit(&mut self) {
        self.events.commit();
        self.by_block.commit();
        self.by_pool.commit();
        self.by_nft.commit();
    }

    fn rollback(&mut self) {
        self.events.rollback();
        self.by_block.rollback();
        self.by_pool.rollback();
        self.by_nft.rollback();
    }
}

/// Pool keys with their natural-key and token-pair indexes
#[derive(Debug, Clone, Default)]
pub struct PoolKeyTable {
    keys: JournaledMap<PoolKeyId, PoolKey>,
    by_identity: JournaledMap<(ChainId, Address, Hash32), PoolKeyId>,
    by_pair: JournaledMap<(ChainId, Address, Address, Address, PoolKeyId), ()>,
    // ids are never reused, even after a rollback
    last_id: PoolKeyId,
}

impl PoolKeyTable {
    pub fn get(&self, id: PoolKeyId) -> Option<&PoolKey> {
        self.keys.get(&id)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Resolve `(chain_id, core, pool_id)` to the recorded id
    pub fn resolve(&self, chain_id: ChainId, core: Address, pool_id: Hash32) -> Option<PoolKeyId> {
        self.by_identity.get(&(chain_id, core, pool_id)).copied()
    }

    /// Pools with `extension` trading the pair, ascending by id
    pub fn for_pair(
        &self,
        chain_id: ChainId,
        extension: Address,
        a: Address,
        b: Address,
    ) -> Vec<PoolKeyId> {
        let (token0, token1) = sort_tokens(a, b);
        let lo = (chain_id, extension, token0, token1, PoolKeyId::new(0));
        let hi = (chain_id, extension, token0, token1, PoolKeyId::new(u64::MAX));
        self.by_pair
            .range(lo..=hi)
            .map(|((_, _, _, _, id), _)| *id)
            .collect()
    }

    pub fn insert(&mut self, key: PoolKey) -> EngineResult<PoolKeyId> {
        let identity = (key.chain_id, key.core, key.pool_id);
        if let Some(existing) = self.by_identity.get(&identity) {
            return Err(EngineError::constraint(
                "pool_keys",
                format!(
                    "pool {} on core {} already recorded as {}",
                    key.pool_id, key.core, existing
                ),
            ));
        }

        self.last_id = self.last_id.next();
        let id = self.last_id;
        self.by_identity.insert(identity, id);
        self.by_pair.insert(
            (key.chain_id, key.extension, key.token0, key.token1, id),
            (),
        );
        self.keys.insert(id, key);
        Ok(id)
    }

    /// Replace a key's derived configuration; identity columns stay fixed
    pub fn replace_config(&mut self, id: PoolKeyId, config: types::PoolConfig) -> EngineResult<()> {
        let mut key = self
            .keys
            .get(&id)
            .cloned()
            .ok_or_else(|| EngineError::constraint("pool_keys", format!("unknown {}", id)))?;
        key.config = config;
        self.keys.insert(id, key);
        Ok(())
    }

    pub fn remove(&mut self, id: PoolKeyId) -> Option<PoolKey> {
        let key = self.keys.remove(&id)?;
        self.by_identity.remove(&(key.chain_id, key.core, key.pool_id));
        self.by_pair
            .remove(&(key.chain_id, key.extension, key.token0, key.token1, id));
        Some(key)
    }
}

impl Transactional for PoolKeyTable {
    fn commit(&mut self) {
        self.keys.commit();
        self.by_identity.commit();
        self.by_pair.commit();
    }

    fn rollback(&mut self) {
        self.keys.rollback();
        self.by_identity.rollback();
        self.by_pair.rollback();
    }
}

/// Blocks by `(chain_id, block_number)`
pub type BlockTable = JournaledMap<(ChainId, u64), Block>;
