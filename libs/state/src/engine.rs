//! # Engine
//!
//! The transactional front door. Every write runs under one exclusive lock
//! as a single statement: the log mutation, every projection handler it
//! triggers and any fork-epoch bump either all commit or all roll back.
//! Readers take the shared lock and only ever observe committed state.

use crate::error::{EngineError, EngineResult};
use crate::journal::Transactional;
use crate::ledger::ForkLedger;
use crate::projections::oracle::observation_at;
use crate::projections::{
    BoostedFeesPoolState, NftOwner, OracleObservation, PoolBalanceChange, PoolState, PoolTvl,
    ProjectionSet, TickLiquidity, TokenAmounts, TwammPoolState, Views,
};
use crate::replay::replay;
use crate::store::{BlockTable, EventLog, PoolKeyTable, StoredEvent};
use crate::twap::{self, TwapQuery};
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::time::{SystemTime, UNIX_EPOCH};
use strata_config::{EngineConfig, DEFAULT_TWAP_MAX_DURATION_SECS};
use tracing::{debug, info, warn};
use types::{
    Address, Block, BlockRef, ChainCursor, ChainId, EventId, EventKind, EventLocation,
    EventPayload, Hash32, NewEvent, PoolConfig, PoolKey, PoolKeyId, PoolKeyParams,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Longest TWAP window a query may ask for
    pub twap_max_duration_secs: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            twap_max_duration_secs: DEFAULT_TWAP_MAX_DURATION_SECS,
        }
    }
}

/// Outcome of one delete statement
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteSummary {
    pub blocks_deleted: usize,
    pub events_deleted: usize,
    /// Chains whose fork epoch this statement advanced
    pub chains_bumped: Vec<ChainId>,
}

#[derive(Debug, Default)]
struct StoreState {
    blocks: BlockTable,
    pool_keys: PoolKeyTable,
    log: EventLog,
    ledger: ForkLedger,
    views: Views,
}

impl Transactional for StoreState {
    fn commit(&mut self) {
        self.blocks.commit();
        self.pool_keys.commit();
        self.log.commit();
        self.ledger.commit();
        self.views.commit();
    }

    fn rollback(&mut self) {
        self.blocks.rollback();
        self.pool_keys.rollback();
        self.log.rollback();
        self.ledger.rollback();
        self.views.rollback();
    }
}

impl StoreState {
    fn insert_event(&mut self, projections: &ProjectionSet, event: NewEvent) -> EngineResult<EventId> {
        let kind = event.kind();
        let table = kind.table_name();
        let event_id = codec::event_id_for(&event.location)?;
        let chain_id = event.location.chain_id;

        let block_time = self
            .blocks
            .get(&(chain_id, event.location.block_number))
            .map(|block| block.time)
            .ok_or_else(|| {
                EngineError::constraint(
                    table,
                    format!(
                        "block {} on chain {} does not exist",
                        event.location.block_number, chain_id
                    ),
                )
            })?;
        self.check_pool_reference(kind, chain_id, event.pool_key_id)?;

        let stored = StoredEvent {
            event_id,
            location: event.location,
            pool_key_id: event.pool_key_id,
            block_time,
            payload: event.payload,
        };
        self.log.insert(stored.clone())?;
        projections.apply(&self.log, &mut self.views, &stored)?;

        debug!(
            chain_id = chain_id.inner(),
            event_id = event_id.inner(),
            table,
            "Event applied"
        );
        Ok(event_id)
    }

    fn check_pool_reference(
        &self,
        kind: EventKind,
        chain_id: ChainId,
        pool_key_id: Option<PoolKeyId>,
    ) -> EngineResult<()> {
        let table = kind.table_name();
        match (kind.is_pool_scoped(), pool_key_id) {
            (true, None) => Err(EngineError::constraint(table, "a pool key is required")),
            (false, Some(id)) => Err(EngineError::constraint(
                table,
                format!("rows are not pool scoped, got {}", id),
            )),
            (false, None) => Ok(()),
            (true, Some(id)) => {
                let key = self.pool_keys.get(id).ok_or_else(|| {
                    EngineError::constraint(table, format!("{} does not exist", id))
                })?;
                if key.chain_id != chain_id {
                    return Err(EngineError::constraint(
                        table,
                        format!("{} belongs to chain {}, not {}", id, key.chain_id, chain_id),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Remove events newest first, reverting projections for each
    fn remove_events(
        &mut self,
        projections: &ProjectionSet,
        mut keys: Vec<(ChainId, EventId)>,
        touched: &mut BTreeSet<ChainId>,
    ) -> EngineResult<usize> {
        keys.sort_unstable();
        keys.dedup();

        let mut removed = 0;
        for (chain_id, event_id) in keys.into_iter().rev() {
            let Some(event) = self.log.remove(chain_id, event_id) else {
                continue;
            };
            projections.revert(&self.log, &mut self.views, &event)?;
            debug!(
                chain_id = chain_id.inner(),
                event_id = event_id.inner(),
                table = event.kind().table_name(),
                "Event reverted"
            );
            touched.insert(chain_id);
            removed += 1;
        }
        Ok(removed)
    }

    fn delete_blocks(
        &mut self,
        projections: &ProjectionSet,
        refs: &[BlockRef],
    ) -> EngineResult<DeleteSummary> {
        let mut refs = refs.to_vec();
        refs.sort_unstable();
        refs.dedup();

        let mut touched = BTreeSet::new();
        let mut summary = DeleteSummary::default();
        for block in refs.iter().rev() {
            if self.blocks.remove(&(block.chain_id, block.number)).is_none() {
                continue;
            }
            summary.blocks_deleted += 1;

            let keys = self
                .log
                .block_event_ids(block.chain_id, block.number)
                .into_iter()
                .map(|id| (block.chain_id, id))
                .collect();
            summary.events_deleted += self.remove_events(projections, keys, &mut touched)?;
        }

        self.finish_delete(summary, touched)
    }

    fn finish_delete(
        &mut self,
        mut summary: DeleteSummary,
        touched: BTreeSet<ChainId>,
    ) -> EngineResult<DeleteSummary> {
        self.ledger.bump(&touched);
        summary.chains_bumped = touched.into_iter().collect();
        Ok(summary)
    }
}

/// Reorg-safe event store with synchronously maintained projections
pub struct Engine {
    state: RwLock<StoreState>,
    projections: ProjectionSet,
    settings: EngineSettings,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_settings(EngineSettings::default())
    }

    pub fn with_settings(settings: EngineSettings) -> Self {
        Self::with_projections(settings, ProjectionSet::standard())
    }

    pub fn with_projections(settings: EngineSettings, projections: ProjectionSet) -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            projections,
            settings,
        }
    }

    /// Build an engine tracking every configured chain at fork epoch 0
    pub fn from_config(config: &EngineConfig) -> EngineResult<Self> {
        if config.twap.max_duration_secs == 0 {
            return Err(EngineError::invalid_argument(
                "twap.max_duration_secs",
                "must be positive",
            ));
        }
        let engine = Self::with_settings(EngineSettings {
            twap_max_duration_secs: config.twap.max_duration_secs,
        });

        engine.transact("register_chains", |state, _| {
            for (name, chain) in &config.chains {
                state.ledger.register(chain.chain_id());
                info!(chain = %name, chain_id = chain.chain_id, "Chain registered");
            }
            Ok(())
        })?;
        Ok(engine)
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Run one write statement; any error rolls every table back
    fn transact<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut StoreState, &ProjectionSet) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let mut state = self.state.write();
        // discard leftovers of a writer that panicked mid-statement
        state.rollback();

        match f(&mut state, &self.projections) {
            Ok(value) => {
                state.commit();
                Ok(value)
            }
            Err(err) => {
                state.rollback();
                warn!(operation, error = %err, "Write rejected, transaction rolled back");
                Err(err)
            }
        }
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        f(&self.state.read())
    }

    // ---- chains -------------------------------------------------------

    pub fn register_chain(&self, chain_id: ChainId) -> EngineResult<()> {
        self.transact("register_chain", |state, _| {
            state.ledger.register(chain_id);
            Ok(())
        })
    }

    pub fn chains(&self) -> Vec<ChainId> {
        self.read(|state| state.ledger.chains().collect())
    }

    pub fn fork_epoch(&self, chain_id: ChainId) -> u64 {
        self.read(|state| state.ledger.epoch(chain_id))
    }

    pub fn cursor(&self, chain_id: ChainId) -> Option<ChainCursor> {
        self.read(|state| state.ledger.cursor(chain_id).cloned())
    }

    /// Record the ingestion cursor, keeping the chain's fork epoch
    pub fn upsert_cursor(
        &self,
        chain_id: ChainId,
        order_key: u64,
        unique_key: Option<Hash32>,
        last_updated: u64,
    ) -> EngineResult<ChainCursor> {
        self.transact("upsert_cursor", |state, _| {
            Ok(state
                .ledger
                .upsert_cursor(chain_id, order_key, unique_key, last_updated))
        })
    }

    // ---- blocks -------------------------------------------------------

    /// Insert a block, stamping the chain's current fork epoch when unset
    pub fn insert_block(&self, block: Block) -> EngineResult<Block> {
        self.transact("insert_block", |state, _| {
            let key = (block.chain_id, block.number);
            if state.blocks.contains_key(&key) {
                return Err(EngineError::constraint(
                    "blocks",
                    format!("block {} on chain {} already exists", block.number, block.chain_id),
                ));
            }

            state.ledger.register(block.chain_id);
            let mut block = block;
            let epoch = state.ledger.epoch(block.chain_id);
            block.fork_epoch = Some(block.fork_epoch.unwrap_or(epoch));
            state.blocks.insert(key, block.clone());
            Ok(block)
        })
    }

    pub fn block(&self, chain_id: ChainId, number: u64) -> Option<Block> {
        self.read(|state| state.blocks.get(&(chain_id, number)).cloned())
    }

    pub fn delete_block(&self, chain_id: ChainId, number: u64) -> EngineResult<DeleteSummary> {
        self.delete_blocks(&[BlockRef::new(chain_id, number)])
    }

    /// Delete blocks and cascade to their events, as one statement
    pub fn delete_blocks(&self, blocks: &[BlockRef]) -> EngineResult<DeleteSummary> {
        let summary = self.transact("delete_blocks", |state, projections| {
            state.delete_blocks(projections, blocks)
        })?;
        if summary.blocks_deleted > 0 {
            info!(
                blocks = summary.blocks_deleted,
                events = summary.events_deleted,
                chains = ?summary.chains_bumped,
                "Blocks retracted"
            );
        }
        Ok(summary)
    }

    /// Delete every block of a chain at or above `from_block`
    pub fn rollback_to(&self, chain_id: ChainId, from_block: u64) -> EngineResult<DeleteSummary> {
        let summary = self.transact("rollback_to", |state, projections| {
            let refs: Vec<BlockRef> = state
                .blocks
                .range((chain_id, from_block)..=(chain_id, u64::MAX))
                .map(|(_, block)| block.block_ref())
                .collect();
            state.delete_blocks(projections, &refs)
        })?;
        info!(
            chain_id = chain_id.inner(),
            from_block,
            blocks = summary.blocks_deleted,
            events = summary.events_deleted,
            "Chain rolled back"
        );
        Ok(summary)
    }

    // ---- pool keys ----------------------------------------------------

    pub fn insert_pool_key(&self, params: PoolKeyParams) -> EngineResult<PoolKeyId> {
        self.transact("insert_pool_key", |state, _| {
            let key = PoolKey::new(params)?;
            state.pool_keys.insert(key)
        })
    }

    pub fn pool_key(&self, id: PoolKeyId) -> Option<PoolKey> {
        self.read(|state| state.pool_keys.get(id).cloned())
    }

    pub fn resolve_pool_key(
        &self,
        chain_id: ChainId,
        core: Address,
        pool_id: Hash32,
    ) -> Option<PoolKeyId> {
        self.read(|state| state.pool_keys.resolve(chain_id, core, pool_id))
    }

    /// Pool keys trading `a`/`b` (either order) under `extension`
    pub fn pool_keys_for_pair(
        &self,
        chain_id: ChainId,
        extension: Address,
        a: Address,
        b: Address,
    ) -> Vec<PoolKeyId> {
        self.read(|state| state.pool_keys.for_pair(chain_id, extension, a, b))
    }

    /// Re-derive a pool's configuration from its raw columns
    pub fn backfill_pool_config(
        &self,
        id: PoolKeyId,
        tick_spacing: Option<u32>,
        center_tick: Option<i32>,
        amplification: Option<u8>,
    ) -> EngineResult<PoolConfig> {
        self.transact("backfill_pool_config", |state, _| {
            let config = PoolConfig::from_parts(tick_spacing, center_tick, amplification)?;
            state.pool_keys.replace_config(id, config)?;
            Ok(config)
        })
    }

    /// Delete a pool key no event references
    pub fn delete_pool_key(&self, id: PoolKeyId) -> EngineResult<PoolKey> {
        self.transact("delete_pool_key", |state, _| {
            if state.log.pool_has_events(id) {
                return Err(EngineError::constraint(
                    "pool_keys",
                    format!("{} is still referenced by events", id),
                ));
            }
            state
                .pool_keys
                .remove(id)
                .ok_or_else(|| EngineError::constraint("pool_keys", format!("{} does not exist", id)))
        })
    }

    // ---- events -------------------------------------------------------

    pub fn insert_event(&self, event: NewEvent) -> EngineResult<EventId> {
        self.transact("insert_event", |state, projections| {
            state.insert_event(projections, event)
        })
    }

    /// Insert a batch atomically: either every event lands or none does
    pub fn insert_events(&self, events: Vec<NewEvent>) -> EngineResult<Vec<EventId>> {
        self.transact("insert_events", |state, projections| {
            events
                .into_iter()
                .map(|event| state.insert_event(projections, event))
                .collect()
        })
    }

    /// Decode a packed hex payload and insert it
    pub fn insert_raw_event(
        &self,
        location: EventLocation,
        pool_key_id: Option<PoolKeyId>,
        kind: EventKind,
        payload_hex: &str,
    ) -> EngineResult<EventId> {
        let payload = codec::decode_payload(kind, payload_hex).inspect_err(|err| {
            warn!(table = kind.table_name(), error = %err, "Payload rejected");
        })?;
        self.insert_event(NewEvent {
            location,
            pool_key_id,
            payload,
        })
    }

    /// Event rows are immutable; retract and re-insert instead
    pub fn update_event(
        &self,
        chain_id: ChainId,
        event_id: EventId,
        payload: EventPayload,
    ) -> EngineResult<()> {
        let table = self
            .event(chain_id, event_id)
            .map_or(payload.kind(), |existing| existing.kind())
            .table_name();
        warn!(table, event_id = event_id.inner(), "Update of event row refused");
        Err(EngineError::immutable(
            table,
            format!("{} on chain {} cannot be modified", event_id, chain_id),
        ))
    }

    /// Retract specific events as one statement
    pub fn delete_events(&self, keys: &[(ChainId, EventId)]) -> EngineResult<DeleteSummary> {
        self.transact("delete_events", |state, projections| {
            let mut touched = BTreeSet::new();
            let events_deleted = state.remove_events(projections, keys.to_vec(), &mut touched)?;
            state.finish_delete(
                DeleteSummary {
                    events_deleted,
                    ..Default::default()
                },
                touched,
            )
        })
    }

    pub fn event(&self, chain_id: ChainId, event_id: EventId) -> Option<StoredEvent> {
        self.read(|state| state.log.get(chain_id, event_id).cloned())
    }

    pub fn event_count(&self) -> usize {
        self.read(|state| state.log.len())
    }

    pub fn block_events(&self, chain_id: ChainId, number: u64) -> Vec<StoredEvent> {
        self.read(|state| {
            state
                .log
                .block_event_ids(chain_id, number)
                .into_iter()
                .filter_map(|id| state.log.get(chain_id, id).cloned())
                .collect()
        })
    }

    // ---- projections --------------------------------------------------

    pub fn pool_state(&self, pool: PoolKeyId) -> Option<PoolState> {
        self.read(|state| state.views.pool_states.get(&pool).cloned())
    }

    pub fn tick_liquidity(&self, pool: PoolKeyId, tick: i32) -> Option<TickLiquidity> {
        self.read(|state| state.views.tick_liquidity.get(&(pool, tick)).cloned())
    }

    /// Every initialized tick of a pool, ascending
    pub fn tick_liquidity_curve(&self, pool: PoolKeyId) -> Vec<(i32, TickLiquidity)> {
        self.read(|state| {
            state
                .views
                .tick_liquidity
                .range((pool, i32::MIN)..=(pool, i32::MAX))
                .map(|((_, tick), row)| (*tick, row.clone()))
                .collect()
        })
    }

    pub fn pool_tvl(&self, pool: PoolKeyId) -> Option<PoolTvl> {
        self.read(|state| state.views.pool_tvl.get(&pool).cloned())
    }

    pub fn pool_balance_change(
        &self,
        chain_id: ChainId,
        event_id: EventId,
    ) -> Option<PoolBalanceChange> {
        self.read(|state| state.views.balance_changes.get(&(chain_id, event_id)).cloned())
    }

    pub fn twamm_pool_state(&self, pool: PoolKeyId) -> Option<TwammPoolState> {
        self.read(|state| state.views.twamm_states.get(&pool).cloned())
    }

    pub fn sale_rate_deltas(
        &self,
        pool: PoolKeyId,
        times: RangeInclusive<u64>,
    ) -> Vec<(u64, TokenAmounts)> {
        self.read(|state| state.views.sale_rate_deltas.range(pool, times))
    }

    pub fn sale_rate_at(&self, pool: PoolKeyId, time: u64) -> TokenAmounts {
        self.read(|state| state.views.sale_rate_deltas.rate_at(pool, time))
    }

    pub fn boosted_fees_pool_state(&self, pool: PoolKeyId) -> Option<BoostedFeesPoolState> {
        self.read(|state| state.views.boosted_fees_states.get(&pool).cloned())
    }

    pub fn donate_rate_deltas(
        &self,
        pool: PoolKeyId,
        times: RangeInclusive<u64>,
    ) -> Vec<(u64, TokenAmounts)> {
        self.read(|state| state.views.donate_rate_deltas.range(pool, times))
    }

    pub fn donate_rate_at(&self, pool: PoolKeyId, time: u64) -> TokenAmounts {
        self.read(|state| state.views.donate_rate_deltas.rate_at(pool, time))
    }

    pub fn oracle_pool_state(&self, pool: PoolKeyId) -> Option<OracleObservation> {
        self.read(|state| state.views.oracle_states.get(&pool).cloned())
    }

    /// Last oracle snapshot of a pool taken at or before `time`
    pub fn oracle_observation_at(&self, pool: PoolKeyId, time: u64) -> Option<OracleObservation> {
        self.read(|state| observation_at(&state.views, pool, time).cloned())
    }

    pub fn nft_owner(&self, chain_id: ChainId, nft: Address, token_id: Hash32) -> Option<NftOwner> {
        self.read(|state| state.views.nft_owners.get(&(chain_id, nft, token_id)).cloned())
    }

    /// Copy of every derived table
    pub fn views(&self) -> Views {
        self.read(|state| state.views.clone())
    }

    // ---- queries ------------------------------------------------------

    /// Average tick of base in quote over the `duration` ending at `now`
    pub fn twap_at(&self, query: &TwapQuery, now: u64) -> EngineResult<Option<i64>> {
        self.read(|state| {
            twap::average_tick(
                &state.pool_keys,
                &state.views,
                query,
                now,
                self.settings.twap_max_duration_secs,
            )
        })
    }

    /// [`Engine::twap_at`] ending at the current wall-clock time
    pub fn twap(&self, query: &TwapQuery) -> EngineResult<Option<i64>> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0);
        self.twap_at(query, now)
    }

    /// Tables whose maintained contents differ from a full replay of the log
    pub fn verify_consistency(&self) -> EngineResult<Vec<&'static str>> {
        self.read(|state| {
            let replayed = replay(state.log.iter(), &self.projections)?;
            let diverged = state.views.diff(&replayed);
            if !diverged.is_empty() {
                warn!(tables = ?diverged, "Projections diverge from replay");
            }
            Ok(diverged)
        })
    }
}
