//! Pool price and liquidity
//!
//! Price (`tick`, `sqrt_ratio`) is latest-wins over initializations and
//! swaps. Liquidity is not: it is the `liquidity_after` of that same latest
//! init/swap (the base) plus the liquidity deltas of every position update
//! ordered after the base. The row stores both parts separately so deleting
//! a position update is a subtraction and only deleting the base forces the
//! deltas above the new base to be summed again.

use super::{pool_of, put_or_remove, Projection, Views};
use crate::error::EngineResult;
use crate::store::{EventLog, StoredEvent};
use num_bigint::BigInt;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use tracing::debug;
use types::{EventId, EventKind, EventPayload, PoolKeyId};

const BASE_KINDS: &[EventKind] = &[EventKind::PoolInitialization, EventKind::Swap];
const KINDS: &[EventKind] = &[
    EventKind::PoolInitialization,
    EventKind::Swap,
    EventKind::PositionUpdate,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    pub tick: i32,
    pub sqrt_ratio: BigInt,
    /// Liquidity carried by the base event
    pub base_liquidity: BigInt,
    pub base_event_id: EventId,
    /// Sum of position-update deltas ordered after the base
    pub delta_accumulator: BigInt,
    pub last_event_id: EventId,
}

impl PoolState {
    pub fn liquidity(&self) -> BigInt {
        &self.base_liquidity + &self.delta_accumulator
    }
}

fn base_snapshot(payload: &EventPayload) -> Option<(i32, BigInt, BigInt)> {
    match payload {
        EventPayload::PoolInitialization(init) => {
            Some((init.tick, init.sqrt_ratio.clone(), BigInt::zero()))
        }
        EventPayload::Swap(swap) => Some((
            swap.tick_after,
            swap.sqrt_ratio_after.clone(),
            swap.liquidity_after.clone(),
        )),
        _ => None,
    }
}

fn liquidity_delta(payload: &EventPayload) -> Option<&BigInt> {
    match payload {
        EventPayload::PositionUpdate(update) => Some(&update.liquidity_delta),
        _ => None,
    }
}

fn rebase(log: &EventLog, pool: PoolKeyId, base: &StoredEvent) -> Option<PoolState> {
    let (tick, sqrt_ratio, base_liquidity) = base_snapshot(&base.payload)?;
    let delta_accumulator = log
        .pool_events(pool, EventKind::PositionUpdate, Some(base.event_id))
        .filter_map(|event| liquidity_delta(&event.payload))
        .sum();
    let last_event_id = log
        .latest_pool_event(pool, KINDS)
        .map_or(base.event_id, |event| event.event_id);

    Some(PoolState {
        tick,
        sqrt_ratio,
        base_liquidity,
        base_event_id: base.event_id,
        delta_accumulator,
        last_event_id,
    })
}

pub struct PoolStateProjection;

impl Projection for PoolStateProjection {
    fn name(&self) -> &'static str {
        "pool_states"
    }

    fn kinds(&self) -> &'static [EventKind] {
        KINDS
    }

    fn apply(&self, log: &EventLog, views: &mut Views, event: &StoredEvent) -> EngineResult<()> {
        let pool = pool_of(event)?;
        let current = views.pool_states.get(&pool);

        if let Some(delta) = liquidity_delta(&event.payload) {
            // without a base there is nothing to layer onto yet
            let Some(state) = current else {
                return Ok(());
            };
            let mut state = state.clone();
            if event.event_id > state.base_event_id {
                state.delta_accumulator += delta;
            }
            state.last_event_id = state.last_event_id.max(event.event_id);
            views.pool_states.insert(pool, state);
            return Ok(());
        }

        match current {
            Some(state) if event.event_id < state.base_event_id => {
                debug!(
                    pool = pool.inner(),
                    event_id = event.event_id.inner(),
                    "Older price event leaves pool state unchanged"
                );
            }
            _ => put_or_remove(&mut views.pool_states, pool, rebase(log, pool, event)),
        }
        Ok(())
    }

    fn revert(&self, log: &EventLog, views: &mut Views, event: &StoredEvent) -> EngineResult<()> {
        let pool = pool_of(event)?;
        let Some(state) = views.pool_states.get(&pool) else {
            return Ok(());
        };

        if let Some(delta) = liquidity_delta(&event.payload) {
            let mut state = state.clone();
            if event.event_id > state.base_event_id {
                state.delta_accumulator -= delta;
            }
            if state.last_event_id == event.event_id {
                state.last_event_id = log
                    .latest_pool_event(pool, KINDS)
                    .map_or(state.base_event_id, |latest| latest.event_id);
            }
            views.pool_states.insert(pool, state);
            return Ok(());
        }

        if state.base_event_id == event.event_id {
            let row = log
                .latest_pool_event(pool, BASE_KINDS)
                .and_then(|base| rebase(log, pool, base));
            if row.is_none() {
                debug!(pool = pool.inner(), "Last price event removed; pool state dropped");
            }
            put_or_remove(&mut views.pool_states, pool, row);
        }
        Ok(())
    }
}
