//! Per-tick liquidity curve
//!
//! A position over `[lower, upper)` adds its liquidity delta to the net diff
//! at `lower` and subtracts it at `upper`; both ticks count it towards the
//! liquidity referencing them. Summing net diffs up to a tick gives the
//! active liquidity there.

use super::{pool_of, Projection, Views};
use crate::error::EngineResult;
use crate::store::{EventLog, StoredEvent};
use num_bigint::BigInt;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use types::{EventKind, EventPayload, PoolKeyId};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TickLiquidity {
    pub net_liquidity_delta_diff: BigInt,
    pub total_liquidity_on_tick: BigInt,
}

impl TickLiquidity {
    fn is_zero(&self) -> bool {
        self.net_liquidity_delta_diff.is_zero() && self.total_liquidity_on_tick.is_zero()
    }
}

fn adjust(views: &mut Views, pool: PoolKeyId, tick: i32, net: &BigInt, total: &BigInt) {
    let key = (pool, tick);
    let mut row = views.tick_liquidity.get(&key).cloned().unwrap_or_default();
    row.net_liquidity_delta_diff += net;
    row.total_liquidity_on_tick += total;
    if row.is_zero() {
        views.tick_liquidity.remove(&key);
    } else {
        views.tick_liquidity.insert(key, row);
    }
}

fn update(views: &mut Views, event: &StoredEvent, sign: i8) -> EngineResult<()> {
    let EventPayload::PositionUpdate(position) = &event.payload else {
        return Ok(());
    };
    let pool = pool_of(event)?;
    let delta = if sign < 0 {
        -&position.liquidity_delta
    } else {
        position.liquidity_delta.clone()
    };

    adjust(views, pool, position.lower, &delta, &delta);
    adjust(views, pool, position.upper, &-&delta, &delta);
    Ok(())
}

pub struct TickLiquidityProjection;

impl Projection for TickLiquidityProjection {
    fn name(&self) -> &'static str {
        "per_pool_per_tick_liquidity"
    }

    fn kinds(&self) -> &'static [EventKind] {
        &[EventKind::PositionUpdate]
    }

    fn apply(&self, _log: &EventLog, views: &mut Views, event: &StoredEvent) -> EngineResult<()> {
        update(views, event, 1)
    }

    fn revert(&self, _log: &EventLog, views: &mut Views, event: &StoredEvent) -> EngineResult<()> {
        update(views, event, -1)
    }
}

/// Active liquidity at `tick`: the prefix sum of net diffs at or below it
pub fn liquidity_at(views: &Views, pool: PoolKeyId, tick: i32) -> BigInt {
    views
        .tick_liquidity
        .range((pool, i32::MIN)..=(pool, tick))
        .map(|(_, row)| &row.net_liquidity_delta_diff)
        .sum()
}
