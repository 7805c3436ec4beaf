//! Pool balance ledger and running TVL
//!
//! Every balance-moving event leaves one [`PoolBalanceChange`] row keyed by
//! its own id. [`PoolTvl`] is the running sum of those rows per pool and
//! counts them, so the row disappears with the last contributing change.

use super::{pool_of, Projection, TokenAmounts, Views};
use crate::error::EngineResult;
use crate::store::{EventLog, StoredEvent};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use types::{EventKind, PoolKeyId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolBalanceChange {
    pub pool_key_id: PoolKeyId,
    pub delta: TokenAmounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PoolTvl {
    pub balance0: BigInt,
    pub balance1: BigInt,
    pub change_count: u64,
}

pub struct PoolBalanceProjection;

impl Projection for PoolBalanceProjection {
    fn name(&self) -> &'static str {
        "pool_balance_change"
    }

    fn kinds(&self) -> &'static [EventKind] {
        &[
            EventKind::Swap,
            EventKind::PositionUpdate,
            EventKind::PositionFeesCollected,
            EventKind::FeesAccumulated,
        ]
    }

    fn apply(&self, _log: &EventLog, views: &mut Views, event: &StoredEvent) -> EngineResult<()> {
        let Some(delta) = event.payload.balance_delta().map(TokenAmounts::from) else {
            return Ok(());
        };
        let pool = pool_of(event)?;

        let mut tvl = views.pool_tvl.get(&pool).cloned().unwrap_or_default();
        tvl.balance0 += &delta.token0;
        tvl.balance1 += &delta.token1;
        tvl.change_count += 1;
        views.pool_tvl.insert(pool, tvl);

        views.balance_changes.insert(
            event.key(),
            PoolBalanceChange {
                pool_key_id: pool,
                delta,
            },
        );
        Ok(())
    }

    fn revert(&self, _log: &EventLog, views: &mut Views, event: &StoredEvent) -> EngineResult<()> {
        let Some(change) = views.balance_changes.remove(&event.key()) else {
            return Ok(());
        };
        let pool = change.pool_key_id;

        let Some(mut tvl) = views.pool_tvl.get(&pool).cloned() else {
            return Ok(());
        };
        tvl.balance0 -= &change.delta.token0;
        tvl.balance1 -= &change.delta.token1;
        tvl.change_count = tvl.change_count.saturating_sub(1);
        if tvl.change_count == 0 {
            views.pool_tvl.remove(&pool);
        } else {
            views.pool_tvl.insert(pool, tvl);
        }
        Ok(())
    }
}
