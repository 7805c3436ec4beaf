//! # Projections
//!
//! Derived tables kept in step with the event log. Each [`Projection`] is a
//! pair of handlers: `apply` runs right after an event row is inserted,
//! `revert` right after one is removed, both inside the transaction of the
//! triggering write. A projection may read the log (which already reflects
//! the insert or delete) but writes only to [`Views`].
//!
//! Two shapes of projection exist:
//! - **State** rows hold the latest snapshot of an aggregate and remember the
//!   event that produced it. A newer event replaces the snapshot; deleting the
//!   current contributor re-derives it from the greatest remaining event.
//! - **Delta** rows hold signed differences and are maintained by symmetric
//!   add/subtract. A row whose value returns to zero is removed.

use crate::error::{EngineError, EngineResult};
use crate::journal::{JournaledMap, Transactional};
use crate::store::{EventLog, StoredEvent};
use num_bigint::BigInt;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::ops::{AddAssign, Neg, SubAssign};
use tracing::trace;
use types::{Address, ChainId, EventId, EventKind, Hash32, PoolKeyId};

pub mod boosted_fees;
pub mod layered;
pub mod nft;
pub mod oracle;
pub mod pool_balance;
pub mod pool_state;
pub mod rate_deltas;
pub mod tick_liquidity;
pub mod twamm;

pub use boosted_fees::{BoostedFeesProjection, BoostedFeesPoolState, DonateRateDeltaProjection};
pub use layered::LayeredRates;
pub use nft::{NftOwner, NftOwnerProjection};
pub use oracle::{OracleObservation, OracleProjection};
pub use pool_balance::{PoolBalanceChange, PoolBalanceProjection, PoolTvl};
pub use pool_state::{PoolState, PoolStateProjection};
pub use rate_deltas::RateDeltaTable;
pub use tick_liquidity::{TickLiquidity, TickLiquidityProjection};
pub use twamm::{SaleRateDeltaProjection, TwammPoolState, TwammStateProjection};

/// A signed quantity per pool token
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenAmounts {
    pub token0: BigInt,
    pub token1: BigInt,
}

impl TokenAmounts {
    pub fn new(token0: BigInt, token1: BigInt) -> Self {
        Self { token0, token1 }
    }

    pub fn is_zero(&self) -> bool {
        self.token0.is_zero() && self.token1.is_zero()
    }
}

impl From<(BigInt, BigInt)> for TokenAmounts {
    fn from((token0, token1): (BigInt, BigInt)) -> Self {
        Self { token0, token1 }
    }
}

impl AddAssign<&TokenAmounts> for TokenAmounts {
    fn add_assign(&mut self, rhs: &TokenAmounts) {
        self.token0 += &rhs.token0;
        self.token1 += &rhs.token1;
    }
}

impl SubAssign<&TokenAmounts> for TokenAmounts {
    fn sub_assign(&mut self, rhs: &TokenAmounts) {
        self.token0 -= &rhs.token0;
        self.token1 -= &rhs.token1;
    }
}

impl Neg for &TokenAmounts {
    type Output = TokenAmounts;

    fn neg(self) -> TokenAmounts {
        TokenAmounts {
            token0: -&self.token0,
            token1: -&self.token1,
        }
    }
}

/// Every derived table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Views {
    pub pool_states: JournaledMap<PoolKeyId, PoolState>,
    pub tick_liquidity: JournaledMap<(PoolKeyId, i32), TickLiquidity>,
    pub balance_changes: JournaledMap<(ChainId, EventId), PoolBalanceChange>,
    pub pool_tvl: JournaledMap<PoolKeyId, PoolTvl>,
    pub twamm_states: JournaledMap<PoolKeyId, TwammPoolState>,
    pub sale_rate_deltas: RateDeltaTable,
    pub boosted_fees_states: JournaledMap<PoolKeyId, BoostedFeesPoolState>,
    pub donate_rate_deltas: RateDeltaTable,
    pub oracle_states: JournaledMap<PoolKeyId, OracleObservation>,
    pub oracle_timeline: JournaledMap<(PoolKeyId, u64, EventId), OracleObservation>,
    pub nft_owners: JournaledMap<(ChainId, Address, Hash32), NftOwner>,
}

impl Views {
    /// Names of the tables whose contents differ between two view sets
    pub fn diff(&self, other: &Views) -> Vec<&'static str> {
        let checks = [
            ("pool_states", self.pool_states == other.pool_states),
            ("per_pool_per_tick_liquidity", self.tick_liquidity == other.tick_liquidity),
            ("pool_balance_change", self.balance_changes == other.balance_changes),
            ("pool_tvl", self.pool_tvl == other.pool_tvl),
            ("twamm_pool_states", self.twamm_states == other.twamm_states),
            ("twamm_sale_rate_deltas", self.sale_rate_deltas == other.sale_rate_deltas),
            (
                "boosted_fees_pool_states",
                self.boosted_fees_states == other.boosted_fees_states,
            ),
            (
                "boosted_fees_donate_rate_deltas",
                self.donate_rate_deltas == other.donate_rate_deltas,
            ),
            ("oracle_pool_states", self.oracle_states == other.oracle_states),
            ("oracle_timeline", self.oracle_timeline == other.oracle_timeline),
            ("nonfungible_token_owners", self.nft_owners == other.nft_owners),
        ];
        checks
            .into_iter()
            .filter(|(_, equal)| !equal)
            .map(|(name, _)| name)
            .collect()
    }
}

impl Transactional for Views {
    fn commit(&mut self) {
        self.pool_states.commit();
        self.tick_liquidity.commit();
        self.balance_changes.commit();
        self.pool_tvl.commit();
        self.twamm_states.commit();
        self.sale_rate_deltas.commit();
        self.boosted_fees_states.commit();
        self.donate_rate_deltas.commit();
        self.oracle_states.commit();
        self.oracle_timeline.commit();
        self.nft_owners.commit();
    }

    fn rollback(&mut self) {
        self.pool_states.rollback();
        self.tick_liquidity.rollback();
        self.balance_changes.rollback();
        self.pool_tvl.rollback();
        self.twamm_states.rollback();
        self.sale_rate_deltas.rollback();
        self.boosted_fees_states.rollback();
        self.donate_rate_deltas.rollback();
        self.oracle_states.rollback();
        self.oracle_timeline.rollback();
        self.nft_owners.rollback();
    }
}

/// Handler pair keeping one derived table in step with the log
pub trait Projection: Send + Sync {
    fn name(&self) -> &'static str;

    /// Event kinds this projection reacts to
    fn kinds(&self) -> &'static [EventKind];

    /// Called after `event` was inserted into `log`
    fn apply(&self, log: &EventLog, views: &mut Views, event: &StoredEvent) -> EngineResult<()>;

    /// Called after `event` was removed from `log`
    fn revert(&self, log: &EventLog, views: &mut Views, event: &StoredEvent) -> EngineResult<()>;
}

/// Registered projections, dispatched by event kind
pub struct ProjectionSet {
    projections: Vec<Box<dyn Projection>>,
}

impl ProjectionSet {
    pub fn new(projections: Vec<Box<dyn Projection>>) -> Self {
        Self { projections }
    }

    /// Every projection the engine maintains
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(PoolStateProjection),
            Box::new(TickLiquidityProjection),
            Box::new(PoolBalanceProjection),
            Box::new(TwammStateProjection),
            Box::new(SaleRateDeltaProjection),
            Box::new(BoostedFeesProjection),
            Box::new(DonateRateDeltaProjection),
            Box::new(OracleProjection),
            Box::new(NftOwnerProjection),
        ])
    }

    pub fn len(&self) -> usize {
        self.projections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projections.is_empty()
    }

    fn handling(&self, kind: EventKind) -> impl Iterator<Item = &dyn Projection> {
        self.projections
            .iter()
            .map(|p| p.as_ref())
            .filter(move |p| p.kinds().contains(&kind))
    }

    pub fn apply(&self, log: &EventLog, views: &mut Views, event: &StoredEvent) -> EngineResult<()> {
        for projection in self.handling(event.kind()) {
            trace!(
                projection = projection.name(),
                event_id = event.event_id.inner(),
                "apply"
            );
            projection.apply(log, views, event)?;
        }
        Ok(())
    }

    pub fn revert(&self, log: &EventLog, views: &mut Views, event: &StoredEvent) -> EngineResult<()> {
        for projection in self.handling(event.kind()) {
            trace!(
                projection = projection.name(),
                event_id = event.event_id.inner(),
                "revert"
            );
            projection.revert(log, views, event)?;
        }
        Ok(())
    }
}

impl Default for ProjectionSet {
    fn default() -> Self {
        Self::standard()
    }
}

/// Pool key of a pool-scoped event
pub(crate) fn pool_of(event: &StoredEvent) -> EngineResult<PoolKeyId> {
    event.pool_key_id.ok_or_else(|| {
        EngineError::constraint(
            event.kind().table_name(),
            format!("event {} has no pool key", event.event_id),
        )
    })
}

/// Clear a state row, or replace it with a re-derived one
pub(crate) fn put_or_remove<K: Ord + Clone, V: Clone>(
    table: &mut JournaledMap<K, V>,
    key: K,
    row: Option<V>,
) {
    match row {
        Some(row) => table.insert(key, row),
        None => {
            table.remove(&key);
        }
    }
}
