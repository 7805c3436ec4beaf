//! # TWAP Query
//!
//! Time-weighted average tick of `base` priced in `quote`, routed through an
//! oracle token: the two legs are the oracle pools `(oracle, base)` and
//! `(quote, oracle)`. Each leg's average is the change of its tick
//! accumulator over the window divided by the window length, taking the
//! last snapshot at or before `now` and at or before `now - duration`. A
//! leg whose two lookups land on the same snapshot has no average.
//!
//! Pool ticks price token0 in units of token1, so a leg whose first token is
//! the pool's token1 is negated. With both legs oriented first-in-second,
//! `leg(oracle, base) + leg(quote, oracle)` is the tick of quote in base;
//! the query returns its negation.

use crate::error::{EngineError, EngineResult};
use crate::projections::oracle::observation_at;
use crate::projections::Views;
use crate::store::PoolKeyTable;
use serde::{Deserialize, Serialize};
use tracing::trace;
use types::{Address, ChainId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwapQuery {
    pub chain_id: ChainId,
    /// Oracle extension the legs' pools are registered with
    pub extension: Address,
    pub oracle_token: Address,
    pub base_token: Address,
    pub quote_token: Address,
    pub duration_secs: i64,
}

fn check_duration(duration_secs: i64, max_duration_secs: u64) -> EngineResult<u64> {
    if duration_secs <= 0 {
        return Err(EngineError::invalid_argument(
            "duration",
            format!("must be positive, got {}", duration_secs),
        ));
    }
    let duration = duration_secs as u64;
    if duration > max_duration_secs {
        return Err(EngineError::invalid_argument(
            "duration",
            format!("{} exceeds the {} second limit", duration, max_duration_secs),
        ));
    }
    Ok(duration)
}

/// Average tick of `first` priced in `second` over `[now - duration, now]`
fn leg_average_tick(
    pool_keys: &PoolKeyTable,
    views: &Views,
    query: &TwapQuery,
    (first, second): (Address, Address),
    now: u64,
    duration: u64,
) -> Option<i64> {
    if first == second {
        return Some(0);
    }
    let pool = *pool_keys
        .for_pair(query.chain_id, query.extension, first, second)
        .first()?;
    let key = pool_keys.get(pool)?;

    let latest = observation_at(views, pool, now)?;
    let older = observation_at(views, pool, now.checked_sub(duration)?)?;
    // both ends resolving to one snapshot means the window is not spanned
    if latest.timestamp <= older.timestamp {
        return None;
    }

    let delta = i128::from(latest.tick_cumulative) - i128::from(older.tick_cumulative);
    let average = i64::try_from(delta / i128::from(duration)).ok()?;
    trace!(
        pool = pool.inner(),
        latest = latest.timestamp,
        older = older.timestamp,
        average,
        "TWAP leg"
    );

    Some(if key.is_token0(&first) { average } else { -average })
}

/// Evaluate a query against the committed tables
pub(crate) fn average_tick(
    pool_keys: &PoolKeyTable,
    views: &Views,
    query: &TwapQuery,
    now: u64,
    max_duration_secs: u64,
) -> EngineResult<Option<i64>> {
    let duration = check_duration(query.duration_secs, max_duration_secs)?;

    let Some(oracle_base) = leg_average_tick(
        pool_keys,
        views,
        query,
        (query.oracle_token, query.base_token),
        now,
        duration,
    ) else {
        return Ok(None);
    };
    let Some(quote_oracle) = leg_average_tick(
        pool_keys,
        views,
        query,
        (query.quote_token, query.oracle_token),
        now,
        duration,
    ) else {
        return Ok(None);
    };

    Ok(Some(-(oracle_base + quote_oracle)))
}
