//! Boosted-fees donate rates
//!
//! A donation reports the pool's donate rates at that moment; boosts
//! ordered after it and running at their block time add their rates on top.
//! Unlike TWAMM, a boosted pool has a row before its first donation: the
//! base is then zero and every running boost counts.

use super::layered::{LayeredRates, Layering};
use super::{pool_of, put_or_remove, Projection, TokenAmounts, Views};
use crate::error::EngineResult;
use crate::store::{EventLog, StoredEvent};
use types::{EventKind, EventPayload};

pub type BoostedFeesPoolState = LayeredRates;

const LAYERING: Layering = Layering {
    base_kind: EventKind::FeesDonated,
    delta_kind: EventKind::PoolBoosted,
    base_rates: donated_rates,
    active_delta: active_boost,
    requires_base: false,
};

fn donated_rates(payload: &EventPayload) -> Option<TokenAmounts> {
    match payload {
        EventPayload::FeesDonated(donation) => Some(TokenAmounts::new(
            donation.donate_rate0.clone(),
            donation.donate_rate1.clone(),
        )),
        _ => None,
    }
}

fn active_boost(event: &StoredEvent) -> Option<TokenAmounts> {
    match &event.payload {
        EventPayload::PoolBoosted(boost) if boost.is_active_at(event.block_time) => Some(
            TokenAmounts::new(boost.rate0.clone(), boost.rate1.clone()),
        ),
        _ => None,
    }
}

pub struct BoostedFeesProjection;

impl Projection for BoostedFeesProjection {
    fn name(&self) -> &'static str {
        "boosted_fees_pool_states"
    }

    fn kinds(&self) -> &'static [EventKind] {
        &[EventKind::FeesDonated, EventKind::PoolBoosted]
    }

    fn apply(&self, log: &EventLog, views: &mut Views, event: &StoredEvent) -> EngineResult<()> {
        let pool = pool_of(event)?;
        let row = LAYERING.on_insert(log, pool, views.boosted_fees_states.get(&pool), event);
        put_or_remove(&mut views.boosted_fees_states, pool, row);
        Ok(())
    }

    fn revert(&self, log: &EventLog, views: &mut Views, event: &StoredEvent) -> EngineResult<()> {
        let pool = pool_of(event)?;
        let row = LAYERING.on_delete(log, pool, views.boosted_fees_states.get(&pool), event);
        put_or_remove(&mut views.boosted_fees_states, pool, row);
        Ok(())
    }
}

/// Donate-rate difference array fed by boost intervals
pub struct DonateRateDeltaProjection;

fn boost_interval(event: &StoredEvent) -> Option<(u64, u64, TokenAmounts)> {
    match &event.payload {
        EventPayload::PoolBoosted(boost) => Some((
            boost.start_time,
            boost.end_time,
            TokenAmounts::new(boost.rate0.clone(), boost.rate1.clone()),
        )),
        _ => None,
    }
}

impl Projection for DonateRateDeltaProjection {
    fn name(&self) -> &'static str {
        "boosted_fees_donate_rate_deltas"
    }

    fn kinds(&self) -> &'static [EventKind] {
        &[EventKind::PoolBoosted]
    }

    fn apply(&self, _log: &EventLog, views: &mut Views, event: &StoredEvent) -> EngineResult<()> {
        if let Some((start, end, rate)) = boost_interval(event) {
            views
                .donate_rate_deltas
                .add_interval(pool_of(event)?, start, end, &rate);
        }
        Ok(())
    }

    fn revert(&self, _log: &EventLog, views: &mut Views, event: &StoredEvent) -> EngineResult<()> {
        if let Some((start, end, rate)) = boost_interval(event) {
            views
                .donate_rate_deltas
                .remove_interval(pool_of(event)?, start, end, &rate);
        }
        Ok(())
    }
}
