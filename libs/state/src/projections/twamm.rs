//! TWAMM sale rates
//!
//! The pool's current sale rates come from its latest virtual order
//! execution; order updates ordered after that execution and selling at
//! their block time adjust them. Independently, every order update feeds
//! the sale-rate difference array over its `[start_time, end_time)`.

use super::layered::{LayeredRates, Layering};
use super::{pool_of, put_or_remove, Projection, TokenAmounts, Views};
use crate::error::EngineResult;
use crate::store::{EventLog, StoredEvent};
use types::{EventKind, EventPayload};

pub type TwammPoolState = LayeredRates;

const LAYERING: Layering = Layering {
    base_kind: EventKind::TwammVirtualOrderExecution,
    delta_kind: EventKind::TwammOrderUpdate,
    base_rates: execution_rates,
    active_delta: active_order_delta,
    requires_base: true,
};

fn execution_rates(payload: &EventPayload) -> Option<TokenAmounts> {
    match payload {
        EventPayload::TwammVirtualOrderExecution(execution) => Some(TokenAmounts::new(
            execution.token0_sale_rate.clone(),
            execution.token1_sale_rate.clone(),
        )),
        _ => None,
    }
}

fn active_order_delta(event: &StoredEvent) -> Option<TokenAmounts> {
    match &event.payload {
        EventPayload::TwammOrderUpdate(order) if order.is_active_at(event.block_time) => {
            Some(order.sale_rate_deltas().into())
        }
        _ => None,
    }
}

pub struct TwammStateProjection;

impl Projection for TwammStateProjection {
    fn name(&self) -> &'static str {
        "twamm_pool_states"
    }

    fn kinds(&self) -> &'static [EventKind] {
        &[
            EventKind::TwammVirtualOrderExecution,
            EventKind::TwammOrderUpdate,
        ]
    }

    fn apply(&self, log: &EventLog, views: &mut Views, event: &StoredEvent) -> EngineResult<()> {
        let pool = pool_of(event)?;
        let row = LAYERING.on_insert(log, pool, views.twamm_states.get(&pool), event);
        put_or_remove(&mut views.twamm_states, pool, row);
        Ok(())
    }

    fn revert(&self, log: &EventLog, views: &mut Views, event: &StoredEvent) -> EngineResult<()> {
        let pool = pool_of(event)?;
        let row = LAYERING.on_delete(log, pool, views.twamm_states.get(&pool), event);
        put_or_remove(&mut views.twamm_states, pool, row);
        Ok(())
    }
}

pub struct SaleRateDeltaProjection;

impl SaleRateDeltaProjection {
    fn interval(event: &StoredEvent) -> Option<(u64, u64, TokenAmounts)> {
        match &event.payload {
            EventPayload::TwammOrderUpdate(order) => Some((
                order.start_time,
                order.end_time,
                order.sale_rate_deltas().into(),
            )),
            _ => None,
        }
    }
}

impl Projection for SaleRateDeltaProjection {
    fn name(&self) -> &'static str {
        "twamm_sale_rate_deltas"
    }

    fn kinds(&self) -> &'static [EventKind] {
        &[EventKind::TwammOrderUpdate]
    }

    fn apply(&self, _log: &EventLog, views: &mut Views, event: &StoredEvent) -> EngineResult<()> {
        if let Some((start, end, rate)) = Self::interval(event) {
            let pool = pool_of(event)?;
            views.sale_rate_deltas.add_interval(pool, start, end, &rate);
        }
        Ok(())
    }

    fn revert(&self, _log: &EventLog, views: &mut Views, event: &StoredEvent) -> EngineResult<()> {
        if let Some((start, end, rate)) = Self::interval(event) {
            let pool = pool_of(event)?;
            views.sale_rate_deltas.remove_interval(pool, start, end, &rate);
        }
        Ok(())
    }
}
