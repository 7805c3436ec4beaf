//! Base snapshot plus additive layers
//!
//! Per-pool rates where the latest event of a *base* kind carries the full
//! current value and later events of a *delta* kind adjust it while they are
//! active at their own block time. The row keeps the two parts apart
//! (`base_event_id` and the summed deltas above it), so deleting a delta is a
//! subtraction and only deleting the base forces a re-derivation.

use super::TokenAmounts;
use crate::store::{EventLog, StoredEvent};
use serde::{Deserialize, Serialize};
use types::{EventId, EventKind, EventPayload, PoolKeyId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayeredRates {
    /// Base rates plus every active delta above the base
    pub rates: TokenAmounts,
    /// Rates carried by the base event alone
    pub base_rates: TokenAmounts,
    pub base_event_id: Option<EventId>,
    /// Greatest id among the events feeding this row
    pub last_event_id: EventId,
}

/// How one rate table is layered
pub(crate) struct Layering {
    pub base_kind: EventKind,
    pub delta_kind: EventKind,
    /// Rates carried by a base event
    pub base_rates: fn(&EventPayload) -> Option<TokenAmounts>,
    /// Delta carried by a delta event, when active at its block time
    pub active_delta: fn(&StoredEvent) -> Option<TokenAmounts>,
    /// Without a base event the pool has no row at all
    pub requires_base: bool,
}

impl Layering {
    fn kinds(&self) -> [EventKind; 2] {
        [self.base_kind, self.delta_kind]
    }

    fn is_above_base(row: &LayeredRates, id: EventId) -> bool {
        row.base_event_id.map_or(true, |base| id > base)
    }

    /// Re-derive the row from `base` (or from nothing) and the deltas above it
    fn rebase(
        &self,
        log: &EventLog,
        pool: PoolKeyId,
        base: Option<&StoredEvent>,
    ) -> Option<LayeredRates> {
        if base.is_none() && self.requires_base {
            return None;
        }
        let last_event_id = log.latest_pool_event(pool, &self.kinds())?.event_id;

        let base_rates = base
            .and_then(|event| (self.base_rates)(&event.payload))
            .unwrap_or_default();
        let mut rates = base_rates.clone();
        for event in log.pool_events(pool, self.delta_kind, base.map(|b| b.event_id)) {
            if let Some(delta) = (self.active_delta)(event) {
                rates += &delta;
            }
        }

        Some(LayeredRates {
            rates,
            base_rates,
            base_event_id: base.map(|b| b.event_id),
            last_event_id,
        })
    }

    /// Row after `event` was inserted into the log
    pub fn on_insert(
        &self,
        log: &EventLog,
        pool: PoolKeyId,
        current: Option<&LayeredRates>,
        event: &StoredEvent,
    ) -> Option<LayeredRates> {
        let id = event.event_id;

        if event.kind() == self.base_kind {
            return match current {
                Some(row) if !Self::is_above_base(row, id) => {
                    // an older base changes nothing
                    Some(row.clone())
                }
                _ => self.rebase(log, pool, Some(event)),
            };
        }

        match current {
            Some(row) => {
                let mut row = row.clone();
                if Self::is_above_base(&row, id) {
                    if let Some(delta) = (self.active_delta)(event) {
                        row.rates += &delta;
                    }
                }
                row.last_event_id = row.last_event_id.max(id);
                Some(row)
            }
            None => self.rebase(log, pool, None),
        }
    }

    /// Row after `event` was removed from the log
    pub fn on_delete(
        &self,
        log: &EventLog,
        pool: PoolKeyId,
        current: Option<&LayeredRates>,
        event: &StoredEvent,
    ) -> Option<LayeredRates> {
        let row = current?;
        let id = event.event_id;

        if event.kind() == self.base_kind {
            if row.base_event_id != Some(id) {
                return Some(row.clone());
            }
            let base = log.latest_pool_event(pool, &[self.base_kind]);
            return self.rebase(log, pool, base);
        }

        let mut row = row.clone();
        if Self::is_above_base(&row, id) {
            if let Some(delta) = (self.active_delta)(event) {
                row.rates -= &delta;
            }
        }
        if row.last_event_id == id {
            match log.latest_pool_event(pool, &self.kinds()) {
                Some(latest) => row.last_event_id = latest.event_id,
                None => return None,
            }
        }
        Some(row)
    }
}
