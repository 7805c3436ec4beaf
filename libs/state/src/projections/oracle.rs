//! Oracle snapshots
//!
//! Keeps the latest snapshot per oracle pool and a per-pool timeline keyed
//! by snapshot timestamp, which TWAP queries search for the last
//! observation at or before an instant.

use super::{pool_of, put_or_remove, Projection, Views};
use crate::error::EngineResult;
use crate::store::{EventLog, StoredEvent};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use tracing::debug;
use types::{Address, EventId, EventKind, EventPayload, PoolKeyId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleObservation {
    pub token: Address,
    pub timestamp: u64,
    pub tick_cumulative: i64,
    pub seconds_per_liquidity_cumulative: BigInt,
    pub event_id: EventId,
}

impl OracleObservation {
    fn from_event(event: &StoredEvent) -> Option<Self> {
        match &event.payload {
            EventPayload::OracleSnapshot(snapshot) => Some(Self {
                token: snapshot.token,
                timestamp: snapshot.timestamp,
                tick_cumulative: snapshot.tick_cumulative,
                seconds_per_liquidity_cumulative: snapshot
                    .seconds_per_liquidity_cumulative
                    .clone(),
                event_id: event.event_id,
            }),
            _ => None,
        }
    }
}

/// Last observation of `pool` with `timestamp <= at`
pub fn observation_at(views: &Views, pool: PoolKeyId, at: u64) -> Option<&OracleObservation> {
    views
        .oracle_timeline
        .range((pool, 0, EventId::MIN)..=(pool, at, EventId::MAX))
        .next_back()
        .map(|(_, observation)| observation)
}

pub struct OracleProjection;

impl Projection for OracleProjection {
    fn name(&self) -> &'static str {
        "oracle_pool_states"
    }

    fn kinds(&self) -> &'static [EventKind] {
        &[EventKind::OracleSnapshot]
    }

    fn apply(&self, _log: &EventLog, views: &mut Views, event: &StoredEvent) -> EngineResult<()> {
        let Some(observation) = OracleObservation::from_event(event) else {
            return Ok(());
        };
        let pool = pool_of(event)?;

        views.oracle_timeline.insert(
            (pool, observation.timestamp, observation.event_id),
            observation.clone(),
        );
        let is_latest = views
            .oracle_states
            .get(&pool)
            .map_or(true, |current| event.event_id > current.event_id);
        if is_latest {
            views.oracle_states.insert(pool, observation);
        }
        Ok(())
    }

    fn revert(&self, log: &EventLog, views: &mut Views, event: &StoredEvent) -> EngineResult<()> {
        let Some(observation) = OracleObservation::from_event(event) else {
            return Ok(());
        };
        let pool = pool_of(event)?;

        views
            .oracle_timeline
            .remove(&(pool, observation.timestamp, observation.event_id));
        let was_latest = views
            .oracle_states
            .get(&pool)
            .is_some_and(|current| current.event_id == event.event_id);
        if was_latest {
            let replacement = log
                .latest_pool_event(pool, &[EventKind::OracleSnapshot])
                .and_then(OracleObservation::from_event);
            debug!(
                pool = pool.inner(),
                remaining = replacement.is_some(),
                "Latest oracle snapshot retracted"
            );
            put_or_remove(&mut views.oracle_states, pool, replacement);
        }
        Ok(())
    }
}
