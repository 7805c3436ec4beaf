//! Full recomputation of the derived tables from an event set, used to check
//! that incremental maintenance never drifts.

use crate::error::EngineResult;
use crate::projections::{ProjectionSet, Views};
use crate::store::{EventLog, StoredEvent};

/// Apply `events` to empty tables in `(chain_id, event_id)` order
pub fn replay<'a>(
    events: impl IntoIterator<Item = &'a StoredEvent>,
    projections: &ProjectionSet,
) -> EngineResult<Views> {
    let mut ordered: Vec<&StoredEvent> = events.into_iter().collect();
    ordered.sort_unstable_by_key(|event| event.key());

    let mut log = EventLog::new();
    let mut views = Views::default();
    for event in ordered {
        log.insert(event.clone())?;
        projections.apply(&log, &mut views, event)?;
    }
    Ok(views)
}
