//! NFT ownership, latest transfer wins

use super::{put_or_remove, Projection, Views};
use crate::error::EngineResult;
use crate::store::{EventLog, StoredEvent};
use serde::{Deserialize, Serialize};
use types::{Address, EventId, EventKind, EventPayload};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftOwner {
    pub current_owner: Address,
    pub previous_owner: Address,
    pub last_transfer_event_id: EventId,
}

impl NftOwner {
    fn from_event(event: &StoredEvent) -> Option<Self> {
        match &event.payload {
            EventPayload::NftTransfer(transfer) => Some(Self {
                current_owner: transfer.to,
                previous_owner: transfer.from,
                last_transfer_event_id: event.event_id,
            }),
            _ => None,
        }
    }
}

pub struct NftOwnerProjection;

impl Projection for NftOwnerProjection {
    fn name(&self) -> &'static str {
        "nonfungible_token_owners"
    }

    fn kinds(&self) -> &'static [EventKind] {
        &[EventKind::NftTransfer]
    }

    fn apply(&self, _log: &EventLog, views: &mut Views, event: &StoredEvent) -> EngineResult<()> {
        let EventPayload::NftTransfer(transfer) = &event.payload else {
            return Ok(());
        };
        let key = (event.chain_id(), event.location.emitter, transfer.token_id);

        let is_latest = views
            .nft_owners
            .get(&key)
            .map_or(true, |owner| event.event_id > owner.last_transfer_event_id);
        if is_latest {
            put_or_remove(&mut views.nft_owners, key, NftOwner::from_event(event));
        }
        Ok(())
    }

    fn revert(&self, log: &EventLog, views: &mut Views, event: &StoredEvent) -> EngineResult<()> {
        let EventPayload::NftTransfer(transfer) = &event.payload else {
            return Ok(());
        };
        let (chain, nft, token_id) = (event.chain_id(), event.location.emitter, transfer.token_id);
        let key = (chain, nft, token_id);

        let was_latest = views
            .nft_owners
            .get(&key)
            .is_some_and(|owner| owner.last_transfer_event_id == event.event_id);
        if was_latest {
            let rewound = log
                .latest_nft_transfer(chain, nft, token_id)
                .and_then(NftOwner::from_event);
            put_or_remove(&mut views.nft_owners, key, rewound);
        }
        Ok(())
    }
}
