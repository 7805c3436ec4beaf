//! Event builders for unit tests: chain 1, pool key 1, one event per block
//! unless told otherwise.

use crate::store::StoredEvent;
use num_bigint::BigInt;
use types::{
    Address, ChainId, EventLocation, EventPayload, FeesDonated, Hash32, NftTransfer,
    OracleSnapshot, OrderUpdated, PoolBoosted, PoolInitialized, PoolKeyId, PositionFeesCollected,
    PositionUpdated, Swapped, VirtualOrdersExecuted,
};

pub const TOKEN0: Address = Address::new([0x11; 20]);
pub const TOKEN1: Address = Address::new([0x22; 20]);
pub const NFT: Address = Address::new([0xee; 20]);

pub fn event(block: u64, event_index: u64, payload: EventPayload) -> StoredEvent {
    event_at_index(block, event_index, block * 100, payload)
}

pub fn event_at(block: u64, block_time: u64, payload: EventPayload) -> StoredEvent {
    event_at_index(block, 0, block_time, payload)
}

fn event_at_index(block: u64, event_index: u64, block_time: u64, payload: EventPayload) -> StoredEvent {
    let location = EventLocation {
        chain_id: ChainId::new(1),
        block_number: block,
        transaction_index: 0,
        event_index,
        transaction_hash: Hash32::new([block as u8; 32]),
        emitter: NFT,
    };
    let pool_key_id = payload.kind().is_pool_scoped().then(|| PoolKeyId::new(1));
    StoredEvent {
        event_id: codec::event_id_for(&location).unwrap(),
        location,
        pool_key_id,
        block_time,
        payload,
    }
}

pub fn init(tick: i32, sqrt_ratio: u64) -> EventPayload {
    EventPayload::PoolInitialization(PoolInitialized {
        pool_id: Hash32::new([0xab; 32]),
        token0: TOKEN0,
        token1: TOKEN1,
        extension: Address::ZERO,
        fee: 0,
        tick_spacing: 100,
        tick,
        sqrt_ratio: BigInt::from(sqrt_ratio),
    })
}

pub fn swap(tick_after: i32, liquidity_after: u64) -> EventPayload {
    EventPayload::Swap(Swapped {
        locker: Address::ZERO,
        pool_id: Hash32::new([0xab; 32]),
        delta0: BigInt::from(0),
        delta1: BigInt::from(0),
        liquidity_after: BigInt::from(liquidity_after),
        sqrt_ratio_after: BigInt::from(1u8) << 128usize,
        tick_after,
    })
}

pub fn swap_with_deltas(delta0: i64, delta1: i64) -> EventPayload {
    let EventPayload::Swap(mut swapped) = swap(0, 0) else {
        unreachable!()
    };
    swapped.delta0 = BigInt::from(delta0);
    swapped.delta1 = BigInt::from(delta1);
    EventPayload::Swap(swapped)
}

/// Position update depositing `(liquidity_delta, 2 * liquidity_delta)`
pub fn position(lower: i32, upper: i32, liquidity_delta: i64) -> EventPayload {
    EventPayload::PositionUpdate(PositionUpdated {
        locker: Address::ZERO,
        pool_id: Hash32::new([0xab; 32]),
        salt: Hash32::ZERO,
        lower,
        upper,
        liquidity_delta: BigInt::from(liquidity_delta),
        delta0: BigInt::from(liquidity_delta),
        delta1: BigInt::from(2 * liquidity_delta),
    })
}

pub fn fees_collected(amount0: i64, amount1: i64) -> EventPayload {
    EventPayload::PositionFeesCollected(PositionFeesCollected {
        pool_id: Hash32::new([0xab; 32]),
        owner: Address::ZERO,
        salt: Hash32::ZERO,
        lower: -10,
        upper: 10,
        amount0: BigInt::from(amount0),
        amount1: BigInt::from(amount1),
    })
}

pub fn virtual_execution(rate0: i64, rate1: i64) -> EventPayload {
    EventPayload::TwammVirtualOrderExecution(VirtualOrdersExecuted {
        pool_id: Hash32::new([0xab; 32]),
        token0_sale_rate: BigInt::from(rate0),
        token1_sale_rate: BigInt::from(rate1),
    })
}

/// Order selling token0 when `sells_token0`, token1 otherwise
pub fn order_update(start_time: u64, end_time: u64, delta: i64, sells_token0: bool) -> EventPayload {
    let (sell_token, buy_token) = if sells_token0 {
        (TOKEN0, TOKEN1)
    } else {
        (TOKEN1, TOKEN0)
    };
    EventPayload::TwammOrderUpdate(OrderUpdated {
        owner: Address::ZERO,
        salt: Hash32::ZERO,
        sell_token,
        buy_token,
        fee: 0,
        start_time,
        end_time,
        sale_rate_delta: BigInt::from(delta),
    })
}

pub fn snapshot(timestamp: u64, tick_cumulative: i64) -> EventPayload {
    EventPayload::OracleSnapshot(OracleSnapshot {
        token: TOKEN1,
        timestamp,
        seconds_per_liquidity_cumulative: BigInt::from(timestamp),
        tick_cumulative,
    })
}

pub fn boost(start_time: u64, end_time: u64, rate0: i64, rate1: i64) -> EventPayload {
    EventPayload::PoolBoosted(PoolBoosted {
        pool_id: Hash32::new([0xab; 32]),
        start_time,
        end_time,
        rate0: BigInt::from(rate0),
        rate1: BigInt::from(rate1),
    })
}

pub fn donation(rate0: i64, rate1: i64) -> EventPayload {
    EventPayload::FeesDonated(FeesDonated {
        pool_id: Hash32::new([0xab; 32]),
        donate_rate0: BigInt::from(rate0),
        donate_rate1: BigInt::from(rate1),
    })
}

pub fn transfer(from: u8, to: u8, token_id: u8) -> EventPayload {
    let mut id = [0u8; 32];
    id[31] = token_id;
    EventPayload::NftTransfer(NftTransfer {
        from: Address::new([from; 20]),
        to: Address::new([to; 20]),
        token_id: Hash32::new(id),
    })
}
