//! Shared fixtures: one concentrated pool on chain 1 between `TOKEN0` and
//! `TOKEN1`, blocks created on demand at `time = number * 12`.

#![allow(dead_code)]

use num_bigint::BigInt;
use state_engine::Engine;
use types::{
    Address, Block, ChainId, EventLocation, EventPayload, FeesDonated, Hash32, NewEvent,
    NftTransfer, OracleSnapshot, OrderUpdated, PoolBoosted, PoolInitialized, PoolKeyId,
    PoolKeyParams, PositionFeesCollected, PositionUpdated, Swapped, VirtualOrdersExecuted,
};

pub const CHAIN: ChainId = ChainId::new(1);
pub const CORE: Address = Address::new([0xc0; 20]);
pub const TOKEN0: Address = Address::new([0x11; 20]);
pub const TOKEN1: Address = Address::new([0x22; 20]);
pub const NFT: Address = Address::new([0xee; 20]);
pub const POOL_ID: Hash32 = Hash32::new([0xab; 32]);

pub fn block_time(number: u64) -> u64 {
    number * 12
}

pub fn pool_params(chain_id: ChainId, pool_id: Hash32, token0: Address, token1: Address, extension: Address) -> PoolKeyParams {
    PoolKeyParams {
        chain_id,
        core: CORE,
        pool_id,
        token0,
        token1,
        fee: 3000,
        fee_denominator: None,
        tick_spacing: Some(100),
        center_tick: None,
        amplification: None,
        extension,
    }
}

pub fn engine_with_pool() -> (Engine, PoolKeyId) {
    let engine = Engine::new();
    let pool = engine
        .insert_pool_key(pool_params(CHAIN, POOL_ID, TOKEN0, TOKEN1, Address::ZERO))
        .unwrap();
    (engine, pool)
}

pub fn ensure_block(engine: &Engine, chain_id: ChainId, number: u64) {
    if engine.block(chain_id, number).is_none() {
        engine
            .insert_block(Block::new(chain_id, number, Hash32::new([number as u8; 32]), block_time(number)))
            .unwrap();
    }
}

pub fn location(chain_id: ChainId, block: u64, event_index: u64) -> EventLocation {
    EventLocation {
        chain_id,
        block_number: block,
        transaction_index: 0,
        event_index,
        transaction_hash: Hash32::new([block as u8; 32]),
        emitter: if chain_id == CHAIN { NFT } else { CORE },
    }
}

/// Event at `(block, event_index)` on chain 1; NFT transfers carry no pool
pub fn new_event(pool: PoolKeyId, block: u64, event_index: u64, payload: EventPayload) -> NewEvent {
    let pool_key_id = payload.kind().is_pool_scoped().then_some(pool);
    NewEvent {
        location: location(CHAIN, block, event_index),
        pool_key_id,
        payload,
    }
}

pub fn init(tick: i32, sqrt_ratio: u64) -> EventPayload {
    EventPayload::PoolInitialization(PoolInitialized {
        pool_id: POOL_ID,
        token0: TOKEN0,
        token1: TOKEN1,
        extension: Address::ZERO,
        fee: 3000,
        tick_spacing: 100,
        tick,
        sqrt_ratio: BigInt::from(sqrt_ratio),
    })
}

pub fn swap(tick_after: i32, liquidity_after: u64, delta0: i64, delta1: i64) -> EventPayload {
    EventPayload::Swap(Swapped {
        locker: Address::ZERO,
        pool_id: POOL_ID,
        delta0: BigInt::from(delta0),
        delta1: BigInt::from(delta1),
        liquidity_after: BigInt::from(liquidity_after),
        sqrt_ratio_after: BigInt::from(1500u32),
        tick_after,
    })
}

pub fn position(lower: i32, upper: i32, liquidity_delta: i64) -> EventPayload {
    EventPayload::PositionUpdate(PositionUpdated {
        locker: Address::ZERO,
        pool_id: POOL_ID,
        salt: Hash32::ZERO,
        lower,
        upper,
        liquidity_delta: BigInt::from(liquidity_delta),
        delta0: BigInt::from(liquidity_delta),
        delta1: BigInt::from(liquidity_delta / 2),
    })
}

pub fn fees_collected(amount0: i64, amount1: i64) -> EventPayload {
    EventPayload::PositionFeesCollected(PositionFeesCollected {
        pool_id: POOL_ID,
        owner: Address::ZERO,
        salt: Hash32::ZERO,
        lower: -100,
        upper: 100,
        amount0: BigInt::from(amount0),
        amount1: BigInt::from(amount1),
    })
}

pub fn virtual_execution(rate0: i64, rate1: i64) -> EventPayload {
    EventPayload::TwammVirtualOrderExecution(VirtualOrdersExecuted {
        pool_id: POOL_ID,
        token0_sale_rate: BigInt::from(rate0),
        token1_sale_rate: BigInt::from(rate1),
    })
}

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
        fee: 3000,
        start_time,
        end_time,
        sale_rate_delta: BigInt::from(delta),
    })
}

pub fn snapshot(token: Address, timestamp: u64, tick_cumulative: i64) -> EventPayload {
    EventPayload::OracleSnapshot(OracleSnapshot {
        token,
        timestamp,
        seconds_per_liquidity_cumulative: BigInt::from(timestamp) << 32usize,
        tick_cumulative,
    })
}

pub fn boost(start_time: u64, end_time: u64, rate0: i64, rate1: i64) -> EventPayload {
    EventPayload::PoolBoosted(PoolBoosted {
        pool_id: POOL_ID,
        start_time,
        end_time,
        rate0: BigInt::from(rate0),
        rate1: BigInt::from(rate1),
    })
}

pub fn donation(rate0: i64, rate1: i64) -> EventPayload {
    EventPayload::FeesDonated(FeesDonated {
        pool_id: POOL_ID,
        donate_rate0: BigInt::from(rate0),
        donate_rate1: BigInt::from(rate1),
    })
}

pub fn token_id(byte: u8) -> Hash32 {
    let mut id = [0u8; 32];
    id[31] = byte;
    Hash32::new(id)
}

pub fn transfer(from: u8, to: u8, token: u8) -> EventPayload {
    EventPayload::NftTransfer(NftTransfer {
        from: Address::new([from; 20]),
        to: Address::new([to; 20]),
        token_id: token_id(token),
    })
}
