//! # Event Decoders
//!
//! One fixed-width layout per event kind. Layouts are listed in wire order
//! (most significant field first) next to each impl; `read_fields` consumes
//! them in the opposite order because the reader peels from the low end.
//!
//! | Kind | Bytes |
//! |------|-------|
//! | pool initialization | 132 |
//! | swap | 128 |
//! | position update | 140 |
//! | position fees collected | 124 |
//! | fees accumulated | 64 |
//! | TWAMM virtual order execution | 60 |
//! | TWAMM order update | 130 |
//! | TWAMM proceeds withdrawal | 132 |
//! | oracle snapshot | 56 |
//! | limit order placed / closed | 128 |
//! | pool boosted | 76 |
//! | fees donated | 60 |
//! | NFT transfer | 72 |

use crate::error::{CodecError, CodecResult};
use crate::packed::PackedReader;
use tracing::trace;
use types::{
    EventKind, EventPayload, FeesAccumulated, FeesDonated, LimitOrderClosed, LimitOrderPlaced,
    NftTransfer, OracleSnapshot, OrderProceedsWithdrawn, OrderUpdated, PoolBoosted,
    PoolInitialized, PositionFeesCollected, PositionUpdated, Swapped, VirtualOrdersExecuted,
};

/// A typed event decodable from one packed record
pub trait PackedEvent: Sized {
    const KIND: EventKind;
    const BYTE_LEN: usize;

    /// Consume fields last-to-first
    fn read_fields(reader: &mut PackedReader) -> CodecResult<Self>;

    fn decode_hex(input: &str) -> CodecResult<Self> {
        let mut reader = PackedReader::from_hex(Self::KIND.table_name(), input, Self::BYTE_LEN)?;
        let event = Self::read_fields(&mut reader)?;
        reader.finish()?;
        Ok(event)
    }
}

fn check_interval(kind: EventKind, start: u64, end: u64) -> CodecResult<()> {
    if start >= end {
        return Err(CodecError::malformed(
            kind.table_name(),
            format!("start_time {start} must be before end_time {end}"),
        ));
    }
    Ok(())
}

// pool_id 256 | token0 160 | token1 160 | extension 160 | fee u64 | tick_spacing u32 | tick i32 | sqrt_ratio u192
impl PackedEvent for PoolInitialized {
    const KIND: EventKind = EventKind::PoolInitialization;
    const BYTE_LEN: usize = 132;

    fn read_fields(r: &mut PackedReader) -> CodecResult<Self> {
        let sqrt_ratio = r.unsigned(192)?;
        let tick = r.i32()?;
        let tick_spacing = r.u32()?;
        let fee = r.u64()?;
        let extension = r.address()?;
        let token1 = r.address()?;
        let token0 = r.address()?;
        let pool_id = r.hash()?;
        if token0 >= token1 {
            return Err(CodecError::malformed(
                Self::KIND.table_name(),
                "token0 must sort before token1",
            ));
        }
        Ok(Self {
            pool_id,
            token0,
            token1,
            extension,
            fee,
            tick_spacing,
            tick,
            sqrt_ratio,
        })
    }
}

// locker 160 | pool_id 256 | delta0 i128 | delta1 i128 | liquidity_after u128 | sqrt_ratio_after u192 | tick_after i32
impl PackedEvent for Swapped {
    const KIND: EventKind = EventKind::Swap;
    const BYTE_LEN: usize = 128;

    fn read_fields(r: &mut PackedReader) -> CodecResult<Self> {
        let tick_after = r.i32()?;
        let sqrt_ratio_after = r.unsigned(192)?;
        let liquidity_after = r.unsigned(128)?;
        let delta1 = r.signed(128)?;
        let delta0 = r.signed(128)?;
        let pool_id = r.hash()?;
        let locker = r.address()?;
        Ok(Self {
            locker,
            pool_id,
            delta0,
            delta1,
            liquidity_after,
            sqrt_ratio_after,
            tick_after,
        })
    }
}

// locker 160 | pool_id 256 | salt 256 | lower i32 | upper i32 | liquidity_delta i128 | delta0 i128 | delta1 i128
impl PackedEvent for PositionUpdated {
    const KIND: EventKind = EventKind::PositionUpdate;
    const BYTE_LEN: usize = 140;

    fn read_fields(r: &mut PackedReader) -> CodecResult<Self> {
        let delta1 = r.signed(128)?;
        let delta0 = r.signed(128)?;
        let liquidity_delta = r.signed(128)?;
        let upper = r.i32()?;
        let lower = r.i32()?;
        let salt = r.hash()?;
        let pool_id = r.hash()?;
        let locker = r.address()?;
        if lower >= upper {
            return Err(CodecError::malformed(
                Self::KIND.table_name(),
                format!("lower tick {lower} must be below upper tick {upper}"),
            ));
        }
        Ok(Self {
            locker,
            pool_id,
            salt,
            lower,
            upper,
            liquidity_delta,
            delta0,
            delta1,
        })
    }
}

// pool_id 256 | owner 160 | salt 256 | lower i32 | upper i32 | amount0 u128 | amount1 u128
impl PackedEvent for PositionFeesCollected {
    const KIND: EventKind = EventKind::PositionFeesCollected;
    const BYTE_LEN: usize = 124;

    fn read_fields(r: &mut PackedReader) -> CodecResult<Self> {
        let amount1 = r.unsigned(128)?;
        let amount0 = r.unsigned(128)?;
        let upper = r.i32()?;
        let lower = r.i32()?;
        let salt = r.hash()?;
        let owner = r.address()?;
        let pool_id = r.hash()?;
        Ok(Self {
            pool_id,
            owner,
            salt,
            lower,
            upper,
            amount0,
            amount1,
        })
    }
}

// pool_id 256 | amount0 u128 | amount1 u128
impl PackedEvent for FeesAccumulated {
    const KIND: EventKind = EventKind::FeesAccumulated;
    const BYTE_LEN: usize = 64;

    fn read_fields(r: &mut PackedReader) -> CodecResult<Self> {
        let amount1 = r.unsigned(128)?;
        let amount0 = r.unsigned(128)?;
        let pool_id = r.hash()?;
        Ok(Self {
            pool_id,
            amount0,
            amount1,
        })
    }
}

// pool_id 256 | token0_sale_rate u112 | token1_sale_rate u112
impl PackedEvent for VirtualOrdersExecuted {
    const KIND: EventKind = EventKind::TwammVirtualOrderExecution;
    const BYTE_LEN: usize = 60;

    fn read_fields(r: &mut PackedReader) -> CodecResult<Self> {
        let token1_sale_rate = r.unsigned(112)?;
        let token0_sale_rate = r.unsigned(112)?;
        let pool_id = r.hash()?;
        Ok(Self {
            pool_id,
            token0_sale_rate,
            token1_sale_rate,
        })
    }
}

// owner 160 | salt 256 | sell_token 160 | buy_token 160 | fee u64 | start_time u64 | end_time u64 | sale_rate_delta i112
impl PackedEvent for OrderUpdated {
    const KIND: EventKind = EventKind::TwammOrderUpdate;
    const BYTE_LEN: usize = 130;

    fn read_fields(r: &mut PackedReader) -> CodecResult<Self> {
        let sale_rate_delta = r.signed(112)?;
        let end_time = r.u64()?;
        let start_time = r.u64()?;
        let fee = r.u64()?;
        let buy_token = r.address()?;
        let sell_token = r.address()?;
        let salt = r.hash()?;
        let owner = r.address()?;
        check_interval(Self::KIND, start_time, end_time)?;
        if sell_token == buy_token {
            return Err(CodecError::malformed(
                Self::KIND.table_name(),
                "sell_token and buy_token must differ",
            ));
        }
        Ok(Self {
            owner,
            salt,
            sell_token,
            buy_token,
            fee,
            start_time,
            end_time,
            sale_rate_delta,
        })
    }
}

// owner 160 | salt 256 | sell_token 160 | buy_token 160 | fee u64 | start_time u64 | end_time u64 | amount u128
impl PackedEvent for OrderProceedsWithdrawn {
    const KIND: EventKind = EventKind::TwammProceedsWithdrawal;
    const BYTE_LEN: usize = 132;

    fn read_fields(r: &mut PackedReader) -> CodecResult<Self> {
        let amount = r.unsigned(128)?;
        let end_time = r.u64()?;
        let start_time = r.u64()?;
        let fee = r.u64()?;
        let buy_token = r.address()?;
        let sell_token = r.address()?;
        let salt = r.hash()?;
        let owner = r.address()?;
        check_interval(Self::KIND, start_time, end_time)?;
        Ok(Self {
            owner,
            salt,
            sell_token,
            buy_token,
            fee,
            start_time,
            end_time,
            amount,
        })
    }
}

// token 160 | timestamp u64 | seconds_per_liquidity_cumulative u160 | tick_cumulative i64
impl PackedEvent for OracleSnapshot {
    const KIND: EventKind = EventKind::OracleSnapshot;
    const BYTE_LEN: usize = 56;

    fn read_fields(r: &mut PackedReader) -> CodecResult<Self> {
        let tick_cumulative = r.i64()?;
        let seconds_per_liquidity_cumulative = r.unsigned(160)?;
        let timestamp = r.u64()?;
        let token = r.address()?;
        Ok(Self {
            token,
            timestamp,
            seconds_per_liquidity_cumulative,
            tick_cumulative,
        })
    }
}

// owner 160 | salt 256 | token0 160 | token1 160 | tick i32 | liquidity u128 | amount u128
impl PackedEvent for LimitOrderPlaced {
    const KIND: EventKind = EventKind::LimitOrderPlaced;
    const BYTE_LEN: usize = 128;

    fn read_fields(r: &mut PackedReader) -> CodecResult<Self> {
        let amount = r.unsigned(128)?;
        let liquidity = r.unsigned(128)?;
        let tick = r.i32()?;
        let token1 = r.address()?;
        let token0 = r.address()?;
        let salt = r.hash()?;
        let owner = r.address()?;
        Ok(Self {
            owner,
            salt,
            token0,
            token1,
            tick,
            liquidity,
            amount,
        })
    }
}

// owner 160 | salt 256 | token0 160 | token1 160 | tick i32 | amount0 u128 | amount1 u128
impl PackedEvent for LimitOrderClosed {
    const KIND: EventKind = EventKind::LimitOrderClosed;
    const BYTE_LEN: usize = 128;

    fn read_fields(r: &mut PackedReader) -> CodecResult<Self> {
        let amount1 = r.unsigned(128)?;
        let amount0 = r.unsigned(128)?;
        let tick = r.i32()?;
        let token1 = r.address()?;
        let token0 = r.address()?;
        let salt = r.hash()?;
        let owner = r.address()?;
        Ok(Self {
            owner,
            salt,
            token0,
            token1,
            tick,
            amount0,
            amount1,
        })
    }
}

// pool_id 256 | start_time u64 | end_time u64 | rate0 u112 | rate1 u112
impl PackedEvent for PoolBoosted {
    const KIND: EventKind = EventKind::PoolBoosted;
    const BYTE_LEN: usize = 76;

    fn read_fields(r: &mut PackedReader) -> CodecResult<Self> {
        let rate1 = r.unsigned(112)?;
        let rate0 = r.unsigned(112)?;
        let end_time = r.u64()?;
        let start_time = r.u64()?;
        let pool_id = r.hash()?;
        check_interval(Self::KIND, start_time, end_time)?;
        Ok(Self {
            pool_id,
            start_time,
            end_time,
            rate0,
            rate1,
        })
    }
}

// pool_id 256 | donate_rate0 u112 | donate_rate1 u112
impl PackedEvent for FeesDonated {
    const KIND: EventKind = EventKind::FeesDonated;
    const BYTE_LEN: usize = 60;

    fn read_fields(r: &mut PackedReader) -> CodecResult<Self> {
        let donate_rate1 = r.unsigned(112)?;
        let donate_rate0 = r.unsigned(112)?;
        let pool_id = r.hash()?;
        Ok(Self {
            pool_id,
            donate_rate0,
            donate_rate1,
        })
    }
}

// from 160 | to 160 | token_id u256
impl PackedEvent for NftTransfer {
    const KIND: EventKind = EventKind::NftTransfer;
    const BYTE_LEN: usize = 72;

    fn read_fields(r: &mut PackedReader) -> CodecResult<Self> {
        let token_id = r.hash()?;
        let to = r.address()?;
        let from = r.address()?;
        Ok(Self { from, to, token_id })
    }
}

/// Decode a payload of a kind known from the log's signature
pub fn decode_payload(kind: EventKind, input: &str) -> CodecResult<EventPayload> {
    let payload = match kind {
        EventKind::PoolInitialization => {
            EventPayload::PoolInitialization(PoolInitialized::decode_hex(input)?)
        }
        EventKind::Swap => EventPayload::Swap(Swapped::decode_hex(input)?),
        EventKind::PositionUpdate => EventPayload::PositionUpdate(PositionUpdated::decode_hex(input)?),
        EventKind::PositionFeesCollected => {
            EventPayload::PositionFeesCollected(PositionFeesCollected::decode_hex(input)?)
        }
        EventKind::FeesAccumulated => {
            EventPayload::FeesAccumulated(FeesAccumulated::decode_hex(input)?)
        }
        EventKind::TwammVirtualOrderExecution => {
            EventPayload::TwammVirtualOrderExecution(VirtualOrdersExecuted::decode_hex(input)?)
        }
        EventKind::TwammOrderUpdate => EventPayload::TwammOrderUpdate(OrderUpdated::decode_hex(input)?),
        EventKind::TwammProceedsWithdrawal => {
            EventPayload::TwammProceedsWithdrawal(OrderProceedsWithdrawn::decode_hex(input)?)
        }
        EventKind::OracleSnapshot => EventPayload::OracleSnapshot(OracleSnapshot::decode_hex(input)?),
        EventKind::LimitOrderPlaced => {
            EventPayload::LimitOrderPlaced(LimitOrderPlaced::decode_hex(input)?)
        }
        EventKind::LimitOrderClosed => {
            EventPayload::LimitOrderClosed(LimitOrderClosed::decode_hex(input)?)
        }
        EventKind::PoolBoosted => EventPayload::PoolBoosted(PoolBoosted::decode_hex(input)?),
        EventKind::FeesDonated => EventPayload::FeesDonated(FeesDonated::decode_hex(input)?),
        EventKind::NftTransfer => EventPayload::NftTransfer(NftTransfer::decode_hex(input)?),
    };
    trace!(kind = kind.table_name(), "decoded packed payload");
    Ok(payload)
}

/// Fixed byte width of a kind's payload
pub fn payload_len(kind: EventKind) -> usize {
    match kind {
        EventKind::PoolInitialization => PoolInitialized::BYTE_LEN,
        EventKind::Swap => Swapped::BYTE_LEN,
        EventKind::PositionUpdate => PositionUpdated::BYTE_LEN,
        EventKind::PositionFeesCollected => PositionFeesCollected::BYTE_LEN,
        EventKind::FeesAccumulated => FeesAccumulated::BYTE_LEN,
        EventKind::TwammVirtualOrderExecution => VirtualOrdersExecuted::BYTE_LEN,
        EventKind::TwammOrderUpdate => OrderUpdated::BYTE_LEN,
        EventKind::TwammProceedsWithdrawal => OrderProceedsWithdrawn::BYTE_LEN,
        EventKind::OracleSnapshot => OracleSnapshot::BYTE_LEN,
        EventKind::LimitOrderPlaced => LimitOrderPlaced::BYTE_LEN,
        EventKind::LimitOrderClosed => LimitOrderClosed::BYTE_LEN,
        EventKind::PoolBoosted => PoolBoosted::BYTE_LEN,
        EventKind::FeesDonated => FeesDonated::BYTE_LEN,
        EventKind::NftTransfer => NftTransfer::BYTE_LEN,
    }
}
