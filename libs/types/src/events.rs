//! # Typed Event Facts
//!
//! One struct per decoded on-chain event kind, plus the addressing tuple every
//! event carries. Numeric fields wider than 64 bits are `BigInt` so deltas,
//! liquidity and sale rates never pass through floating point or a narrower
//! machine integer.

use crate::common::identifiers::{Address, ChainId, Hash32, PoolKeyId};
use num_bigint::BigInt;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

/// Every event kind the store records, one table each
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PoolInitialization,
    Swap,
    PositionUpdate,
    PositionFeesCollected,
    FeesAccumulated,
    TwammVirtualOrderExecution,
    TwammOrderUpdate,
    TwammProceedsWithdrawal,
    OracleSnapshot,
    LimitOrderPlaced,
    LimitOrderClosed,
    PoolBoosted,
    FeesDonated,
    NftTransfer,
}

impl EventKind {
    pub const ALL: [EventKind; 14] = [
        EventKind::PoolInitialization,
        EventKind::Swap,
        EventKind::PositionUpdate,
        EventKind::PositionFeesCollected,
        EventKind::FeesAccumulated,
        EventKind::TwammVirtualOrderExecution,
        EventKind::TwammOrderUpdate,
        EventKind::TwammProceedsWithdrawal,
        EventKind::OracleSnapshot,
        EventKind::LimitOrderPlaced,
        EventKind::LimitOrderClosed,
        EventKind::PoolBoosted,
        EventKind::FeesDonated,
        EventKind::NftTransfer,
    ];

    /// Name of the table holding this kind
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::PoolInitialization => "pool_initializations",
            Self::Swap => "swaps",
            Self::PositionUpdate => "position_updates",
            Self::PositionFeesCollected => "position_fees_collected",
            Self::FeesAccumulated => "fees_accumulated",
            Self::TwammVirtualOrderExecution => "twamm_virtual_order_executions",
            Self::TwammOrderUpdate => "twamm_order_updates",
            Self::TwammProceedsWithdrawal => "twamm_proceeds_withdrawals",
            Self::OracleSnapshot => "oracle_snapshots",
            Self::LimitOrderPlaced => "limit_order_placed",
            Self::LimitOrderClosed => "limit_order_closed",
            Self::PoolBoosted => "boosted_fees_events",
            Self::FeesDonated => "boosted_fees_donated",
            Self::NftTransfer => "nonfungible_token_transfers",
        }
    }

    /// Whether rows of this kind belong to a pool key
    pub fn is_pool_scoped(&self) -> bool {
        !matches!(self, Self::NftTransfer)
    }
}

/// Addressing tuple carried by every event
///
/// Indices are kept wide so an out-of-budget value reaches the ordering-key
/// assignor intact and is rejected there instead of being truncated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLocation {
    pub chain_id: ChainId,
    pub block_number: u64,
    pub transaction_index: u64,
    pub event_index: u64,
    pub transaction_hash: Hash32,
    pub emitter: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolInitialized {
    pub pool_id: Hash32,
    pub token0: Address,
    pub token1: Address,
    pub extension: Address,
    pub fee: u64,
    pub tick_spacing: u32,
    pub tick: i32,
    pub sqrt_ratio: BigInt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swapped {
    pub locker: Address,
    pub pool_id: Hash32,
    pub delta0: BigInt,
    pub delta1: BigInt,
    pub liquidity_after: BigInt,
    pub sqrt_ratio_after: BigInt,
    pub tick_after: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUpdated {
    pub locker: Address,
    pub pool_id: Hash32,
    pub salt: Hash32,
    pub lower: i32,
    pub upper: i32,
    pub liquidity_delta: BigInt,
    pub delta0: BigInt,
    pub delta1: BigInt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionFeesCollected {
    pub pool_id: Hash32,
    pub owner: Address,
    pub salt: Hash32,
    pub lower: i32,
    pub upper: i32,
    pub amount0: BigInt,
    pub amount1: BigInt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeesAccumulated {
    pub pool_id: Hash32,
    pub amount0: BigInt,
    pub amount1: BigInt,
}

/// TWAMM virtual order execution; carries the pool's sale rates after execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualOrdersExecuted {
    pub pool_id: Hash32,
    pub token0_sale_rate: BigInt,
    pub token1_sale_rate: BigInt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdated {
    pub owner: Address,
    pub salt: Hash32,
    pub sell_token: Address,
    pub buy_token: Address,
    pub fee: u64,
    pub start_time: u64,
    pub end_time: u64,
    pub sale_rate_delta: BigInt,
}

impl OrderUpdated {
    /// Sale rate delta split onto the pool's (token0, token1) sides
    pub fn sale_rate_deltas(&self) -> (BigInt, BigInt) {
        if self.sell_token < self.buy_token {
            (self.sale_rate_delta.clone(), BigInt::zero())
        } else {
            (BigInt::zero(), self.sale_rate_delta.clone())
        }
    }

    /// Whether the order sells at `time`
    pub fn is_active_at(&self, time: u64) -> bool {
        self.start_time <= time && time < self.end_time
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderProceedsWithdrawn {
    pub owner: Address,
    pub salt: Hash32,
    pub sell_token: Address,
    pub buy_token: Address,
    pub fee: u64,
    pub start_time: u64,
    pub end_time: u64,
    pub amount: BigInt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleSnapshot {
    pub token: Address,
    pub timestamp: u64,
    pub seconds_per_liquidity_cumulative: BigInt,
    pub tick_cumulative: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitOrderPlaced {
    pub owner: Address,
    pub salt: Hash32,
    pub token0: Address,
    pub token1: Address,
    pub tick: i32,
    pub liquidity: BigInt,
    pub amount: BigInt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitOrderClosed {
    pub owner: Address,
    pub salt: Hash32,
    pub token0: Address,
    pub token1: Address,
    pub tick: i32,
    pub amount0: BigInt,
    pub amount1: BigInt,
}

/// Boosted-fees interval: donate `rate0`/`rate1` per second during `[start, end)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolBoosted {
    pub pool_id: Hash32,
    pub start_time: u64,
    pub end_time: u64,
    pub rate0: BigInt,
    pub rate1: BigInt,
}

impl PoolBoosted {
    pub fn is_active_at(&self, time: u64) -> bool {
        self.start_time <= time && time < self.end_time
    }
}

/// Boosted-fees donation; carries the pool's donate rates after donating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeesDonated {
    pub pool_id: Hash32,
    pub donate_rate0: BigInt,
    pub donate_rate1: BigInt,
}

/// ERC-721 transfer; the emitter is the NFT contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftTransfer {
    pub from: Address,
    pub to: Address,
    pub token_id: Hash32,
}

/// Kind-specific payload of an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    PoolInitialization(PoolInitialized),
    Swap(Swapped),
    PositionUpdate(PositionUpdated),
    PositionFeesCollected(PositionFeesCollected),
    FeesAccumulated(FeesAccumulated),
    TwammVirtualOrderExecution(VirtualOrdersExecuted),
    TwammOrderUpdate(OrderUpdated),
    TwammProceedsWithdrawal(OrderProceedsWithdrawn),
    OracleSnapshot(OracleSnapshot),
    LimitOrderPlaced(LimitOrderPlaced),
    LimitOrderClosed(LimitOrderClosed),
    PoolBoosted(PoolBoosted),
    FeesDonated(FeesDonated),
    NftTransfer(NftTransfer),
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PoolInitialization(_) => EventKind::PoolInitialization,
            Self::Swap(_) => EventKind::Swap,
            Self::PositionUpdate(_) => EventKind::PositionUpdate,
            Self::PositionFeesCollected(_) => EventKind::PositionFeesCollected,
            Self::FeesAccumulated(_) => EventKind::FeesAccumulated,
            Self::TwammVirtualOrderExecution(_) => EventKind::TwammVirtualOrderExecution,
            Self::TwammOrderUpdate(_) => EventKind::TwammOrderUpdate,
            Self::TwammProceedsWithdrawal(_) => EventKind::TwammProceedsWithdrawal,
            Self::OracleSnapshot(_) => EventKind::OracleSnapshot,
            Self::LimitOrderPlaced(_) => EventKind::LimitOrderPlaced,
            Self::LimitOrderClosed(_) => EventKind::LimitOrderClosed,
            Self::PoolBoosted(_) => EventKind::PoolBoosted,
            Self::FeesDonated(_) => EventKind::FeesDonated,
            Self::NftTransfer(_) => EventKind::NftTransfer,
        }
    }

    /// Signed change of the pool's token balances caused by this event
    pub fn balance_delta(&self) -> Option<(BigInt, BigInt)> {
        match self {
            Self::Swap(e) => Some((e.delta0.clone(), e.delta1.clone())),
            Self::PositionUpdate(e) => Some((e.delta0.clone(), e.delta1.clone())),
            Self::PositionFeesCollected(e) => Some((-e.amount0.clone(), -e.amount1.clone())),
            Self::FeesAccumulated(e) => Some((e.amount0.clone(), e.amount1.clone())),
            _ => None,
        }
    }
}

/// An event as handed to the store for insertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub location: EventLocation,
    /// Required for pool-scoped kinds, must be `None` otherwise
    pub pool_key_id: Option<PoolKeyId>,
    pub payload: EventPayload,
}

impl NewEvent {
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }
}
