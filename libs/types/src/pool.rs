//! Pool keys and their validated configuration
//!
//! A pool is identified by `(chain_id, core, pool_id)`. Everything else on the
//! key is immutable metadata, except the derived [`PoolConfig`] which may be
//! backfilled for pools recorded before their configuration was known.

use crate::common::errors::ValidationError;
use crate::common::identifiers::{Address, ChainId, Hash32};
use serde::{Deserialize, Serialize};

/// Lowest tick a pool price can reach
pub const MIN_TICK: i32 = -88_722_835;
/// Highest tick a pool price can reach
pub const MAX_TICK: i32 = 88_722_835;

/// Accepted stableswap amplification range (inclusive)
pub const MIN_AMPLIFICATION: u8 = 0;
pub const MAX_AMPLIFICATION: u8 = 26;

/// Fees are 0.64 fixed point unless a pool says otherwise
pub const DEFAULT_FEE_DENOMINATOR: u128 = 1 << 64;

/// Liquidity shape of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PoolConfig {
    Concentrated { tick_spacing: u32 },
    Stableswap { center_tick: i32, amplification: u8 },
}

impl PoolConfig {
    /// Classify and validate the nullable configuration columns of a pool
    ///
    /// A tick spacing selects a concentrated pool and forbids the stableswap
    /// fields; without one, both the center tick and amplification must be
    /// present and in range.
    pub fn from_parts(
        tick_spacing: Option<u32>,
        center_tick: Option<i32>,
        amplification: Option<u8>,
    ) -> Result<Self, ValidationError> {
        match (tick_spacing, center_tick, amplification) {
            (Some(_), Some(_), _) => Err(ValidationError::ForbiddenField {
                pool_type: "concentrated",
                field: "center_tick",
            }),
            (Some(_), None, Some(_)) => Err(ValidationError::ForbiddenField {
                pool_type: "concentrated",
                field: "amplification",
            }),
            (Some(tick_spacing), None, None) => Ok(Self::Concentrated { tick_spacing }),
            (None, None, None) => Err(ValidationError::MissingTickSpacing),
            (None, None, Some(_)) => Err(ValidationError::MissingStableswapField {
                field: "center_tick",
            }),
            (None, Some(_), None) => Err(ValidationError::MissingStableswapField {
                field: "amplification",
            }),
            (None, Some(center_tick), Some(amplification)) => {
                if !(MIN_AMPLIFICATION..=MAX_AMPLIFICATION).contains(&amplification) {
                    return Err(ValidationError::AmplificationOutOfRange {
                        value: amplification,
                        min: MIN_AMPLIFICATION,
                        max: MAX_AMPLIFICATION,
                    });
                }
                if !(MIN_TICK..=MAX_TICK).contains(&center_tick) {
                    return Err(ValidationError::CenterTickOutOfRange {
                        value: center_tick,
                        min: MIN_TICK,
                        max: MAX_TICK,
                    });
                }
                Ok(Self::Stableswap {
                    center_tick,
                    amplification,
                })
            }
        }
    }

    pub fn tick_spacing(&self) -> Option<u32> {
        match self {
            Self::Concentrated { tick_spacing } => Some(*tick_spacing),
            Self::Stableswap { .. } => None,
        }
    }
}

/// Raw pool key columns as supplied by the ingestion process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolKeyParams {
    pub chain_id: ChainId,
    pub core: Address,
    pub pool_id: Hash32,
    pub token0: Address,
    pub token1: Address,
    pub fee: u64,
    pub fee_denominator: Option<u128>,
    pub tick_spacing: Option<u32>,
    pub center_tick: Option<i32>,
    pub amplification: Option<u8>,
    pub extension: Address,
}

/// Validated pool key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolKey {
    pub chain_id: ChainId,
    pub core: Address,
    pub pool_id: Hash32,
    pub token0: Address,
    pub token1: Address,
    pub fee: u64,
    pub fee_denominator: u128,
    pub extension: Address,
    pub config: PoolConfig,
}

impl PoolKey {
    pub fn new(params: PoolKeyParams) -> Result<Self, ValidationError> {
        if params.token0 >= params.token1 {
            return Err(ValidationError::UnsortedTokens);
        }
        let config = PoolConfig::from_parts(
            params.tick_spacing,
            params.center_tick,
            params.amplification,
        )?;
        Ok(Self {
            chain_id: params.chain_id,
            core: params.core,
            pool_id: params.pool_id,
            token0: params.token0,
            token1: params.token1,
            fee: params.fee,
            fee_denominator: params.fee_denominator.unwrap_or(DEFAULT_FEE_DENOMINATOR),
            extension: params.extension,
            config,
        })
    }

    pub fn tick_spacing(&self) -> Option<u32> {
        self.config.tick_spacing()
    }

    /// Whether `token` is this pool's token0
    pub fn is_token0(&self, token: &Address) -> bool {
        self.token0 == *token
    }
}

/// Sort a token pair into pool order
pub fn sort_tokens(a: Address, b: Address) -> (Address, Address) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
