//! Scripted pipeline scenarios

use anyhow::{ensure, Context, Result};
use num_bigint::BigInt;
use state_engine::{EngineError, TwapQuery};
use types::{Address, EventKind};

use crate::fixtures::*;
use crate::framework::{TestFramework, TestScenario};

pub fn all() -> Vec<Box<dyn TestScenario>> {
    vec![
        Box::new(ReorgRecoveryScenario),
        Box::new(OracleTwapScenario),
        Box::new(TwammOrderScenario),
        Box::new(NftOwnershipScenario),
        Box::new(ImmutabilityScenario),
    ]
}

/// Liquidity survives a reorg that replaces the chain tip
pub struct ReorgRecoveryScenario;

impl TestScenario for ReorgRecoveryScenario {
    fn name(&self) -> &str {
        "reorg_recovery"
    }

    fn description(&self) -> &str {
        "Initialize, swap and deposit, retract the tip, re-ingest a replacement block"
    }

    fn execute(&self, fw: &TestFramework) -> Result<Vec<String>> {
        let chain = fw.primary_chain()?;
        let pool = fw.add_pool(chain, pool_id(1), Address::ZERO)?;
        let engine = fw.engine();
        for number in 100..=102 {
            fw.add_block(chain, number, 1_700_000_000 + number * 12)?;
        }

        fw.feed(chain, (100, 0), Some(pool), EventKind::PoolInitialization, &init_hex(pool_id(1), 20, 1 << 96))?;
        fw.feed(chain, (101, 0), Some(pool), EventKind::Swap, &swap_hex(pool_id(1), 500, -490, 1_000, 25))?;
        fw.feed(chain, (102, 3), Some(pool), EventKind::PositionUpdate, &position_hex(pool_id(1), -100, 100, 250))?;

        let state = engine.pool_state(pool).context("pool state missing")?;
        ensure!(state.liquidity() == BigInt::from(1_250), "liquidity {}", state.liquidity());
        let mut checks = vec!["liquidity layered onto swap".to_string()];

        let summary = engine.rollback_to(chain, 102)?;
        ensure!(summary.events_deleted == 1, "{summary:?}");
        ensure!(engine.fork_epoch(chain) == 1, "epoch not bumped");
        let state = engine.pool_state(pool).context("pool state missing")?;
        ensure!(state.liquidity() == BigInt::from(1_000) && state.tick == 25);
        ensure!(engine.tick_liquidity_curve(pool).is_empty());
        checks.push("tip retracted".to_string());

        let replacement = fw.add_block(chain, 102, 1_700_001_224)?;
        ensure!(replacement.fork_epoch == Some(1), "replacement not stamped");
        fw.feed(chain, (102, 0), Some(pool), EventKind::Swap, &swap_hex(pool_id(1), -10, 10, 1_000, 24))?;
        ensure!(engine.pool_state(pool).map(|s| s.tick) == Some(24));
        checks.push("replacement block ingested".to_string());

        let tvl = engine.pool_tvl(pool).context("tvl missing")?;
        ensure!(tvl.balance0 == BigInt::from(490) && tvl.balance1 == BigInt::from(-480));
        checks.push("tvl follows surviving swaps".to_string());
        Ok(checks)
    }
}

/// TWAP routed through the oracle token
pub struct OracleTwapScenario;

impl TestScenario for OracleTwapScenario {
    fn name(&self) -> &str {
        "oracle_twap"
    }

    fn description(&self) -> &str {
        "Snapshots at two instants, then TWAP queries over the window"
    }

    fn execute(&self, fw: &TestFramework) -> Result<Vec<String>> {
        let chain = fw.primary_chain()?;
        let engine = fw.engine();
        // TOKEN0 is both the oracle and the quote token
        let pool = fw.add_pool(chain, pool_id(2), ORACLE)?;
        fw.add_block(chain, 1, 1_000)?;
        fw.add_block(chain, 2, 1_300)?;

        fw.feed(chain, (1, 0), Some(pool), EventKind::OracleSnapshot, &snapshot_hex(TOKEN1, 1_000, 0))?;
        fw.feed(chain, (2, 0), Some(pool), EventKind::OracleSnapshot, &snapshot_hex(TOKEN1, 1_300, 6_000))?;

        let query = TwapQuery {
            chain_id: chain,
            extension: ORACLE,
            oracle_token: TOKEN0,
            base_token: TOKEN1,
            quote_token: TOKEN0,
            duration_secs: 300,
        };
        // leg(oracle, base) averages 20; quote is the oracle token, so its leg is 0
        ensure!(engine.twap_at(&query, 1_300)? == Some(-20));
        let mut checks = vec!["single-leg twap".to_string()];

        ensure!(engine.twap_at(&TwapQuery { duration_secs: 400, ..query }, 1_300)?.is_none());
        checks.push("short history yields none".to_string());

        let rejected = engine.twap_at(&TwapQuery { duration_secs: 0, ..query }, 1_300);
        ensure!(matches!(rejected, Err(EngineError::InvalidArgument { .. })));
        checks.push("zero duration rejected".to_string());
        Ok(checks)
    }
}

/// Sale-rate deltas come and go with order updates
pub struct TwammOrderScenario;

impl TestScenario for TwammOrderScenario {
    fn name(&self) -> &str {
        "twamm_orders"
    }

    fn description(&self) -> &str {
        "An order update writes paired sale-rate deltas that vanish with its block"
    }

    fn execute(&self, fw: &TestFramework) -> Result<Vec<String>> {
        let chain = fw.primary_chain()?;
        let engine = fw.engine();
        let pool = fw.add_pool(chain, pool_id(3), Address::ZERO)?;
        fw.add_block(chain, 7, 5_000)?;

        fw.feed(chain, (7, 0), Some(pool), EventKind::TwammOrderUpdate, &order_update_hex(4_096, 8_192, 40))?;
        let rows = engine.sale_rate_deltas(pool, 0..=u64::MAX);
        ensure!(rows.len() == 2, "{rows:?}");
        ensure!(rows[0].1.token0 == BigInt::from(40) && rows[1].1.token0 == BigInt::from(-40));
        let mut checks = vec!["paired deltas written".to_string()];

        engine.delete_block(chain, 7)?;
        ensure!(engine.sale_rate_deltas(pool, 0..=u64::MAX).is_empty());
        checks.push("deltas removed with block".to_string());
        Ok(checks)
    }
}

/// Ownership rewinds when the latest transfer is retracted
pub struct NftOwnershipScenario;

impl TestScenario for NftOwnershipScenario {
    fn name(&self) -> &str {
        "nft_ownership"
    }

    fn description(&self) -> &str {
        "Mint then transfer a position token, retract the transfer"
    }

    fn execute(&self, fw: &TestFramework) -> Result<Vec<String>> {
        let chain = fw.primary_chain()?;
        let engine = fw.engine();
        let alice = Address::new([0xaa; 20]);
        let bob = Address::new([0xbb; 20]);
        fw.add_block(chain, 1, 12)?;
        fw.add_block(chain, 2, 24)?;

        fw.feed(chain, (1, 0), None, EventKind::NftTransfer, &transfer_hex(Address::ZERO, alice, 9))?;
        fw.feed(chain, (2, 0), None, EventKind::NftTransfer, &transfer_hex(alice, bob, 9))?;

        let mut id = [0u8; 32];
        id[31] = 9;
        let token_id = types::Hash32::new(id);
        let owner = engine.nft_owner(chain, CORE, token_id).context("owner missing")?;
        ensure!(owner.current_owner == bob);
        let mut checks = vec!["latest transfer wins".to_string()];

        engine.delete_block(chain, 2)?;
        let owner = engine.nft_owner(chain, CORE, token_id).context("owner missing")?;
        ensure!(owner.current_owner == alice && owner.previous_owner == Address::ZERO);
        checks.push("ownership rewound".to_string());
        Ok(checks)
    }
}

/// Event rows reject modification and duplicates
pub struct ImmutabilityScenario;

impl TestScenario for ImmutabilityScenario {
    fn name(&self) -> &str {
        "immutability"
    }

    fn description(&self) -> &str {
        "Duplicate inserts, updates and malformed payloads are all refused"
    }

    fn execute(&self, fw: &TestFramework) -> Result<Vec<String>> {
        let chain = fw.primary_chain()?;
        let engine = fw.engine();
        let pool = fw.add_pool(chain, pool_id(4), Address::ZERO)?;
        fw.add_block(chain, 1, 12)?;

        let hex = swap_hex(pool_id(4), 1, 1, 10, 0);
        let id = fw.feed(chain, (1, 0), Some(pool), EventKind::Swap, &hex)?;

        let duplicate = engine.insert_raw_event(
            engine.event(chain, id).context("event missing")?.location,
            Some(pool),
            EventKind::Swap,
            &hex,
        );
        ensure!(matches!(duplicate, Err(EngineError::ImmutableRecord { .. })));
        let mut checks = vec!["duplicate refused".to_string()];

        let payload = engine.event(chain, id).context("event missing")?.payload;
        ensure!(matches!(
            engine.update_event(chain, id, payload),
            Err(EngineError::ImmutableRecord { .. })
        ));
        checks.push("update refused".to_string());

        let truncated = &hex[..hex.len() - 2];
        let malformed = fw.feed(chain, (1, 1), Some(pool), EventKind::Swap, truncated);
        ensure!(malformed.is_err());
        ensure!(engine.block_events(chain, 1).len() == 1);
        checks.push("malformed payload refused".to_string());
        Ok(checks)
    }
}
