//! Full pipeline: configuration file → engine → packed payloads → reorg

use e2e_tests::scenarios::{self, ReorgRecoveryScenario};
use e2e_tests::*;
use num_bigint::BigInt;
use std::fs;
use strata_config::{init_tracing, EngineConfig, LogFormat, LoggingConfig};
use tempfile::tempdir;
use types::{ChainId, EventKind, EventPayload};

const CONFIG: &str = r#"
[logging]
level = "strata=debug,info"
format = "pretty"

[chains.mainnet]
chain_id = 1
core = "0xe0e0e08A6A4b9Dc7bD67BCB7aadE5cF48157d444"
oracle = "0x51d02A5948496a67827242EaBc5725531342527C"

[chains.anvil]
chain_id = 31337
core = "0x0000000000000000000000000000000000000001"

[twap]
max_duration_secs = 3600
"#;

fn load_config() -> EngineConfig {
    let dir = tempdir().unwrap();
    let path = dir.path().join("strata.toml");
    fs::write(&path, CONFIG).unwrap();
    EngineConfig::load(&path).unwrap()
}

#[test]
fn test_every_scenario_passes() {
    let config = load_config();
    let results = run_all(&config, &scenarios::all()).unwrap();

    assert_eq!(results.len(), 5);
    for result in &results {
        assert!(result.passed, "{} failed: {:?}", result.scenario, result.error);
        assert!(!result.checks.is_empty());
    }
}

#[test]
fn test_configured_chains_start_at_epoch_zero() {
    let framework = TestFramework::new(load_config()).unwrap();
    let engine = framework.engine();

    assert_eq!(engine.chains(), vec![ChainId::new(1), ChainId::new(31337)]);
    assert_eq!(engine.fork_epoch(ChainId::new(1)), 0);
    assert_eq!(engine.settings().twap_max_duration_secs, 3_600);
    // BTreeMap order: "anvil" sorts first
    assert_eq!(framework.primary_chain().unwrap(), ChainId::new(31337));
}

#[test]
fn test_scenario_failure_is_reported_not_raised() {
    let framework = TestFramework::new(load_config()).unwrap();
    let first = framework.run(&ReorgRecoveryScenario);
    assert!(first.passed);

    // the pool key already exists on this engine
    let second = framework.run(&ReorgRecoveryScenario);
    assert!(!second.passed);
    assert!(second.error.unwrap().contains("pool_keys"));
}

#[test]
fn test_fixtures_decode_to_expected_payloads() {
    let swap = codec::decode_payload(EventKind::Swap, &swap_hex(pool_id(1), -5, 7, 99, -3)).unwrap();
    let EventPayload::Swap(swap) = swap else {
        panic!("expected a swap");
    };
    assert_eq!(swap.delta0, BigInt::from(-5));
    assert_eq!(swap.delta1, BigInt::from(7));
    assert_eq!(swap.tick_after, -3);

    let order =
        codec::decode_payload(EventKind::TwammOrderUpdate, &order_update_hex(10, 20, -40)).unwrap();
    let EventPayload::TwammOrderUpdate(order) = order else {
        panic!("expected an order update");
    };
    assert_eq!(order.sell_token, TOKEN0);
    assert_eq!(order.sale_rate_delta, BigInt::from(-40));
    assert_eq!((order.start_time, order.end_time), (10, 20));
}

#[test]
fn test_raw_events_survive_replay_check_after_mixed_reorgs() {
    let framework = TestFramework::from_toml(CONFIG).unwrap();
    let chain = ChainId::new(1);
    let pool = framework.add_pool(chain, pool_id(9), ORACLE).unwrap();
    let engine = framework.engine();

    for number in 1..=6u64 {
        framework.add_block(chain, number, number * 12).unwrap();
        framework
            .feed(chain, (number, 0), Some(pool), EventKind::Swap, &swap_hex(pool_id(9), 10, -10, 1_000 + number as u128, number as i32))
            .unwrap();
        framework
            .feed(chain, (number, 1), Some(pool), EventKind::PositionUpdate, &position_hex(pool_id(9), -100, 100, 5))
            .unwrap();
        framework
            .feed(chain, (number, 2), Some(pool), EventKind::OracleSnapshot, &snapshot_hex(TOKEN1, number * 12, number as i64 * 120))
            .unwrap();
    }

    engine.delete_block(chain, 3).unwrap();
    engine.rollback_to(chain, 5).unwrap();
    framework.check_consistency().unwrap();

    let state = engine.pool_state(pool).unwrap();
    assert_eq!(state.tick, 4);
    assert_eq!(state.liquidity(), BigInt::from(1_009));
    assert_eq!(engine.fork_epoch(chain), 2);
    assert_eq!(engine.event_count(), 9);
}

#[test]
fn test_tracing_init_from_config() {
    let config = load_config();
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert!(init_tracing(&config.logging).is_ok());

    let json = LoggingConfig {
        level: "debug".to_string(),
        format: LogFormat::Json,
    };
    // a subscriber is already installed, so this one is not
    assert_eq!(init_tracing(&json).unwrap(), false);
}
