//! Core E2E testing framework

use anyhow::{bail, Context, Result};
use serde::Serialize;
use state_engine::Engine;
use std::path::Path;
use std::time::{Duration, Instant};
use strata_config::EngineConfig;
use tracing::{error, info};
use types::{
    Address, Block, ChainId, EventId, EventKind, EventLocation, Hash32, PoolKeyId, PoolKeyParams,
};

use crate::fixtures::{CORE, TOKEN0, TOKEN1};

/// One engine built from configuration, shared by a scenario's steps
pub struct TestFramework {
    config: EngineConfig,
    engine: Engine,
}

/// Outcome of one scenario
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub scenario: String,
    pub passed: bool,
    pub checks: Vec<String>,
    pub error: Option<String>,
    pub duration: Duration,
}

/// A scripted pipeline run
pub trait TestScenario {
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    /// Drive the framework's engine; each returned string names a passed check
    fn execute(&self, framework: &TestFramework) -> Result<Vec<String>>;
}

impl TestFramework {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let engine = Engine::from_config(&config).context("Failed to build engine")?;
        Ok(Self { config, engine })
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Self::new(EngineConfig::from_toml_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::new(EngineConfig::load(path)?)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The first configured chain
    pub fn primary_chain(&self) -> Result<ChainId> {
        self.config
            .chains
            .values()
            .next()
            .map(|chain| chain.chain_id())
            .context("No chains configured")
    }

    pub fn add_block(&self, chain_id: ChainId, number: u64, time: u64) -> Result<Block> {
        let mut hash = [0u8; 32];
        hash[..8].copy_from_slice(&number.to_be_bytes());
        Ok(self
            .engine
            .insert_block(Block::new(chain_id, number, Hash32::new(hash), time))?)
    }

    pub fn add_pool(&self, chain_id: ChainId, pool_id: Hash32, extension: Address) -> Result<PoolKeyId> {
        Ok(self.engine.insert_pool_key(PoolKeyParams {
            chain_id,
            core: CORE,
            pool_id,
            token0: TOKEN0,
            token1: TOKEN1,
            fee: 3000,
            fee_denominator: None,
            tick_spacing: Some(100),
            center_tick: None,
            amplification: None,
            extension,
        })?)
    }

    /// Feed one packed record through the decoding path
    pub fn feed(
        &self,
        chain_id: ChainId,
        (block, event_index): (u64, u64),
        pool: Option<PoolKeyId>,
        kind: EventKind,
        payload_hex: &str,
    ) -> Result<EventId> {
        let location = EventLocation {
            chain_id,
            block_number: block,
            transaction_index: 0,
            event_index,
            transaction_hash: Hash32::ZERO,
            emitter: CORE,
        };
        Ok(self
            .engine
            .insert_raw_event(location, pool, kind, payload_hex)?)
    }

    /// Fail unless incremental state matches a full replay
    pub fn check_consistency(&self) -> Result<()> {
        let diverged = self.engine.verify_consistency()?;
        if !diverged.is_empty() {
            bail!("Projections diverged from replay: {:?}", diverged);
        }
        Ok(())
    }

    pub fn run(&self, scenario: &dyn TestScenario) -> TestResult {
        info!(scenario = scenario.name(), "{}", scenario.description());
        let start = Instant::now();
        let outcome = scenario
            .execute(self)
            .and_then(|checks| self.check_consistency().map(|()| checks));
        let duration = start.elapsed();

        match outcome {
            Ok(checks) => {
                info!(scenario = scenario.name(), checks = checks.len(), ?duration, "Scenario passed");
                TestResult {
                    scenario: scenario.name().to_string(),
                    passed: true,
                    checks,
                    error: None,
                    duration,
                }
            }
            Err(err) => {
                error!(scenario = scenario.name(), error = %err, "Scenario failed");
                TestResult {
                    scenario: scenario.name().to_string(),
                    passed: false,
                    checks: Vec::new(),
                    error: Some(format!("{err:#}")),
                    duration,
                }
            }
        }
    }
}

/// Run every scenario against its own fresh engine
pub fn run_all(config: &EngineConfig, scenarios: &[Box<dyn TestScenario>]) -> Result<Vec<TestResult>> {
    scenarios
        .iter()
        .map(|scenario| Ok(TestFramework::new(config.clone())?.run(scenario.as_ref())))
        .collect()
}
