//! Engine Configuration Module
//!
//! Loads the chains the engine tracks, their contract addresses, logging
//! settings and query bounds. Supports TOML files with `STRATA_`-prefixed
//! environment overrides.

use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info};
use types::{Address, ChainId};

/// Default upper bound on TWAP durations: 30 days
pub const DEFAULT_TWAP_MAX_DURATION_SECS: u64 = 30 * 24 * 60 * 60;

/// Main engine configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Tracked chains, by human-readable name
    #[serde(default)]
    pub chains: BTreeMap<String, ChainSettings>,

    #[serde(default)]
    pub twap: TwapSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Contract addresses for one chain, as 0x-prefixed hex strings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChainSettings {
    pub chain_id: u64,
    pub core: String,
    pub oracle: Option<String>,
    pub twamm: Option<String>,
    pub boosted_fees: Option<String>,
    pub positions_nft: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct TwapSettings {
    pub max_duration_secs: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Default for TwapSettings {
    fn default() -> Self {
        Self {
            max_duration_secs: DEFAULT_TWAP_MAX_DURATION_SECS,
        }
    }
}

fn parse_address(field: &str, value: &str) -> Result<Address> {
    value
        .parse::<Address>()
        .with_context(|| format!("Invalid {} address {:?}", field, value))
}

fn parse_optional(field: &str, value: &Option<String>) -> Result<Option<Address>> {
    value.as_deref().map(|v| parse_address(field, v)).transpose()
}

/// Addresses of one chain after parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainAddresses {
    pub core: Address,
    pub oracle: Option<Address>,
    pub twamm: Option<Address>,
    pub boosted_fees: Option<Address>,
    pub positions_nft: Option<Address>,
}

impl ChainSettings {
    pub fn chain_id(&self) -> ChainId {
        ChainId::new(self.chain_id)
    }

    /// Parse every configured address
    pub fn addresses(&self) -> Result<ChainAddresses> {
        Ok(ChainAddresses {
            core: parse_address("core", &self.core)?,
            oracle: parse_optional("oracle", &self.oracle)?,
            twamm: parse_optional("twamm", &self.twamm)?,
            boosted_fees: parse_optional("boosted_fees", &self.boosted_fees)?,
            positions_nft: parse_optional("positions_nft", &self.positions_nft)?,
        })
    }

    fn expand_env_vars(&mut self) -> Result<()> {
        let core = shellexpand::env(&self.core)
            .context("Failed to expand core address")?
            .into_owned();
        self.core = core;

        for (field, value) in [
            ("oracle", &mut self.oracle),
            ("twamm", &mut self.twamm),
            ("boosted_fees", &mut self.boosted_fees),
            ("positions_nft", &mut self.positions_nft),
        ] {
            if let Some(raw) = value {
                let expanded = shellexpand::env(raw)
                    .with_context(|| format!("Failed to expand {} address", field))?
                    .into_owned();
                *value = Some(expanded);
            }
        }
        Ok(())
    }
}

impl EngineConfig {
    /// Load configuration from a file with environment overrides
    ///
    /// `STRATA_TWAP__MAX_DURATION_SECS=600` overrides `twap.max_duration_secs`.
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading engine config: {:?}", path);
        let builder = Config::builder()
            .add_source(File::from(path).required(true))
            .add_source(
                Environment::with_prefix("STRATA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build().context("Failed to build configuration")?;
        let mut engine: EngineConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        engine.expand_env_vars()?;
        engine.validate()?;
        Ok(engine)
    }

    /// Parse configuration from TOML text, without environment overrides
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()
            .context("Failed to build configuration")?;
        let mut engine: EngineConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        engine.expand_env_vars()?;
        engine.validate()?;
        Ok(engine)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Expand `${VAR}` references in address strings
    pub fn expand_env_vars(&mut self) -> Result<()> {
        for (name, chain) in &mut self.chains {
            chain
                .expand_env_vars()
                .with_context(|| format!("Chain {:?}", name))?;
        }
        Ok(())
    }

    /// Reject duplicate chain ids, unparsable addresses and a zero TWAP bound
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashMap<u64, &str> = HashMap::new();
        for (name, chain) in &self.chains {
            if let Some(other) = seen.insert(chain.chain_id, name) {
                bail!(
                    "Chains {:?} and {:?} share chain id {}",
                    other,
                    name,
                    chain.chain_id
                );
            }
            chain
                .addresses()
                .with_context(|| format!("Chain {:?}", name))?;
        }

        if self.twap.max_duration_secs == 0 {
            bail!("twap.max_duration_secs must be positive");
        }

        debug!("Validated {} chain(s)", self.chains.len());
        Ok(())
    }

    /// Settings for a chain by id
    pub fn chain(&self, chain_id: ChainId) -> Option<(&str, &ChainSettings)> {
        self.chains
            .iter()
            .find(|(_, c)| c.chain_id == chain_id.inner())
            .map(|(name, c)| (name.as_str(), c))
    }
}
