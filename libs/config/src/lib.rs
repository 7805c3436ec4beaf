//! # Strata Configuration
//!
//! Engine configuration loading and process-wide tracing setup.
//!
//! ## Features
//!
//! - **Chains**: chain ids and the core/extension contract addresses per chain
//! - **Logging**: level directive and output format for `tracing-subscriber`
//! - **Query bounds**: the longest TWAP window the engine will answer
//!
//! ## Usage
//!
//! ```rust
//! use strata_config::{init_tracing, EngineConfig};
//!
//! let config = EngineConfig::from_toml_str(r#"
//! [chains.mainnet]
//! chain_id = 1
//! core = "0xe0e0e08A6A4b9Dc7bD67BCB7aadE5cF48157d444"
//! "#).unwrap();
//!
//! init_tracing(&config.logging).unwrap();
//! assert_eq!(config.chains["mainnet"].chain_id, 1);
//! ```

pub mod engine_config;
pub mod logging;

// Re-export commonly used types
pub use engine_config::{
    ChainAddresses, ChainSettings, EngineConfig, LogFormat, LoggingConfig, TwapSettings,
    DEFAULT_TWAP_MAX_DURATION_SECS,
};
pub use logging::init_tracing;
