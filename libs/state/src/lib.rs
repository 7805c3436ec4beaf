//! # Strata State Engine
//!
//! Append-only event store with synchronously maintained projections and
//! reorg-safe rollback.
//!
//! ## Architecture Role
//!
//! ```text
//! codec (typed facts) → [state-engine] → readers
//!                         ├── event log + blocks + pool keys
//!                         ├── fork ledger (per-chain epoch, cursor)
//!                         └── projections (state rows, delta rows)
//! ```
//!
//! Every write is one statement: the event mutation, all projection updates
//! it triggers and any fork-epoch bump commit together or not at all. After
//! any committed sequence of inserts and deletes, every derived table equals
//! a replay of the surviving events in ordering-key order
//! ([`Engine::verify_consistency`] checks exactly that).
//!
//! ## Quick Start
//!
//! ```rust
//! use state_engine::Engine;
//! use types::{Block, ChainId, Hash32};
//!
//! let engine = Engine::new();
//! let chain = ChainId::new(1);
//! engine.insert_block(Block::new(chain, 100, Hash32::ZERO, 1_700_000_000)).unwrap();
//!
//! let summary = engine.rollback_to(chain, 100).unwrap();
//! assert_eq!(summary.blocks_deleted, 1);
//! // no events were retracted, so the fork epoch stays put
//! assert_eq!(engine.fork_epoch(chain), 0);
//! ```

pub mod engine;
pub mod error;
pub mod journal;
pub mod ledger;
pub mod projections;
pub mod replay;
pub mod store;
pub mod twap;

#[cfg(test)]
mod test_support;

pub use engine::{DeleteSummary, Engine, EngineSettings};
pub use error::{EngineError, EngineResult};
pub use journal::{JournaledMap, Transactional};
pub use ledger::ForkLedger;
pub use projections::{
    BoostedFeesPoolState, LayeredRates, NftOwner, OracleObservation, PoolBalanceChange,
    PoolState, PoolTvl, Projection, ProjectionSet, TickLiquidity, TokenAmounts, TwammPoolState,
    Views,
};
pub use replay::replay;
pub use store::{EventLog, PoolKeyTable, StoredEvent};
pub use twap::TwapQuery;
