//! End-to-End Test Framework for Strata
//!
//! Drives the whole pipeline the way ingestion does: configuration builds
//! the engine, packed hex payloads go through the codec, and every scenario
//! finishes by checking the projections against a full replay.

pub mod fixtures;
pub mod framework;
pub mod scenarios;

pub use fixtures::*;
pub use framework::{run_all, TestFramework, TestResult, TestScenario};
