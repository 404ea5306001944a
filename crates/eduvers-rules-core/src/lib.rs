//! # eduvers-rules-core
//!
//! The association-rule engine for EDUVERS recommendations - THE LOGIC.
//!
//! Interaction transactions go in, `recommendation_rules` rows come out:
//!
//! ```text
//! transactions.json ──▶ TransactionLoader ──▶ FpGrowth ──▶ derive_rules ──▶ RuleTable
//!                        (stage 1)            (stage 2)                     (stage 3)
//! ```
//!
//! ## Architectural Constraints
//!
//! - Synchronous, single-threaded, no network, no logging
//! - Deterministic: ordered collections only, same input gives same rows
//! - The rule table is replaced in one redb write transaction
//! - Floating-point arithmetic lives in [`support`] only

// =============================================================================
// MODULES
// =============================================================================

pub mod fptree;
pub mod loader;
pub mod miner;
pub mod pipeline;
pub mod primitives;
pub mod rules;
pub mod storage;
pub mod support;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    AssociationRule, Item, Itemset, MinerError, PipelineStage, RuleRow, StoredRule, Thresholds,
    Transaction,
};

// =============================================================================
// RE-EXPORTS: Pipeline Stages
// =============================================================================

pub use loader::TransactionLoader;
pub use miner::{FpGrowth, FrequentItemsets};
pub use pipeline::{MiningOutcome, RuleMiner, RunSummary};
pub use rules::derive_rules;
pub use storage::{ReplaceSummary, RuleTable};
