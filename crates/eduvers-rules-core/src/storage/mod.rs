//! # Storage
//!
//! Persistent home of the generated rules.

mod redb_rules;

pub use redb_rules::{ReplaceSummary, RuleTable};
