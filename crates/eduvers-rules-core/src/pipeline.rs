//! # Pipeline
//!
//! Loader -> Generator -> Sink, once per invocation.
//!
//! State flows between stages as plain values; nothing is kept between runs
//! except the rule table itself.

use crate::loader::TransactionLoader;
use crate::miner::{FpGrowth, FrequentItemsets};
use crate::rules::derive_rules;
use crate::storage::RuleTable;
use crate::{AssociationRule, MinerError, Thresholds, Transaction};
use std::path::Path;

/// Counts describing one completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub transactions: usize,
    pub frequent_itemsets: usize,
    pub rules: usize,
    /// Rows of the previous rule set removed by the sink.
    pub removed: usize,
}

/// Rules mined from one transaction collection, with the itemsets behind them.
#[derive(Debug, Clone, Default)]
pub struct MiningOutcome {
    pub frequent: FrequentItemsets,
    pub rules: Vec<AssociationRule>,
}

/// The rule miner: thresholds plus the three pipeline stages.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleMiner {
    thresholds: Thresholds,
}

impl RuleMiner {
    #[must_use]
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Stage 1: load transactions.
    pub fn load(&self, input: impl AsRef<Path>) -> Result<Vec<Transaction>, MinerError> {
        TransactionLoader::from_path(input)
    }

    /// Stage 2: frequent itemsets, then rules.
    pub fn mine(&self, transactions: &[Transaction]) -> Result<MiningOutcome, MinerError> {
        let frequent = FpGrowth::new(self.thresholds).frequent_itemsets(transactions)?;
        let rules = derive_rules(&frequent, self.thresholds.min_confidence)?;
        Ok(MiningOutcome { frequent, rules })
    }

    /// Run all three stages against `table`.
    ///
    /// The table is only touched once loading and mining have succeeded, so a
    /// failure in an earlier stage leaves the previous rule set in place.
    pub fn run(
        &self,
        input: impl AsRef<Path>,
        table: &mut RuleTable,
    ) -> Result<RunSummary, MinerError> {
        let transactions = self.load(input)?;
        self.run_transactions(&transactions, table)
    }

    /// Stages 2 and 3 over already loaded transactions.
    pub fn run_transactions(
        &self,
        transactions: &[Transaction],
        table: &mut RuleTable,
    ) -> Result<RunSummary, MinerError> {
        let outcome = self.mine(transactions)?;
        let replaced = table.replace_all(&outcome.rules)?;

        Ok(RunSummary {
            transactions: transactions.len(),
            frequent_itemsets: outcome.frequent.len(),
            rules: outcome.rules.len(),
            removed: replaced.removed,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
