//! # Frequent Itemset Miner
//!
//! FP-Growth over a transaction collection.
//!
//! 1. Count single items; drop those below the minimum count.
//! 2. Rank the rest by descending frequency (ties by item id).
//! 3. Build an [`FpTree`] of the ranked transactions.
//! 4. Grow itemsets from the least frequent header item upwards, recursing
//!    into conditional trees.
//!
//! Candidates are never enumerated: an itemset is only reached through a
//! conditional tree whose items all met the minimum count.

use crate::fptree::{FpTree, Rank, WeightedPath};
use crate::support;
use crate::{Item, Itemset, MinerError, Thresholds, Transaction};
use std::collections::BTreeMap;

/// Every itemset meeting the minimum support, with its occurrence count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequentItemsets {
    transaction_count: u64,
    itemsets: BTreeMap<Itemset, u64>,
}

impl FrequentItemsets {
    /// Total number of transactions mined, empty ones included.
    #[must_use]
    pub fn transaction_count(&self) -> u64 {
        self.transaction_count
    }

    /// Occurrence count of a frequent itemset.
    #[must_use]
    pub fn count(&self, itemset: &Itemset) -> Option<u64> {
        self.itemsets.get(itemset).copied()
    }

    /// Support of a frequent itemset.
    #[must_use]
    pub fn support(&self, itemset: &Itemset) -> Option<f64> {
        self.count(itemset)
            .map(|count| support::ratio(count, self.transaction_count))
    }

    /// Itemsets in ascending order with their counts.
    pub fn iter(&self) -> impl Iterator<Item = (&Itemset, u64)> {
        self.itemsets.iter().map(|(set, &count)| (set, count))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.itemsets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.itemsets.is_empty()
    }
}

/// The FP-Growth frequent itemset miner.
#[derive(Debug, Clone, Copy, Default)]
pub struct FpGrowth {
    thresholds: Thresholds,
}

impl FpGrowth {
    #[must_use]
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Mine every itemset whose support reaches `min_support`.
    ///
    /// Returns `MinerError::InvalidThreshold` for out-of-range thresholds and
    /// `MinerError::Mining` for frequent items that cannot be stored.
    /// Infrequent items are dropped unchecked. An empty input yields an empty
    /// result.
    pub fn frequent_itemsets(
        &self,
        transactions: &[Transaction],
    ) -> Result<FrequentItemsets, MinerError> {
        self.thresholds.validate()?;

        let total = transactions.len() as u64;
        if total == 0 {
            return Ok(FrequentItemsets::default());
        }
        let min_count = support::min_count(self.thresholds.min_support, total);

        // Single-item counts; infrequent items never enter the tree.
        let mut item_counts: BTreeMap<&Item, u64> = BTreeMap::new();
        for tx in transactions {
            for item in tx.items() {
                *item_counts.entry(item).or_insert(0) += 1;
            }
        }
        let mut ranked: Vec<(&Item, u64)> = item_counts
            .into_iter()
            .filter(|&(_, count)| count >= min_count)
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        // Only frequent items can reach a stored rule.
        for &(item, _) in &ranked {
            item.validate()?;
        }

        let rank_of: BTreeMap<&Item, Rank> = ranked
            .iter()
            .enumerate()
            .map(|(rank, &(item, _))| (item, rank))
            .collect();

        let paths: Vec<WeightedPath> = transactions
            .iter()
            .filter_map(|tx| {
                let path: Vec<Rank> = tx
                    .items()
                    .filter_map(|item| rank_of.get(item).copied())
                    .collect();
                (!path.is_empty()).then_some((path, 1))
            })
            .collect();

        let tree = FpTree::build(&paths, min_count);
        let mut found = Vec::new();
        self.grow(&tree, &[], min_count, &mut found);

        let itemsets = found
            .into_iter()
            .map(|(ranks, count)| {
                let set: Itemset = ranks.iter().map(|&r| ranked[r].0.clone()).collect();
                (set, count)
            })
            .collect();

        Ok(FrequentItemsets {
            transaction_count: total,
            itemsets,
        })
    }

    fn grow(&self, tree: &FpTree, suffix: &[Rank], min_count: u64, out: &mut Vec<WeightedPath>) {
        for (rank, count) in tree.item_counts().rev() {
            let mut itemset = Vec::with_capacity(suffix.len() + 1);
            itemset.extend_from_slice(suffix);
            itemset.push(rank);

            let at_limit = self
                .thresholds
                .max_len
                .is_some_and(|max| itemset.len() >= max);

            if !at_limit {
                let conditional = FpTree::build(&tree.conditional_base(rank), min_count);
                if !conditional.is_empty() {
                    self.grow(&conditional, &itemset, min_count, out);
                }
            }

            out.push((itemset, count));
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Transaction> {
        vec![
            Transaction::new(["A", "B"]),
            Transaction::new(["A", "B", "C"]),
            Transaction::new(["A"]),
            Transaction::new(["B", "C"]),
        ]
    }

    #[test]
    fn mines_sample_at_half_support() {
        let frequent = FpGrowth::new(Thresholds::new(0.5, 0.3))
            .frequent_itemsets(&sample())
            .expect("mine");

        assert_eq!(frequent.len(), 5);
        assert_eq!(frequent.count(&Itemset::of(["A"])), Some(3));
        assert_eq!(frequent.count(&Itemset::of(["B"])), Some(3));
        assert_eq!(frequent.count(&Itemset::of(["C"])), Some(2));
        assert_eq!(frequent.count(&Itemset::of(["A", "B"])), Some(2));
        assert_eq!(frequent.count(&Itemset::of(["B", "C"])), Some(2));
        assert_eq!(frequent.count(&Itemset::of(["A", "C"])), None);
        assert_eq!(frequent.transaction_count(), 4);
    }

    #[test]
    fn high_support_yields_nothing() {
        let frequent = FpGrowth::new(Thresholds::new(0.9, 0.3))
            .frequent_itemsets(&sample())
            .expect("mine");

        assert!(frequent.is_empty());
    }

    #[test]
    fn empty_input_yields_nothing() {
        let frequent = FpGrowth::default().frequent_itemsets(&[]).expect("mine");

        assert!(frequent.is_empty());
        assert_eq!(frequent.transaction_count(), 0);
    }

    #[test]
    fn max_len_caps_itemset_size() {
        let txs = vec![Transaction::new(["A", "B", "C"]); 3];
        let frequent = FpGrowth::new(Thresholds::new(0.5, 0.3).with_max_len(2))
            .frequent_itemsets(&txs)
            .expect("mine");

        assert_eq!(frequent.len(), 6);
        assert!(frequent.iter().all(|(set, _)| set.len() <= 2));
    }

    #[test]
    fn empty_transactions_count_toward_support() {
        let txs = vec![
            Transaction::new(["A"]),
            Transaction::default(),
            Transaction::default(),
            Transaction::default(),
        ];
        let frequent = FpGrowth::new(Thresholds::new(0.5, 0.3))
            .frequent_itemsets(&txs)
            .expect("mine");

        assert!(frequent.is_empty());
    }

    #[test]
    fn rejects_separator_in_frequent_item() {
        let txs = vec![Transaction::new(["a,b"])];
        let result = FpGrowth::default().frequent_itemsets(&txs);

        assert!(matches!(result, Err(MinerError::Mining(_))));
    }

    #[test]
    fn unstorable_infrequent_items_are_pruned() {
        let mut txs = vec![Transaction::new(["video:1", "task:1"]); 20];
        txs.push(Transaction::new(["Intro, part 2"]));
        txs.push(Transaction::new([""]));
        txs.push(Transaction::new(["x".repeat(300)]));

        let frequent = FpGrowth::new(Thresholds::new(0.1, 0.3))
            .frequent_itemsets(&txs)
            .expect("mine");

        assert_eq!(frequent.len(), 3);
        assert_eq!(frequent.transaction_count(), 23);
        assert_eq!(frequent.count(&Itemset::of(["task:1", "video:1"])), Some(20));
        assert_eq!(frequent.count(&Itemset::of(["Intro, part 2"])), None);
    }

    #[test]
    fn rejects_invalid_threshold() {
        let result = FpGrowth::new(Thresholds::new(0.0, 0.3)).frequent_itemsets(&sample());

        assert!(matches!(result, Err(MinerError::InvalidThreshold { .. })));
    }
}
