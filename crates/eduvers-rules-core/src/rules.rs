//! # Rule Derivation
//!
//! Association rules from frequent itemsets.
//!
//! - Every frequent itemset of two or more items is split into every
//!   non-empty proper antecedent and its complement
//! - A split is kept when `count(itemset) / count(antecedent) >= min_confidence`
//! - Rule support is the support of the whole itemset

use crate::miner::FrequentItemsets;
use crate::primitives::MAX_RULE_ITEMSET_LEN;
use crate::support;
use crate::{AssociationRule, Item, Itemset, MinerError};

/// Derive all rules meeting `min_confidence`.
///
/// Rules come out in itemset order, then in antecedent bitmask order over the
/// itemset's sorted items.
pub fn derive_rules(
    frequent: &FrequentItemsets,
    min_confidence: f64,
) -> Result<Vec<AssociationRule>, MinerError> {
    let total = frequent.transaction_count();
    let mut rules = Vec::new();

    for (itemset, count) in frequent.iter() {
        let size = itemset.len();
        if size < 2 {
            continue;
        }
        if size > MAX_RULE_ITEMSET_LEN {
            return Err(MinerError::Mining(format!(
                "itemset of {} items exceeds rule derivation limit {}",
                size, MAX_RULE_ITEMSET_LEN
            )));
        }

        let items: Vec<&Item> = itemset.items().collect();
        let full: u64 = (1u64 << size) - 1;

        for mask in 1..full {
            let (antecedents, consequents) = split(&items, mask);

            let antecedent_count = subset_count(frequent, &antecedents)?;
            if !support::meets(count, antecedent_count, min_confidence) {
                continue;
            }
            let consequent_count = subset_count(frequent, &consequents)?;

            let confidence = support::ratio(count, antecedent_count);
            let consequent_support = support::ratio(consequent_count, total);
            rules.push(AssociationRule {
                antecedents,
                consequents,
                support: support::ratio(count, total),
                confidence,
                antecedent_support: support::ratio(antecedent_count, total),
                consequent_support,
                lift: support::lift(confidence, consequent_support),
            });
        }
    }

    Ok(rules)
}

fn split(items: &[&Item], mask: u64) -> (Itemset, Itemset) {
    let mut antecedents = Vec::new();
    let mut consequents = Vec::new();
    for (bit, &item) in items.iter().enumerate() {
        if mask & (1u64 << bit) != 0 {
            antecedents.push(item.clone());
        } else {
            consequents.push(item.clone());
        }
    }
    (
        antecedents.into_iter().collect(),
        consequents.into_iter().collect(),
    )
}

/// Count of a subset of a frequent itemset. Support is anti-monotone, so the
/// subset must be frequent too; a gap means the miner output is inconsistent.
fn subset_count(frequent: &FrequentItemsets, subset: &Itemset) -> Result<u64, MinerError> {
    frequent.count(subset).ok_or_else(|| {
        MinerError::Mining(format!("no support recorded for subset {}", subset))
    })
}

// =============================================================================
// TESTS
// =============================================================================
