//! # Core Type Definitions
//!
//! This module contains all core types for the rule miner:
//! - Item identifiers and transactions (`Item`, `Transaction`)
//! - Mining output (`Itemset`, `AssociationRule`)
//! - Persisted form (`StoredRule`, `RuleRow`)
//! - Run configuration (`Thresholds`)
//! - Error types (`MinerError`, `PipelineStage`)
//!
//! ## Determinism Guarantees
//!
//! Every collection type here is ordered (`BTreeSet`), so two runs over the
//! same input yield the same itemsets in the same order.

use crate::primitives::{
    DEFAULT_MIN_CONFIDENCE, DEFAULT_MIN_SUPPORT, ITEM_SEPARATOR, MAX_ITEM_LENGTH,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

// =============================================================================
// ITEM
// =============================================================================

/// Identifier of one interaction, e.g. `"video:12"` or `"task:3:done"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Item(pub String);

impl Item {
    /// Create a new item from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the item as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check that the item can be stored in comma-joined form.
    ///
    /// Returns `MinerError::Mining` for empty items, items containing the
    /// separator, or items longer than `MAX_ITEM_LENGTH` bytes.
    pub fn validate(&self) -> Result<(), MinerError> {
        if self.0.is_empty() {
            return Err(MinerError::Mining("empty item identifier".to_string()));
        }
        if self.0.contains(ITEM_SEPARATOR) {
            return Err(MinerError::Mining(format!(
                "item '{}' contains the separator '{}'",
                self.0, ITEM_SEPARATOR
            )));
        }
        if self.0.len() > MAX_ITEM_LENGTH {
            return Err(MinerError::Mining(format!(
                "item of {} bytes exceeds maximum {}",
                self.0.len(),
                MAX_ITEM_LENGTH
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// TRANSACTION
// =============================================================================

/// One user's interactions in a session: a set, never a multiset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transaction {
    items: BTreeSet<Item>,
}

impl Transaction {
    /// Build a transaction; duplicate items collapse.
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(|s| Item::new(s)).collect(),
        }
    }

    /// Items in ascending order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    #[must_use]
    pub fn contains(&self, item: &Item) -> bool {
        self.items.contains(item)
    }

    /// Check whether every item of `itemset` occurs in this transaction.
    #[must_use]
    pub fn contains_all(&self, itemset: &Itemset) -> bool {
        itemset.items().all(|item| self.items.contains(item))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Item> for Transaction {
    fn from_iter<T: IntoIterator<Item = Item>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// ITEMSET
// =============================================================================

/// A non-empty set of items.
///
/// Ordering is lexicographic over the sorted items, which gives frequent
/// itemsets and rules a stable output order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Itemset(BTreeSet<Item>);

impl Itemset {
    /// Build an itemset from string identifiers.
    pub fn of<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(items.into_iter().map(|s| Item::new(s)).collect())
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Comma-joined form used in the rule table, items ascending.
    #[must_use]
    pub fn joined(&self) -> String {
        let mut out = String::new();
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(ITEM_SEPARATOR);
            }
            out.push_str(item.as_str());
        }
        out
    }

    /// Parse the comma-joined form back into an itemset.
    #[must_use]
    pub fn parse_joined(joined: &str) -> Self {
        Self(
            joined
                .split(ITEM_SEPARATOR)
                .filter(|s| !s.is_empty())
                .map(Item::new)
                .collect(),
        )
    }
}

impl FromIterator<Item> for Itemset {
    fn from_iter<T: IntoIterator<Item = Item>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Itemset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.joined())
    }
}

// =============================================================================
// ASSOCIATION RULE
// =============================================================================

/// An implication `antecedents -> consequents` scored on the mined data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssociationRule {
    pub antecedents: Itemset,
    pub consequents: Itemset,
    /// Support of `antecedents ∪ consequents`.
    pub support: f64,
    /// `support / antecedent_support`.
    pub confidence: f64,
    pub antecedent_support: f64,
    pub consequent_support: f64,
    /// `confidence / consequent_support`.
    pub lift: f64,
}

impl fmt::Display for AssociationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} (support {:.4}, confidence {:.4}, lift {:.4})",
            self.antecedents, self.consequents, self.support, self.confidence, self.lift
        )
    }
}

// =============================================================================
// STORED FORM
// =============================================================================

/// The columns of one `recommendation_rules` row, without its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRule {
    pub antecedents: String,
    pub consequents: String,
    pub support: f64,
    pub confidence: f64,
}

impl From<&AssociationRule> for StoredRule {
    fn from(rule: &AssociationRule) -> Self {
        Self {
            antecedents: rule.antecedents.joined(),
            consequents: rule.consequents.joined(),
            support: rule.support,
            confidence: rule.confidence,
        }
    }
}

/// A persisted rule with its auto-incremented id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleRow {
    pub id: u64,
    #[serde(flatten)]
    pub rule: StoredRule,
}

// =============================================================================
// THRESHOLDS
// =============================================================================

/// Mining thresholds for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum fraction of transactions containing an itemset, in (0, 1].
    pub min_support: f64,
    /// Minimum rule confidence, in [0, 1].
    pub min_confidence: f64,
    /// Largest itemset size to mine. `None` = unbounded.
    pub max_len: Option<usize>,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_support: DEFAULT_MIN_SUPPORT,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            max_len: None,
        }
    }
}

impl Thresholds {
    #[must_use]
    pub fn new(min_support: f64, min_confidence: f64) -> Self {
        Self {
            min_support,
            min_confidence,
            max_len: None,
        }
    }

    #[must_use]
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    /// Reject thresholds outside their ranges (NaN included).
    pub fn validate(&self) -> Result<(), MinerError> {
        if !(self.min_support > 0.0 && self.min_support <= 1.0) {
            return Err(MinerError::InvalidThreshold {
                name: "min_support",
                value: self.min_support.to_string(),
                range: "(0, 1]",
            });
        }
        if !(self.min_confidence >= 0.0 && self.min_confidence <= 1.0) {
            return Err(MinerError::InvalidThreshold {
                name: "min_confidence",
                value: self.min_confidence.to_string(),
                range: "[0, 1]",
            });
        }
        if self.max_len == Some(0) {
            return Err(MinerError::InvalidThreshold {
                name: "max_len",
                value: "0".to_string(),
                range: ">= 1",
            });
        }
        Ok(())
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// The pipeline stage an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Load,
    Mine,
    Store,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Load => "transaction loader",
            Self::Mine => "rule generator",
            Self::Store => "rule sink",
        };
        f.write_str(name)
    }
}

/// Errors that can occur in the rule miner.
///
/// - No silent failures, no retries
/// - Every variant maps to exactly one pipeline stage
#[derive(Debug, Error)]
pub enum MinerError {
    /// The transaction source is missing, unreadable or malformed.
    #[error("Load error: {0}")]
    Load(String),

    /// The transactions have an unexpected shape for mining.
    #[error("Mining error: {0}")]
    Mining(String),

    /// A threshold is outside its allowed range.
    #[error("Invalid threshold {name} = {value} (expected {range})")]
    InvalidThreshold {
        name: &'static str,
        value: String,
        range: &'static str,
    },

    /// The rule database could not be opened.
    #[error("Store connection error: {0}")]
    StoreConnection(String),

    /// Creating, clearing or filling the rule table failed.
    #[error("Store write error: {0}")]
    StoreWrite(String),

    /// Reading the rule table failed.
    #[error("Store read error: {0}")]
    StoreRead(String),

    /// A stored row could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl MinerError {
    /// The stage that produced this error.
    #[must_use]
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::Load(_) => PipelineStage::Load,
            Self::Mining(_) | Self::InvalidThreshold { .. } => PipelineStage::Mine,
            Self::StoreConnection(_)
            | Self::StoreWrite(_)
            | Self::StoreRead(_)
            | Self::Serialization(_) => PipelineStage::Store,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
