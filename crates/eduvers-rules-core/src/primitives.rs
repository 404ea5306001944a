//! # Mining Primitives
//!
//! Compiled-in defaults and limits for the rule miner.
//!
//! Thresholds here are defaults only; every run may override them
//! through [`Thresholds`](crate::Thresholds).

/// Default minimum support for a frequent itemset.
pub const DEFAULT_MIN_SUPPORT: f64 = 0.1;

/// Default minimum confidence for an association rule.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.3;

/// Separator used when an itemset is stored as a single string.
///
/// Items may not contain it, otherwise the stored form would not split back
/// into the same itemset.
pub const ITEM_SEPARATOR: char = ',';

/// Name of the output table.
pub const RULES_TABLE_NAME: &str = "recommendation_rules";

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length of a single item identifier in bytes.
pub const MAX_ITEM_LENGTH: usize = 255;

/// Maximum size of a transactions file (100 MB).
///
/// The loader refuses larger files before reading them.
pub const MAX_INPUT_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Largest itemset for which rules are derived.
///
/// Antecedent splits are enumerated as bitmasks over a `u64`.
pub const MAX_RULE_ITEMSET_LEN: usize = 63;
