//! # redb-backed Rule Table
//!
//! The `recommendation_rules` table, stored in a redb embedded database.
//!
//! redb provides what the rule sink needs:
//! - ACID write transactions (delete + insert commit together or not at all)
//! - Crash safety (copy-on-write B-trees)
//! - A file lock, so only one run writes at a time
//!
//! ## Layout
//!
//! - `recommendation_rules`: id (u64) -> postcard-encoded `StoredRule`
//! - `rules_metadata`: key -> u64, holds the auto-increment counter
//!
//! Ids start at 1 and are never reused, even after the rows holding them are
//! deleted.

use crate::primitives::RULES_TABLE_NAME;
use crate::{AssociationRule, MinerError, RuleRow, StoredRule};
use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use std::path::Path;

/// Table for rules: id -> serialized StoredRule bytes
const RULES: TableDefinition<u64, &[u8]> = TableDefinition::new(RULES_TABLE_NAME);

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("rules_metadata");

const NEXT_ID_KEY: &str = "next_rule_id";

const FIRST_ID: u64 = 1;

/// Outcome of a full replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaceSummary {
    /// Rows deleted from the previous rule set.
    pub removed: usize,
    /// Rows inserted from the new rule set.
    pub inserted: usize,
}

/// The rule table inside a redb database file.
pub struct RuleTable {
    db: Database,
}

impl std::fmt::Debug for RuleTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleTable")
            .field("table", &RULES_TABLE_NAME)
            .finish_non_exhaustive()
    }
}

impl RuleTable {
    /// Open or create the database at `path` and create the table if absent.
    ///
    /// Returns `MinerError::StoreConnection` if the database cannot be opened
    /// (missing directory, another writer holding the lock, corrupt file) and
    /// `MinerError::StoreWrite` if the tables cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MinerError> {
        let path = path.as_ref();
        let db = Database::create(path).map_err(|e| {
            MinerError::StoreConnection(format!("cannot open '{}': {}", path.display(), e))
        })?;

        // Initialize tables if they don't exist
        {
            let write_txn = db
                .begin_write()
                .map_err(|e| MinerError::StoreWrite(e.to_string()))?;
            let _ = write_txn
                .open_table(RULES)
                .map_err(|e| MinerError::StoreWrite(format!("create table: {}", e)))?;
            let _ = write_txn
                .open_table(METADATA)
                .map_err(|e| MinerError::StoreWrite(format!("create table: {}", e)))?;
            write_txn
                .commit()
                .map_err(|e| MinerError::StoreWrite(e.to_string()))?;
        }

        Ok(Self { db })
    }

    /// Replace every stored rule with `rules`.
    pub fn replace_all(&mut self, rules: &[AssociationRule]) -> Result<ReplaceSummary, MinerError> {
        let rows: Vec<StoredRule> = rules.iter().map(StoredRule::from).collect();
        self.replace_rows(&rows)
    }

    /// Replace every stored row with `rows` in one write transaction.
    ///
    /// Readers see either the old rows or the new rows, never an empty or
    /// half-filled table. On any error the transaction is aborted and the
    /// previous rows stay in place.
    pub fn replace_rows(&mut self, rows: &[StoredRule]) -> Result<ReplaceSummary, MinerError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| MinerError::StoreWrite(e.to_string()))?;

        let summary = match Self::write_rows(&write_txn, rows) {
            Ok(summary) => summary,
            Err(e) => {
                // The original error matters more than a failed abort.
                let _ = write_txn.abort();
                return Err(e);
            }
        };

        write_txn
            .commit()
            .map_err(|e| MinerError::StoreWrite(format!("commit: {}", e)))?;

        Ok(summary)
    }

    fn write_rows(
        write_txn: &WriteTransaction,
        rows: &[StoredRule],
    ) -> Result<ReplaceSummary, MinerError> {
        let mut rules_table = write_txn
            .open_table(RULES)
            .map_err(|e| MinerError::StoreWrite(e.to_string()))?;
        let mut meta_table = write_txn
            .open_table(METADATA)
            .map_err(|e| MinerError::StoreWrite(e.to_string()))?;

        // Delete old rules.
        let old_ids = rules_table
            .iter()
            .map_err(|e| MinerError::StoreWrite(e.to_string()))?
            .map(|entry| entry.map(|(key, _)| key.value()))
            .collect::<Result<Vec<u64>, _>>()
            .map_err(|e| MinerError::StoreWrite(e.to_string()))?;
        for id in &old_ids {
            rules_table
                .remove(*id)
                .map_err(|e| MinerError::StoreWrite(format!("delete rule {}: {}", id, e)))?;
        }

        // Insert new rules.
        let mut next_id = meta_table
            .get(NEXT_ID_KEY)
            .map_err(|e| MinerError::StoreWrite(e.to_string()))?
            .map(|v| v.value())
            .unwrap_or(FIRST_ID);

        for row in rows {
            validate_row(row)?;
            let bytes = postcard::to_allocvec(row)
                .map_err(|e| MinerError::Serialization(e.to_string()))?;
            rules_table
                .insert(next_id, bytes.as_slice())
                .map_err(|e| MinerError::StoreWrite(format!("insert rule {}: {}", next_id, e)))?;
            next_id = next_id.saturating_add(1);
        }

        meta_table
            .insert(NEXT_ID_KEY, next_id)
            .map_err(|e| MinerError::StoreWrite(e.to_string()))?;

        Ok(ReplaceSummary {
            removed: old_ids.len(),
            inserted: rows.len(),
        })
    }

    /// All stored rows in ascending id order.
    pub fn rows(&self) -> Result<Vec<RuleRow>, MinerError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| MinerError::StoreRead(e.to_string()))?;
        let rules_table = read_txn
            .open_table(RULES)
            .map_err(|e| MinerError::StoreRead(e.to_string()))?;

        let mut rows = Vec::new();
        for entry in rules_table
            .iter()
            .map_err(|e| MinerError::StoreRead(e.to_string()))?
        {
            let (key, value) = entry.map_err(|e| MinerError::StoreRead(e.to_string()))?;
            let rule: StoredRule = postcard::from_bytes(value.value())
                .map_err(|e| MinerError::Serialization(e.to_string()))?;
            rows.push(RuleRow {
                id: key.value(),
                rule,
            });
        }
        Ok(rows)
    }

    /// Number of stored rows.
    pub fn len(&self) -> Result<usize, MinerError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| MinerError::StoreRead(e.to_string()))?;
        let rules_table = read_txn
            .open_table(RULES)
            .map_err(|e| MinerError::StoreRead(e.to_string()))?;
        let len = rules_table
            .len()
            .map_err(|e| MinerError::StoreRead(e.to_string()))?;
        Ok(len as usize)
    }

    pub fn is_empty(&self) -> Result<bool, MinerError> {
        Ok(self.len()? == 0)
    }

    /// The id the next inserted row will receive.
    pub fn next_id(&self) -> Result<u64, MinerError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| MinerError::StoreRead(e.to_string()))?;
        let meta_table = read_txn
            .open_table(METADATA)
            .map_err(|e| MinerError::StoreRead(e.to_string()))?;
        let next_id = meta_table
            .get(NEXT_ID_KEY)
            .map_err(|e| MinerError::StoreRead(e.to_string()))?
            .map(|v| v.value())
            .unwrap_or(FIRST_ID);
        Ok(next_id)
    }
}

/// A row must name both sides and carry finite scores within [0, 1].
fn validate_row(row: &StoredRule) -> Result<(), MinerError> {
    if row.antecedents.is_empty() || row.consequents.is_empty() {
        return Err(MinerError::StoreWrite(
            "rule with empty antecedents or consequents".to_string(),
        ));
    }
    for (name, value) in [("support", row.support), ("confidence", row.confidence)] {
        if !(0.0..=1.0).contains(&value) {
            return Err(MinerError::StoreWrite(format!(
                "rule {} -> {} has {} {} outside [0, 1]",
                row.antecedents, row.consequents, name, value
            )));
        }
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn row(antecedents: &str, consequents: &str, support: f64, confidence: f64) -> StoredRule {
        StoredRule {
            antecedents: antecedents.to_string(),
            consequents: consequents.to_string(),
            support,
            confidence,
        }
    }

    #[test]
    fn open_creates_empty_table() {
        let temp = tempdir().expect("temp dir");
        let table = RuleTable::open(temp.path().join("rules.redb")).expect("open db");

        assert!(table.is_empty().expect("empty"));
        assert_eq!(table.next_id().expect("next id"), 1);
    }

    #[test]
    fn replace_inserts_rows_with_ids() {
        let temp = tempdir().expect("temp dir");
        let mut table = RuleTable::open(temp.path().join("rules.redb")).expect("open db");

        let summary = table
            .replace_rows(&[row("A", "B", 0.5, 0.75), row("B", "A", 0.5, 0.5)])
            .expect("replace");
        assert_eq!(summary, ReplaceSummary { removed: 0, inserted: 2 });

        let rows = table.rows().expect("rows");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[0].rule.antecedents, "A");
        assert_eq!(rows[1].id, 2);
        assert_eq!(rows[1].rule.consequents, "A");
    }

    #[test]
    fn replace_removes_previous_rows() {
        let temp = tempdir().expect("temp dir");
        let mut table = RuleTable::open(temp.path().join("rules.redb")).expect("open db");

        table
            .replace_rows(&[row("A", "B", 0.5, 0.75), row("B", "A", 0.5, 0.5)])
            .expect("first");
        let summary = table
            .replace_rows(&[row("C", "D", 0.2, 0.4)])
            .expect("second");

        assert_eq!(summary, ReplaceSummary { removed: 2, inserted: 1 });
        let rows = table.rows().expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rule.antecedents, "C");
        // Ids keep counting after a delete.
        assert_eq!(rows[0].id, 3);
    }

    #[test]
    fn replace_with_nothing_empties_table() {
        let temp = tempdir().expect("temp dir");
        let mut table = RuleTable::open(temp.path().join("rules.redb")).expect("open db");

        table.replace_rows(&[row("A", "B", 0.5, 0.75)]).expect("fill");
        table.replace_rows(&[]).expect("clear");

        assert!(table.is_empty().expect("empty"));
    }

    #[test]
    fn failed_replace_keeps_previous_rows() {
        let temp = tempdir().expect("temp dir");
        let mut table = RuleTable::open(temp.path().join("rules.redb")).expect("open db");

        table
            .replace_rows(&[row("A", "B", 0.5, 0.75)])
            .expect("fill");
        let result = table.replace_rows(&[row("C", "D", 0.2, 0.4), row("E", "", 0.2, 0.4)]);

        assert!(matches!(result, Err(MinerError::StoreWrite(_))));
        let rows = table.rows().expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rule.antecedents, "A");
        assert_eq!(table.next_id().expect("next id"), 2);
    }

    #[test]
    fn out_of_range_score_is_rejected() {
        let temp = tempdir().expect("temp dir");
        let mut table = RuleTable::open(temp.path().join("rules.redb")).expect("open db");

        let result = table.replace_rows(&[row("A", "B", 1.5, 0.5)]);
        assert!(matches!(result, Err(MinerError::StoreWrite(_))));
        let result = table.replace_rows(&[row("A", "B", 0.5, f64::NAN)]);
        assert!(matches!(result, Err(MinerError::StoreWrite(_))));
    }

    #[test]
    fn persistence() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("rules.redb");

        {
            let mut table = RuleTable::open(&db_path).expect("open db");
            table
                .replace_rows(&[row("video:1", "task:1,task:2", 0.25, 1.0)])
                .expect("fill");
        }

        {
            let table = RuleTable::open(&db_path).expect("reopen db");
            let rows = table.rows().expect("rows");
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].rule.consequents, "task:1,task:2");
            assert_eq!(rows[0].rule.confidence.to_bits(), 1.0f64.to_bits());
        }
    }

    #[test]
    fn missing_directory_is_connection_error() {
        let temp = tempdir().expect("temp dir");
        let result = RuleTable::open(temp.path().join("absent").join("rules.redb"));

        assert!(matches!(result, Err(MinerError::StoreConnection(_))));
    }
}
