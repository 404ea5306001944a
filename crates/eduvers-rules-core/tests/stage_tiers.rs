//! # Stage Tier Tests (T0-T3)
//!
//! One tier per pipeline stage, plus the end-to-end run.
//!
//! ## Tiers
//! - T0: Transaction Loading
//! - T1: Frequent Itemsets
//! - T2: Rule Derivation
//! - T3: Rule Sink and Full Run

use eduvers_rules_core::{
    FpGrowth, Itemset, MinerError, PipelineStage, RuleMiner, RuleTable, Thresholds, Transaction,
    TransactionLoader, derive_rules,
};
use tempfile::tempdir;

const SAMPLE_JSON: &str = r#"[["A", "B"], ["A", "B", "C"], ["A"], ["B", "C"]]"#;

fn sample() -> Vec<Transaction> {
    TransactionLoader::from_slice(SAMPLE_JSON.as_bytes()).expect("sample")
}

// =============================================================================
// TIER T0: TRANSACTION LOADING
// =============================================================================

mod t0_loading {
    use super::*;

    /// T0.1: A well-formed file loads one transaction per record.
    #[test]
    fn well_formed_file_loads() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("transactions.json");
        std::fs::write(&path, SAMPLE_JSON).expect("write");

        let transactions = TransactionLoader::from_path(&path).expect("load");
        assert_eq!(transactions.len(), 4);
    }

    /// T0.2: Repeated items in one record count once.
    #[test]
    fn records_are_sets() {
        let transactions =
            TransactionLoader::from_slice(br#"[["video:1", "video:1", "video:1"]]"#)
                .expect("load");
        assert_eq!(transactions[0].len(), 1);
    }

    /// T0.3: Missing and malformed sources fail in the loader stage.
    #[test]
    fn bad_sources_fail_in_load_stage() {
        let temp = tempdir().expect("temp dir");
        let missing = TransactionLoader::from_path(temp.path().join("absent.json"))
            .expect_err("missing file");
        assert_eq!(missing.stage(), PipelineStage::Load);

        let malformed = TransactionLoader::from_slice(br#"[["A"], 3]"#).expect_err("malformed");
        assert_eq!(malformed.stage(), PipelineStage::Load);
    }
}

// =============================================================================
// TIER T1: FREQUENT ITEMSETS
// =============================================================================

mod t1_frequent_itemsets {
    use super::*;

    /// T1.1: {A,B} is frequent at support 0.5 (2 of 4).
    #[test]
    fn pair_meets_half_support() {
        let frequent = FpGrowth::new(Thresholds::new(0.5, 0.3))
            .frequent_itemsets(&sample())
            .expect("mine");

        assert_eq!(frequent.support(&Itemset::of(["A", "B"])), Some(0.5));
        assert_eq!(frequent.support(&Itemset::of(["A"])), Some(0.75));
    }

    /// T1.2: Nothing reaches support 0.9.
    #[test]
    fn nothing_meets_high_support() {
        let frequent = FpGrowth::new(Thresholds::new(0.9, 0.3))
            .frequent_itemsets(&sample())
            .expect("mine");
        assert!(frequent.is_empty());
    }

    /// T1.3: Unstorable items fail in the generator stage.
    #[test]
    fn unstorable_item_fails_in_mine_stage() {
        let err = FpGrowth::default()
            .frequent_itemsets(&[Transaction::new(["ok", ""])])
            .expect_err("empty item");
        assert_eq!(err.stage(), PipelineStage::Mine);
    }
}

// =============================================================================
// TIER T2: RULE DERIVATION
// =============================================================================

mod t2_rules {
    use super::*;

    /// T2.1: A -> B is emitted with support 0.5 and confidence 2/3.
    #[test]
    fn a_implies_b() {
        let frequent = FpGrowth::new(Thresholds::new(0.5, 0.3))
            .frequent_itemsets(&sample())
            .expect("mine");
        let rules = derive_rules(&frequent, 0.3).expect("rules");

        let rule = rules
            .iter()
            .find(|r| r.antecedents.joined() == "A" && r.consequents.joined() == "B")
            .expect("A -> B");
        assert_eq!(rule.support, 0.5);
        assert!(rule.confidence > 0.666 && rule.confidence < 0.667);
    }

    /// T2.2: Single-item itemsets never produce rules.
    #[test]
    fn singletons_produce_no_rules() {
        let transactions = vec![Transaction::new(["A"]), Transaction::new(["B"])];
        let frequent = FpGrowth::new(Thresholds::new(0.5, 0.0))
            .frequent_itemsets(&transactions)
            .expect("mine");

        assert_eq!(frequent.len(), 2);
        assert!(derive_rules(&frequent, 0.0).expect("rules").is_empty());
    }

    /// T2.3: Zero transactions, zero rules, no error.
    #[test]
    fn empty_input_no_rules() {
        let outcome = RuleMiner::default().mine(&[]).expect("mine");
        assert!(outcome.rules.is_empty());
    }
}

// =============================================================================
// TIER T3: RULE SINK AND FULL RUN
// =============================================================================

mod t3_sink {
    use super::*;

    /// T3.1: Stored rows use comma-joined sides.
    #[test]
    fn rows_are_comma_joined() {
        let temp = tempdir().expect("temp dir");
        let mut table = RuleTable::open(temp.path().join("rules.redb")).expect("open db");
        let transactions = vec![Transaction::new(["x", "y", "z"]); 3];

        RuleMiner::new(Thresholds::new(1.0, 1.0))
            .run_transactions(&transactions, &mut table)
            .expect("run");

        let rows = table.rows().expect("rows");
        assert_eq!(rows.len(), 12);
        assert!(
            rows.iter()
                .any(|r| r.rule.antecedents == "x" && r.rule.consequents == "y,z")
        );
        assert!(
            rows.iter()
                .any(|r| r.rule.antecedents == "x,y" && r.rule.consequents == "z")
        );
    }

    /// T3.1b: A rare item that could not be stored is pruned, not rejected.
    #[test]
    fn rare_unstorable_item_does_not_block_run() {
        let temp = tempdir().expect("temp dir");
        let mut table = RuleTable::open(temp.path().join("rules.redb")).expect("open db");
        let mut transactions = vec![Transaction::new(["video:1", "task:1"]); 20];
        transactions.push(Transaction::new(["Intro, part 2"]));

        let summary = RuleMiner::new(Thresholds::new(0.1, 0.3))
            .run_transactions(&transactions, &mut table)
            .expect("run");

        assert_eq!(summary.rules, 2);
        let rows = table.rows().expect("rows");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].rule.antecedents, "task:1");
        assert_eq!(rows[0].rule.consequents, "video:1");
        assert_eq!(rows[1].rule.antecedents, "video:1");
        assert_eq!(rows[1].rule.consequents, "task:1");
    }

    /// T3.2: Running twice stores one copy of each rule.
    #[test]
    fn repeated_runs_do_not_duplicate() {
        let temp = tempdir().expect("temp dir");
        let input = temp.path().join("transactions.json");
        std::fs::write(&input, SAMPLE_JSON).expect("write");
        let mut table = RuleTable::open(temp.path().join("rules.redb")).expect("open db");
        let miner = RuleMiner::new(Thresholds::new(0.5, 0.3));

        miner.run(&input, &mut table).expect("first");
        let summary = miner.run(&input, &mut table).expect("second");

        assert_eq!(summary.removed, 4);
        assert_eq!(table.len().expect("len"), 4);
    }

    /// T3.3: Support 0.9 on the sample leaves zero rows.
    #[test]
    fn high_support_clears_table() {
        let temp = tempdir().expect("temp dir");
        let mut table = RuleTable::open(temp.path().join("rules.redb")).expect("open db");
        RuleMiner::new(Thresholds::new(0.5, 0.3))
            .run_transactions(&sample(), &mut table)
            .expect("fill");

        let summary = RuleMiner::new(Thresholds::new(0.9, 0.3))
            .run_transactions(&sample(), &mut table)
            .expect("run");

        assert_eq!(summary.rules, 0);
        assert!(table.is_empty().expect("empty"));
    }

    /// T3.4: Invalid thresholds fail before the table is touched.
    #[test]
    fn invalid_threshold_keeps_rows() {
        let temp = tempdir().expect("temp dir");
        let mut table = RuleTable::open(temp.path().join("rules.redb")).expect("open db");
        RuleMiner::new(Thresholds::new(0.5, 0.3))
            .run_transactions(&sample(), &mut table)
            .expect("fill");

        let result = RuleMiner::new(Thresholds::new(0.5, 2.0)).run_transactions(&sample(), &mut table);

        assert!(matches!(result, Err(MinerError::InvalidThreshold { .. })));
        assert_eq!(table.len().expect("len"), 4);
    }
}
