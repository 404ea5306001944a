//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::config::MinerConfig;
use crate::error::AppError;
use eduvers_rules_core::{
    AssociationRule, MinerError, RuleMiner, RuleRow, RuleTable, RunSummary,
    primitives::RULES_TABLE_NAME,
};

/// How command results are written to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    /// Machine-readable JSON instead of text.
    pub json: bool,
    /// No text output at all (JSON is still printed).
    pub quiet: bool,
    /// Also print the mined rule table on `run`.
    pub verbose: bool,
}

fn print_json(value: &serde_json::Value) -> Result<(), AppError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| AppError::Output(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::Output(e.to_string()))
}

// =============================================================================
// RUN COMMAND
// =============================================================================

/// Load transactions, mine rules, replace the stored rule set.
///
/// The database is opened only after mining succeeded, so load and mining
/// failures never touch the stored rules.
pub fn cmd_run(config: &MinerConfig, output: Output) -> Result<RunSummary, AppError> {
    let miner = RuleMiner::new(config.thresholds);

    tracing::info!("Loading transactions from {:?}", config.input);
    let transactions = miner.load(&config.input)?;
    tracing::info!("Loaded {} transactions", transactions.len());

    let outcome = miner.mine(&transactions)?;
    tracing::info!(
        "Generated {} rules from {} frequent itemsets (min_support={}, min_confidence={})",
        outcome.rules.len(),
        outcome.frequent.len(),
        config.thresholds.min_support,
        config.thresholds.min_confidence
    );

    let mut table = RuleTable::open(&config.database)?;
    let replaced = table.replace_all(&outcome.rules)?;
    tracing::info!(
        "Replaced {}: {} old rows deleted, {} rules inserted",
        RULES_TABLE_NAME,
        replaced.removed,
        replaced.inserted
    );

    let summary = RunSummary {
        transactions: transactions.len(),
        frequent_itemsets: outcome.frequent.len(),
        rules: outcome.rules.len(),
        removed: replaced.removed,
    };

    if output.json {
        print_json(&serde_json::json!({
            "input": config.input.to_string_lossy(),
            "database": config.database.to_string_lossy(),
            "min_support": config.thresholds.min_support,
            "min_confidence": config.thresholds.min_confidence,
            "transactions": summary.transactions,
            "frequent_itemsets": summary.frequent_itemsets,
            "rules": summary.rules,
            "removed": summary.removed
        }))?;
    } else if !output.quiet {
        if output.verbose {
            print!("{}", render_rule_table(&outcome.rules));
            println!();
        }
        println!("Transactions:      {}", summary.transactions);
        println!("Frequent itemsets: {}", summary.frequent_itemsets);
        println!("Old rules deleted: {}", summary.removed);
        println!("Rules inserted:    {}", summary.rules);
    }

    Ok(summary)
}

// =============================================================================
// MINE COMMAND
// =============================================================================

/// Load and mine, then print the rules. Nothing is written.
pub fn cmd_mine(
    config: &MinerConfig,
    output: Output,
    limit: Option<usize>,
) -> Result<Vec<AssociationRule>, AppError> {
    let miner = RuleMiner::new(config.thresholds);

    tracing::info!("Loading transactions from {:?}", config.input);
    let transactions = miner.load(&config.input)?;
    let outcome = miner.mine(&transactions)?;
    tracing::debug!(
        "Mined {} frequent itemsets from {} transactions",
        outcome.frequent.len(),
        transactions.len()
    );

    let shown = &outcome.rules[..limit.map_or(outcome.rules.len(), |n| n.min(outcome.rules.len()))];

    if output.json {
        print_json(&serde_json::json!({
            "transactions": transactions.len(),
            "frequent_itemsets": outcome.frequent.len(),
            "rule_count": outcome.rules.len(),
            "rules": to_json(&shown)?
        }))?;
    } else if !output.quiet {
        print!("{}", render_rule_table(shown));
        println!();
        println!("Number of rules: {}", outcome.rules.len());
    }

    Ok(outcome.rules)
}

/// Text table of rules, one line per rule, header first.
#[must_use]
pub fn render_rule_table(rules: &[AssociationRule]) -> String {
    let antecedents: Vec<String> = rules.iter().map(|r| r.antecedents.joined()).collect();
    let consequents: Vec<String> = rules.iter().map(|r| r.consequents.joined()).collect();
    let a_width = antecedents.iter().map(String::len).max().unwrap_or(0).max(11);
    let c_width = consequents.iter().map(String::len).max().unwrap_or(0).max(11);

    let mut out = format!(
        "{:<a_width$}  {:<c_width$}  {:>8}  {:>10}  {:>8}\n",
        "antecedents", "consequents", "support", "confidence", "lift"
    );
    for ((rule, a), c) in rules.iter().zip(&antecedents).zip(&consequents) {
        out.push_str(&format!(
            "{:<a_width$}  {:<c_width$}  {:>8.4}  {:>10.4}  {:>8.4}\n",
            a, c, rule.support, rule.confidence, rule.lift
        ));
    }
    out
}

// =============================================================================
// SHOW COMMAND
// =============================================================================

/// Print the stored rules.
pub fn cmd_show(config: &MinerConfig, output: Output) -> Result<Vec<RuleRow>, AppError> {
    let table = RuleTable::open(&config.database)?;
    let rows = table.rows()?;

    if output.json {
        print_json(&to_json(&rows)?)?;
    } else if !output.quiet {
        println!("{} ({} rows)", RULES_TABLE_NAME, rows.len());
        for row in &rows {
            println!(
                "{:>6}  {} -> {}  support={:.4} confidence={:.4}",
                row.id, row.rule.antecedents, row.rule.consequents, row.rule.support, row.rule.confidence
            );
        }
    }

    Ok(rows)
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Create the database and an empty rule table.
pub fn cmd_init(config: &MinerConfig, output: Output, force: bool) -> Result<(), AppError> {
    let existed = config.database.exists();

    if existed && force {
        tracing::warn!("Removing existing database {:?}", config.database);
        std::fs::remove_file(&config.database).map_err(|e| {
            MinerError::StoreWrite(format!(
                "cannot remove '{}': {}",
                config.database.display(),
                e
            ))
        })?;
    }

    let table = RuleTable::open(&config.database)?;
    let rows = table.len()?;

    if output.json {
        print_json(&serde_json::json!({
            "database": config.database.to_string_lossy(),
            "table": RULES_TABLE_NAME,
            "rows": rows,
            "created": !existed || force
        }))?;
    } else if !output.quiet {
        if existed && !force {
            println!(
                "Database {:?} already exists ({} rows in {})",
                config.database, rows, RULES_TABLE_NAME
            );
        } else {
            println!("Initialized {} in {:?}", RULES_TABLE_NAME, config.database);
        }
    }

    Ok(())
}
