//! # EDUVERS Rules CLI Module
//!
//! This module implements the CLI interface for the rule miner.
//!
//! ## Available Commands
//!
//! - `run` - Load, mine and replace the stored rules (default)
//! - `mine` - Load and mine only, print the rules
//! - `show` - Print the stored rules
//! - `init` - Create the database and an empty rule table

mod commands;

use crate::config::{CliOverrides, MinerConfig};
use crate::error::AppError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// EDUVERS recommendation rule miner
///
/// Mines association rules from interaction transactions and stores them in
/// the recommendation_rules table.
#[derive(Parser, Debug)]
#[command(name = "eduvers-rules")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (debug logs, rule table on `run`)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the rule database
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Path to the transactions JSON file
    #[arg(short, long, global = true)]
    pub input: Option<PathBuf>,

    /// Minimum itemset support, in (0, 1]
    #[arg(long, global = true)]
    pub min_support: Option<f64>,

    /// Minimum rule confidence, in [0, 1]
    #[arg(long, global = true)]
    pub min_confidence: Option<f64>,

    /// Largest itemset size to mine
    #[arg(long, global = true)]
    pub max_len: Option<usize>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mine rules and replace the stored rule set
    Run,

    /// Mine rules and print them without storing
    Mine {
        /// Print at most this many rules
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Print the stored rules
    Show,

    /// Create the database and an empty rule table
    Init {
        /// Delete an existing database first
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// The flags that override config file and environment.
    #[must_use]
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            input: self.input.clone(),
            database: self.database.clone(),
            min_support: self.min_support,
            min_confidence: self.min_confidence,
            max_len: self.max_len,
        }
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), AppError> {
    let config = MinerConfig::load(cli.config.as_deref(), Some(&cli.overrides()))?;
    let output = Output {
        json: cli.json_mode,
        quiet: cli.quiet,
        verbose: cli.verbose,
    };

    match cli.command {
        Some(Commands::Mine { limit }) => cmd_mine(&config, output, limit).map(drop),
        Some(Commands::Show) => cmd_show(&config, output).map(drop),
        Some(Commands::Init { force }) => cmd_init(&config, output, force),
        // No subcommand - run the job by default
        Some(Commands::Run) | None => cmd_run(&config, output).map(drop),
    }
}
