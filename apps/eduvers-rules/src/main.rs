//! # eduvers-rules - Recommendation Rule Miner
//!
//! The batch job behind EDUVERS recommendations.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 apps/eduvers-rules (THE BINARY)              │
//! │                                                              │
//! │   ┌─────────────┐   ┌──────────────┐   ┌────────────────┐    │
//! │   │    CLI      │   │    Config    │   │    Logging     │    │
//! │   │   (clap)    │   │ (toml + env) │   │   (tracing)    │    │
//! │   └──────┬──────┘   └──────┬───────┘   └────────────────┘    │
//! │          └─────────┬───────┘                                 │
//! │                    ▼                                         │
//! │          ┌────────────────────┐                              │
//! │          │ eduvers-rules-core │                              │
//! │          │    (THE LOGIC)     │                              │
//! │          └────────────────────┘                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Mine and store with default thresholds (support 0.1, confidence 0.3)
//! eduvers-rules
//!
//! # Dry run with custom thresholds
//! eduvers-rules mine --min-support 0.2 --min-confidence 0.5
//!
//! # Inspect the stored rules
//! eduvers-rules show --json-mode
//! ```

use clap::Parser;
use eduvers_rules::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = cli::execute(cli) {
        e.report();
        std::process::exit(1);
    }
}

/// Initialize tracing. EDUVERS_LOG_FORMAT=json switches to JSON lines.
///
/// Logs go to stderr so stdout carries only command output.
fn init_tracing(verbose: bool) {
    let log_format = std::env::var("EDUVERS_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if verbose {
        "eduvers_rules=debug"
    } else {
        "eduvers_rules=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
