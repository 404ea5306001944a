//! Application-level errors.

use crate::config::ConfigError;
use eduvers_rules_core::MinerError;
use thiserror::Error;

/// Everything that can end a run with a non-zero exit status.
#[derive(Debug, Error)]
pub enum AppError {
    /// A pipeline stage failed; the message names the stage.
    #[error("{} failed: {}", .0.stage(), .0)]
    Pipeline(#[from] MinerError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Writing command output failed.
    #[error("output error: {0}")]
    Output(String),
}

impl AppError {
    /// Report a fatal error to the operator.
    ///
    /// Goes through tracing when an ERROR event would be recorded, straight to
    /// stderr otherwise (e.g. `RUST_LOG=off`). Returns whether tracing took it.
    pub fn report(&self) -> bool {
        if tracing::enabled!(tracing::Level::ERROR) {
            tracing::error!("Error: {}", self);
            true
        } else {
            eprintln!("Error: {}", self);
            false
        }
    }
}
