//! # eduvers-rules
//!
//! CLI, configuration and error reporting around `eduvers-rules-core`.

pub mod cli;
pub mod config;
pub mod error;

pub use config::{CliOverrides, ConfigError, MinerConfig};
pub use error::AppError;
