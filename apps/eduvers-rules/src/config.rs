//! # Configuration
//!
//! Run configuration with layered resolution.
//!
//! Resolution order (highest priority first):
//! 1. CLI flags (applied via `apply_cli_overrides`)
//! 2. Environment variables (`EDUVERS_*`)
//! 3. Config file (`--config`, else `eduvers-rules.toml` in the working directory)
//! 4. Compiled defaults
//!
//! ```toml
//! input = "EDUVERS/storage/app/private/transactions.json"
//! database = "eduvers.redb"
//!
//! [thresholds]
//! min_support = 0.1
//! min_confidence = 0.3
//! max_len = 3
//! ```

use eduvers_rules_core::Thresholds;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "eduvers-rules.toml";

/// Where the EDUVERS application writes its interaction transactions.
pub const DEFAULT_INPUT: &str = "EDUVERS/storage/app/private/transactions.json";

pub const DEFAULT_DATABASE: &str = "eduvers.redb";

pub const ENV_INPUT: &str = "EDUVERS_INPUT";
pub const ENV_DATABASE: &str = "EDUVERS_DATABASE";
pub const ENV_MIN_SUPPORT: &str = "EDUVERS_MIN_SUPPORT";
pub const ENV_MIN_CONFIDENCE: &str = "EDUVERS_MIN_CONFIDENCE";
pub const ENV_MAX_LEN: &str = "EDUVERS_MAX_LEN";

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    #[error("cannot read config file {path}: {message}")]
    ReadFailed { path: String, message: String },

    #[error("invalid config file {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("invalid value for {var}: '{value}'")]
    InvalidEnv { var: &'static str, value: String },

    #[error("invalid {field}: {message}")]
    ValidationFailed { field: String, message: String },
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    /// Transactions file.
    pub input: PathBuf,
    /// redb database holding `recommendation_rules`.
    pub database: PathBuf,
    pub thresholds: Thresholds,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            database: PathBuf::from(DEFAULT_DATABASE),
            thresholds: Thresholds::default(),
        }
    }
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub input: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub min_support: Option<f64>,
    pub min_confidence: Option<f64>,
    pub max_len: Option<usize>,
}

impl MinerConfig {
    /// Resolve configuration from every layer, reading the process environment.
    pub fn load(
        config_path: Option<&Path>,
        cli_overrides: Option<&CliOverrides>,
    ) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, cli_overrides, |var| std::env::var(var).ok())
    }

    /// Resolve configuration with an explicit environment lookup.
    pub fn load_with_env<F>(
        config_path: Option<&Path>,
        cli_overrides: Option<&CliOverrides>,
        env: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Layers 4 and 3: defaults, then the config file on top.
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        // Layer 2: environment variables
        config.apply_env_overrides(env)?;

        // Layer 1: CLI flags
        if let Some(cli) = cli_overrides {
            config.apply_cli_overrides(cli);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string. Missing keys keep their defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::ReadFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            },
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn apply_env_overrides<F>(&mut self, env: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(input) = env(ENV_INPUT) {
            self.input = PathBuf::from(input);
        }
        if let Some(database) = env(ENV_DATABASE) {
            self.database = PathBuf::from(database);
        }
        if let Some(raw) = env(ENV_MIN_SUPPORT) {
            self.thresholds.min_support = parse_env(ENV_MIN_SUPPORT, &raw)?;
        }
        if let Some(raw) = env(ENV_MIN_CONFIDENCE) {
            self.thresholds.min_confidence = parse_env(ENV_MIN_CONFIDENCE, &raw)?;
        }
        if let Some(raw) = env(ENV_MAX_LEN) {
            self.thresholds.max_len = Some(parse_env(ENV_MAX_LEN, &raw)?);
        }
        Ok(())
    }

    /// Apply CLI flags; only flags that were given override.
    pub fn apply_cli_overrides(&mut self, cli: &CliOverrides) {
        if let Some(ref input) = cli.input {
            self.input = input.clone();
        }
        if let Some(ref database) = cli.database {
            self.database = database.clone();
        }
        if let Some(min_support) = cli.min_support {
            self.thresholds.min_support = min_support;
        }
        if let Some(min_confidence) = cli.min_confidence {
            self.thresholds.min_confidence = min_confidence;
        }
        if let Some(max_len) = cli.max_len {
            self.thresholds.max_len = Some(max_len);
        }
    }

    /// Validate the resolved values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds
            .validate()
            .map_err(|e| ConfigError::ValidationFailed {
                field: "thresholds".to_string(),
                message: e.to_string(),
            })?;
        if self.database.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "database".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var,
        value: raw.to_string(),
    })
}

// =============================================================================
// TESTS
// =============================================================================
