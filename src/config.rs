//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration for the validation engine: execution limits,
//! per-check parameters (tolerances, allowed value domains, capacity tables),
//! and logging settings, with type-safe access and validation.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration file (TOML), environment variables
//! - **Output**: Validated configuration structs with defaults and overrides
//! - **Validation**: Range checks, pattern compilation, domain sanity
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Environment variables (`FIBER_VALIDATOR_*`)
//! 2. Configuration file
//! 3. Default values
//!
//! ## Usage
//! ```rust,no_run
//! use fiber_design_validator::config::Config;
//!
//! let config = Config::from_file("config.toml").unwrap();
//! println!("Point tolerance: {}", config.checks.tolerance);
//! ```

use crate::errors::{Result, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Main configuration structure containing all engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Execution settings for the aggregator
    pub engine: EngineConfig,
    /// Per-check parameters and value domains
    pub checks: ChecksConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Execution settings for the check aggregator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of parallel check workers (capped by available cores)
    pub max_workers: usize,
    /// Overall deadline for a validation run in milliseconds; checks still
    /// running past it are reported with `Error` status (0 = no deadline)
    pub deadline_ms: u64,
    /// Maximum number of sample evidence records attached to a check summary
    pub sample_cap: usize,
}

/// Per-check parameters and value domains
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecksConfig {
    /// Default distance tolerance for point-location matching, in coordinate
    /// system units
    pub tolerance: f64,
    /// Minimum allowed cable/bundle granularity value
    pub min_granularity: i64,
    /// Expected pattern for tool-assigned segment identifiers
    pub gistool_pattern: String,
    /// Maximum splice count per closure type identifier
    pub splice_capacities: BTreeMap<String, u64>,
    /// Allowed cable diameters (mm) per cable family
    pub allowed_diameters: BTreeMap<String, Vec<f64>>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable structured JSON logging
    pub json_format: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            checks: ChecksConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_workers: num_cpus::get(),
            deadline_ms: 0,
            sample_cap: 10,
        }
    }
}

impl Default for ChecksConfig {
    fn default() -> Self {
        let mut splice_capacities = BTreeMap::new();
        splice_capacities.insert("BE16".to_string(), 840);
        splice_capacities.insert("flat_dis".to_string(), 288);
        splice_capacities.insert("OFDC".to_string(), 96);
        splice_capacities.insert("Budi-S 9-48 HP".to_string(), 48);
        splice_capacities.insert("POC_UG_1-8HP".to_string(), 8);
        splice_capacities.insert("Budi-S 49-72 HP".to_string(), 72);

        let mut allowed_diameters = BTreeMap::new();
        allowed_diameters.insert("Feeder".to_string(), vec![9.6, 11.6, 14.2, 17.2]);
        allowed_diameters.insert("Distribution".to_string(), vec![6.4, 8.0, 9.6, 11.6]);
        allowed_diameters.insert("PrimDistribution".to_string(), vec![9.6, 11.6, 14.2]);
        allowed_diameters.insert("Drop".to_string(), vec![4.8, 5.3, 6.4]);

        Self {
            tolerance: 0.01,
            min_granularity: 1,
            gistool_pattern: "^[A-Za-z0-9][A-Za-z0-9_-]*$".to_string(),
            splice_capacities,
            allowed_diameters,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Load configuration from a specific file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!("Configuration file not found: {:?}, using defaults", path);
            let mut config = Self::default();
            config.apply_env_overrides()?;
            config.validate()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path).map_err(|e| ValidationError::Config {
            message: format!("Failed to read config file {:?}: {}", path, e),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| ValidationError::Config {
            message: format!("Failed to parse config file {:?}: {}", path, e),
        })?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(level) = std::env::var("FIBER_VALIDATOR_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(tolerance) = std::env::var("FIBER_VALIDATOR_TOLERANCE") {
            self.checks.tolerance = tolerance.parse().map_err(|_| ValidationError::Config {
                message: "Invalid number in FIBER_VALIDATOR_TOLERANCE".to_string(),
            })?;
        }
        if let Ok(workers) = std::env::var("FIBER_VALIDATOR_MAX_WORKERS") {
            self.engine.max_workers = workers.parse().map_err(|_| ValidationError::Config {
                message: "Invalid number in FIBER_VALIDATOR_MAX_WORKERS".to_string(),
            })?;
        }
        Ok(())
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.engine.max_workers == 0 {
            return Err(ValidationError::Config {
                message: "engine.max_workers must be greater than zero".to_string(),
            });
        }

        if self.engine.sample_cap == 0 {
            return Err(ValidationError::Config {
                message: "engine.sample_cap must be greater than zero".to_string(),
            });
        }

        if !self.checks.tolerance.is_finite() || self.checks.tolerance <= 0.0 {
            return Err(ValidationError::Config {
                message: "checks.tolerance must be a positive number".to_string(),
            });
        }

        regex::Regex::new(&self.checks.gistool_pattern).map_err(|e| ValidationError::Config {
            message: format!("checks.gistool_pattern is not a valid pattern: {}", e),
        })?;

        for (family, diameters) in &self.checks.allowed_diameters {
            if diameters.is_empty() {
                return Err(ValidationError::Config {
                    message: format!("checks.allowed_diameters.{} must not be empty", family),
                });
            }
            if diameters.iter().any(|d| !d.is_finite() || *d <= 0.0) {
                return Err(ValidationError::Config {
                    message: format!(
                        "checks.allowed_diameters.{} must contain positive numbers",
                        family
                    ),
                });
            }
        }

        Ok(())
    }

    /// Get configuration as TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ValidationError::Config {
            message: format!("Failed to serialize config to TOML: {}", e),
        })
    }
}
