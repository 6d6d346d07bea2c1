//! # Fiber Design Validation Engine
//!
//! ## Overview
//! This library validates fiber-optic network design exports (a bundle of
//! related vector feature layers describing cables, closures, clusters,
//! splice points, and segments) against a fixed set of geometric and
//! referential design rules, producing a structured report for presentation
//! layers (web UI, PDF export).
//!
//! ## Architecture
//! The system is composed of several key modules:
//! - `workspace`: feature layer loader over an extracted export directory
//! - `spatial`: per-layer broad-phase spatial index for overlap and
//!   proximity queries
//! - `checks`: the fixed check registry and the ten validation algorithms
//! - `engine`: the aggregator running requested checks in parallel
//! - `report`: the shared result contract all checks populate
//! - `config`: configuration management and settings
//! - `errors`: centralized error handling and types
//!
//! ## Input/Output Specification
//! - **Input**: an extracted workspace directory and a requested subset of
//!   check names from the fixed registry
//! - **Output**: an ordered report of `(check_name, CheckResult)` pairs with
//!   the `Passed|Failed|Error` status vocabulary
//! - **Isolation**: one check's processing error never aborts the others
//!
//! ## Usage
//! ```rust,no_run
//! use fiber_design_validator::{Config, RunOptions, ValidationEngine};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = ValidationEngine::new(Config::load()?);
//!     let report = engine.run("./export/output", &RunOptions::default())?;
//!     println!("{}", serde_json::to_string_pretty(&report)?);
//!     Ok(())
//! }
//! ```

// Core modules
pub mod checks;
pub mod config;
pub mod engine;
pub mod errors;
pub mod report;
pub mod spatial;
pub mod workspace;

// Re-exports for convenience
pub use checks::CheckKind;
pub use config::Config;
pub use engine::{RunOptions, ValidationEngine};
pub use errors::{Result, ValidationError};
pub use report::{CheckResult, CheckStatus, Report};
