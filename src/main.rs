//! # Fiber Design Validator Driver
//!
//! ## Purpose
//! Command-line entry point: loads configuration, initializes logging, runs
//! the requested validation checks against an extracted export workspace,
//! and emits the report as JSON for downstream consumers.
//!
//! ## Input/Output Specification
//! - **Input**: workspace directory path, requested check names, optional
//!   tolerance and deadline overrides
//! - **Output**: the validation report as JSON on stdout or to a file
//! - **Exit code**: 0 when every check passed, 1 when any check reported
//!   findings or errors, 2 on input errors
//!
//! ## Architecture Flow
//! 1. Parse command line arguments and load configuration
//! 2. Initialize logging and tracing
//! 3. Run the validation engine against the workspace
//! 4. Serialize the report and choose the exit code

use clap::{Arg, ArgAction, Command};
use std::time::Duration;
use tracing::{error, info};

use fiber_design_validator::{
    config::Config,
    engine::{RunOptions, ValidationEngine},
    errors::{Result, ValidationError},
    CheckKind,
};

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let matches = Command::new("fiber-validator")
        .version("0.1.0")
        .about("Validates fiber-optic network design exports against geometric and referential design rules")
        .arg(
            Arg::new("workspace")
                .value_name("DIR")
                .help("Extracted export workspace directory")
                .required_unless_present("list-checks"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("checks")
                .long("checks")
                .value_name("NAMES")
                .help("Comma-separated check names to run (default: all)"),
        )
        .arg(
            Arg::new("tolerance")
                .long("tolerance")
                .value_name("DISTANCE")
                .help("Override the point-matching tolerance (coordinate system units)")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("deadline-ms")
                .long("deadline-ms")
                .value_name("MILLIS")
                .help("Overall deadline; late checks are reported as errors")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Write the JSON report to a file instead of stdout"),
        )
        .arg(
            Arg::new("compact")
                .long("compact")
                .help("Emit compact instead of pretty-printed JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-checks")
                .long("list-checks")
                .help("List the available checks and exit")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    if matches.get_flag("list-checks") {
        for kind in CheckKind::ALL {
            println!("{:24} {}", kind.name(), kind.description());
        }
        return 0;
    }

    let config_path = matches.get_one::<String>("config").unwrap();
    let config = match Config::from_file(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return 2;
        }
    };

    if let Err(e) = init_logging(&config) {
        eprintln!("Logging setup failed: {}", e);
        return 2;
    }

    let workspace = matches.get_one::<String>("workspace").unwrap();
    let options = RunOptions {
        checks: matches
            .get_one::<String>("checks")
            .map(|s| {
                s.split(',')
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty())
                    .collect()
            })
            .unwrap_or_default(),
        tolerance: matches.get_one::<f64>("tolerance").copied(),
        deadline: matches
            .get_one::<u64>("deadline-ms")
            .map(|ms| Duration::from_millis(*ms)),
    };

    info!("Validating workspace: {}", workspace);
    let engine = ValidationEngine::new(config);
    let report = match engine.run(workspace, &options) {
        Ok(report) => report,
        Err(e) => {
            error!("Validation run rejected: {}", e);
            eprintln!("Error: {}", e);
            return 2;
        }
    };

    let json = if matches.get_flag("compact") {
        serde_json::to_string(&report)
    } else {
        serde_json::to_string_pretty(&report)
    };
    let json = match json {
        Ok(json) => json,
        Err(e) => {
            error!("Report serialization failed: {}", e);
            return 2;
        }
    };

    if let Some(path) = matches.get_one::<String>("output") {
        if let Err(e) = std::fs::write(path, &json) {
            error!("Failed to write report to {}: {}", path, e);
            return 2;
        }
        info!("Report written to {}", path);
    } else {
        println!("{}", json);
    }

    let summary = report.summary();
    info!(
        "Checks: {} passed, {} failed, {} errored",
        summary.passed, summary.failed, summary.errored
    );

    if report.has_failures() {
        1
    } else {
        0
    }
}

/// Initialize logging and tracing
fn init_logging(config: &Config) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

    let log_level: tracing::Level =
        config
            .logging
            .level
            .parse()
            .map_err(|_| ValidationError::Config {
                message: format!("Invalid log level: {}", config.logging.level),
            })?;
    let filter = tracing_subscriber::filter::LevelFilter::from_level(log_level);

    // logs go to stderr in both formats; stdout is reserved for the report
    if config.logging.json_format {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .json()
                    .with_writer(std::io::stderr)
                    .with_filter(filter),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_filter(filter),
            )
            .init();
    }

    Ok(())
}
