//! # Validation Engine Module
//!
//! ## Purpose
//! The result aggregator: resolves the requested check names against the
//! registry, runs each check in parallel over the immutable workspace, and
//! assembles the ordered report.
//!
//! ## Input/Output Specification
//! - **Input**: Workspace path, requested check names, optional tolerance
//!   override, optional overall deadline
//! - **Output**: A [`Report`] with one entry per requested check, in request
//!   order regardless of completion order
//!
//! ## Graceful Degradation
//! - Unknown check names reject the request before any layer is loaded
//! - A check that panics is converted to an `Error` result; the other
//!   checks are unaffected
//! - A check that does not complete within the overall deadline is reported
//!   as `Error` with a timeout cause; completed checks report normally
//! - The aggregator itself only fails on total input errors (bad workspace,
//!   unknown check name)

use crate::checks::{self, CheckContext, CheckKind};
use crate::config::Config;
use crate::errors::Result;
use crate::report::{CheckError, CheckReport, CheckResult, Report, ResultBuilder};
use crate::workspace::Workspace;
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::time::{Duration, Instant};

/// Options for one validation run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Requested check names; empty means the full catalogue
    pub checks: Vec<String>,
    /// Per-request override of the point-matching tolerance
    pub tolerance: Option<f64>,
    /// Per-request override of the overall deadline
    pub deadline: Option<Duration>,
}

/// The validation engine: a configured, reusable check runner
pub struct ValidationEngine {
    config: Config,
}

impl ValidationEngine {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the requested checks against a workspace and assemble the report.
    ///
    /// Checks are pure functions over the shared read-only workspace; they
    /// run on a worker pool bounded by the configured maximum and the
    /// available cores, and their results are collected back into request
    /// order.
    pub fn run<P: AsRef<Path>>(&self, workspace_path: P, options: &RunOptions) -> Result<Report> {
        // resolve names first: an unknown check is an input error raised
        // before any layer I/O happens
        let kinds = checks::resolve(&options.checks)?;
        let workspace = Workspace::open(workspace_path)?;

        let deadline = options.deadline.or_else(|| {
            (self.config.engine.deadline_ms > 0)
                .then(|| Duration::from_millis(self.config.engine.deadline_ms))
        });
        let started = Instant::now();

        let workers = self
            .config
            .engine
            .max_workers
            .min(num_cpus::get())
            .min(kinds.len().max(1));
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| crate::internal_error!("failed to build worker pool: {}", e))?;

        tracing::info!(
            workspace = %workspace.id(),
            checks = kinds.len(),
            workers,
            "starting validation run"
        );

        let results: Vec<CheckReport> = pool.install(|| {
            kinds
                .par_iter()
                .map(|kind| CheckReport {
                    check_name: kind.name().to_string(),
                    result: self.run_one(*kind, &workspace, options, started, deadline),
                })
                .collect()
        });

        let report = Report::new(workspace.id(), results);
        let summary = report.summary();
        tracing::info!(
            passed = summary.passed,
            failed = summary.failed,
            errored = summary.errored,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "validation run finished"
        );
        Ok(report)
    }

    /// Execute one check with panic and deadline guarding
    fn run_one(
        &self,
        kind: CheckKind,
        workspace: &Workspace,
        options: &RunOptions,
        started: Instant,
        deadline: Option<Duration>,
    ) -> CheckResult {
        if let Some(limit) = deadline {
            if started.elapsed() > limit {
                return timeout_result(started.elapsed(), limit);
            }
        }

        let check_started = Instant::now();
        let ctx = CheckContext::new(workspace, &self.config, options.tolerance);
        let outcome = catch_unwind(AssertUnwindSafe(|| kind.run(&ctx)));

        let result = match outcome {
            Ok(result) => match deadline {
                Some(limit) if started.elapsed() > limit => {
                    timeout_result(started.elapsed(), limit)
                }
                _ => result,
            },
            Err(_) => {
                let mut builder = ResultBuilder::new(0);
                builder.error(CheckError::panic());
                builder.finish()
            }
        };

        tracing::info!(
            check = kind.name(),
            status = ?result.status,
            issues = result.summary.total_issues,
            elapsed_ms = check_started.elapsed().as_millis() as u64,
            "check finished"
        );
        result
    }
}

fn timeout_result(elapsed: Duration, limit: Duration) -> CheckResult {
    let mut builder = ResultBuilder::new(0);
    builder.error(CheckError::timeout(
        elapsed.as_millis() as u64,
        limit.as_millis() as u64,
    ));
    builder.finish()
}
