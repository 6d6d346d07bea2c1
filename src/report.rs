//! # Report Contract Module
//!
//! ## Purpose
//! The shared result schema every check populates and the formatter/UI
//! collaborators consume. Field names and the `Passed|Failed|Error` status
//! vocabulary are a contract; changing them requires a version bump.
//!
//! ## Input/Output Specification
//! - **Input**: Issue details, processing errors, summary counters from checks
//! - **Output**: [`CheckResult`] values with a consistent status invariant,
//!   assembled into an ordered [`Report`]
//! - **Invariant**: `Error` iff `errors` is non-empty; `Failed` iff `details`
//!   is non-empty and `errors` is empty; `Passed` iff both are empty
//!
//! ## Key Features
//! - Closed tri-state status variant (no boolean-plus-null conventions)
//! - One `type`-tagged issue enum shared by all checks, including a
//!   table-shaped payload for report-only checks
//! - Builder that derives the status, so no check can emit an inconsistent
//!   `(status, details, errors)` combination
//! - Bounded sample evidence lists with a configurable cap

use crate::errors::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Outcome status of one check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    /// No issues found
    Passed,
    /// Issues found, check completed
    Failed,
    /// Check could not complete
    Error,
}

/// Typed issue record; each variant is one check's finding shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IssueDetail {
    /// A logical identifier shared by more than one record
    DuplicateKey { id: String, duplicate_count: u64 },
    /// A reference attribute left null or empty
    NullReference { layer: String, record_id: String },
    /// A non-empty reference that does not resolve in the referenced layer
    DanglingReference {
        layer: String,
        record_id: String,
        reference: String,
    },
    /// Table-shaped payload for informational, no-failure-concept checks
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// Two polygons of one cluster layer intersecting with non-zero area
    ClusterOverlap {
        layer: String,
        first_id: String,
        second_id: String,
        intersection_area: f64,
    },
    /// An attribute value outside its allowed domain
    OutOfDomain {
        layer: String,
        record_id: String,
        field: String,
        observed: String,
        allowed: String,
    },
    /// A named structural rule violated by one record
    RuleViolation {
        rule: String,
        layer: String,
        record_id: String,
        message: String,
    },
    /// A point with no counterpart within tolerance in the matched layer
    UnmatchedPoint {
        layer: String,
        record_id: String,
        x: f64,
        y: f64,
        nearest_distance: Option<f64>,
        tolerance: f64,
    },
    /// A point lying within tolerance of a point it must stay clear of
    PointProximity {
        layer: String,
        record_id: String,
        x: f64,
        y: f64,
        other_layer: String,
        other_id: String,
        distance: f64,
        tolerance: f64,
    },
    /// A cable diameter outside the allowed set for its family
    InvalidDiameter {
        layer: String,
        record_id: String,
        observed: f64,
        allowed: Vec<f64>,
    },
    /// A tool-assigned identifier that does not match the expected pattern
    MalformedId {
        layer: String,
        record_id: String,
        value: String,
    },
    /// A tool-assigned identifier used by more than one record
    DuplicateId {
        layer: String,
        value: String,
        count: u64,
    },
    /// A tool-assigned identifier on a segment kind that must not carry one
    UnexpectedId {
        layer: String,
        record_id: String,
        segment_type: String,
        value: String,
    },
    /// An expected layer absent from the workspace
    MissingLayer { layer: String },
    /// A required column absent from a present layer
    MissingColumn { layer: String, column: String },
    /// A record without geometry in a geometry-bearing layer
    EmptyGeometry { layer: String, record_id: String },
    /// A record whose identifier attribute is empty
    EmptyIdentifier { layer: String, record_id: String },
}

/// Processing-error description, distinct from validation findings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckError {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl CheckError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn timeout(elapsed_ms: u64, deadline_ms: u64) -> Self {
        Self::new(
            "timeout",
            format!(
                "check did not complete within the {}ms deadline (took {}ms)",
                deadline_ms, elapsed_ms
            ),
        )
    }

    pub fn panic() -> Self {
        Self::new("panic", "check panicked during execution")
    }
}

impl From<&ValidationError> for CheckError {
    fn from(err: &ValidationError) -> Self {
        Self::new(err.category(), err.to_string())
    }
}

/// Short description of a check's outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckSummary {
    /// Total number of issue records in `details`
    pub total_issues: u64,
    /// Optional free-form message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Bounded sample evidence list (first N offending records)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<serde_json::Value>,
    /// Check-specific counters, flattened into the summary object
    #[serde(flatten)]
    pub metrics: BTreeMap<String, u64>,
}

/// The atomic output of one check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub status: CheckStatus,
    pub summary: CheckSummary,
    pub details: Vec<IssueDetail>,
    pub errors: Vec<CheckError>,
}

impl CheckResult {
    /// Shortcut for a check that failed before producing anything
    pub fn from_error(err: &ValidationError) -> Self {
        ResultBuilder::new(0).error_from(err).finish()
    }
}

/// Accumulates a check's output and derives the status invariant on finish
#[derive(Debug)]
pub struct ResultBuilder {
    sample_cap: usize,
    message: Option<String>,
    samples: Vec<serde_json::Value>,
    metrics: BTreeMap<String, u64>,
    details: Vec<IssueDetail>,
    issues: u64,
    errors: Vec<CheckError>,
}

impl ResultBuilder {
    pub fn new(sample_cap: usize) -> Self {
        Self {
            sample_cap,
            message: None,
            samples: Vec::new(),
            metrics: BTreeMap::new(),
            details: Vec::new(),
            issues: 0,
            errors: Vec::new(),
        }
    }

    /// Record a validation finding; drives the `Failed` status
    pub fn detail(&mut self, detail: IssueDetail) -> &mut Self {
        self.issues += 1;
        self.details.push(detail);
        self
    }

    /// Record an informational payload (e.g. a tabulation) that carries no
    /// failure meaning; the status stays `Passed` on its account
    pub fn info(&mut self, detail: IssueDetail) -> &mut Self {
        self.details.push(detail);
        self
    }

    pub fn error(&mut self, error: CheckError) -> &mut Self {
        self.errors.push(error);
        self
    }

    pub fn error_from(mut self, err: &ValidationError) -> Self {
        self.errors.push(CheckError::from(err));
        self
    }

    pub fn message(&mut self, message: impl Into<String>) -> &mut Self {
        self.message = Some(message.into());
        self
    }

    pub fn metric(&mut self, name: impl Into<String>, value: u64) -> &mut Self {
        self.metrics.insert(name.into(), value);
        self
    }

    /// Attach sample evidence; silently drops entries past the cap
    pub fn sample(&mut self, sample: serde_json::Value) -> &mut Self {
        if self.samples.len() < self.sample_cap {
            self.samples.push(sample);
        }
        self
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn finish(self) -> CheckResult {
        let status = if !self.errors.is_empty() {
            CheckStatus::Error
        } else if self.issues > 0 {
            CheckStatus::Failed
        } else {
            CheckStatus::Passed
        };
        CheckResult {
            status,
            summary: CheckSummary {
                total_issues: self.issues,
                message: self.message,
                samples: self.samples,
                metrics: self.metrics,
            },
            details: self.details,
            errors: self.errors,
        }
    }
}

/// One `(check_name, CheckResult)` pair of the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub check_name: String,
    pub result: CheckResult,
}

/// Aggregate counts over a report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub errored: u32,
}

/// The final validation report: one entry per requested check, in request
/// order, plus the source workspace identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub workspace: String,
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub results: Vec<CheckReport>,
}

impl Report {
    pub fn new(workspace: String, results: Vec<CheckReport>) -> Self {
        Self {
            workspace,
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            results,
        }
    }

    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary::default();
        for entry in &self.results {
            summary.total += 1;
            match entry.result.status {
                CheckStatus::Passed => summary.passed += 1,
                CheckStatus::Failed => summary.failed += 1,
                CheckStatus::Error => summary.errored += 1,
            }
        }
        summary
    }

    pub fn has_failures(&self) -> bool {
        self.results
            .iter()
            .any(|entry| entry.result.status != CheckStatus::Passed)
    }
}
