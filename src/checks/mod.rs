//! # Check Registry Module
//!
//! ## Purpose
//! Fixed catalogue of the validation checks the engine can run. Each check is
//! a pure function of `(workspace, parameters) -> CheckResult`; the registry
//! maps canonical names to implementations and carries display metadata for
//! the report consumers.
//!
//! ## Input/Output Specification
//! - **Input**: Requested check names (canonical, lower snake case)
//! - **Output**: Resolved [`CheckKind`] values; unknown names are an input
//!   error raised before any layer is loaded
//!
//! ## Check Catalogue
//! - `osc_duplicates`: duplicated closure identifiers
//! - `cable_references`: cable piece to cable referential integrity
//! - `splice_counts`: splices per closure tabulation (informational)
//! - `cluster_overlaps`: overlapping polygons within cluster layers
//! - `granularity`: cable/bundle granularity domain validation
//! - `non_virtual_closures`: structural rules for physical closures
//! - `point_locations`: tolerance-based point coincidence/separation
//! - `cable_diameters`: diameters against the allowed set per family
//! - `gistool_ids`: tool-assigned identifier format and uniqueness
//! - `workspace_structure`: pre-flight structural pass over all layers

pub mod closures;
pub mod diameters;
pub mod duplicates;
pub mod gistool;
pub mod granularity;
pub mod locations;
pub mod overlaps;
pub mod references;
pub mod splices;
pub mod structure;

use crate::config::Config;
use crate::errors::{Result, ValidationError};
use crate::report::{CheckResult, ResultBuilder};
use crate::workspace::{FeatureRecord, Workspace};

/// Everything a check may read: the workspace, the configuration, and the
/// resolved per-request parameters. Checks share nothing mutable.
pub struct CheckContext<'a> {
    pub workspace: &'a Workspace,
    pub config: &'a Config,
    /// Distance tolerance for point matching, after caller override
    pub tolerance: f64,
}

impl<'a> CheckContext<'a> {
    pub fn new(workspace: &'a Workspace, config: &'a Config, tolerance: Option<f64>) -> Self {
        Self {
            workspace,
            config,
            tolerance: tolerance.unwrap_or(config.checks.tolerance),
        }
    }

    /// Result builder pre-configured with the summary sample cap
    pub fn builder(&self) -> ResultBuilder {
        ResultBuilder::new(self.config.engine.sample_cap)
    }
}

/// The fixed set of checks offered by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckKind {
    OscDuplicates,
    CableReferences,
    SpliceCounts,
    ClusterOverlaps,
    Granularity,
    NonVirtualClosures,
    PointLocations,
    CableDiameters,
    GistoolIds,
    WorkspaceStructure,
}

impl CheckKind {
    pub const ALL: [CheckKind; 10] = [
        CheckKind::OscDuplicates,
        CheckKind::CableReferences,
        CheckKind::SpliceCounts,
        CheckKind::ClusterOverlaps,
        CheckKind::Granularity,
        CheckKind::NonVirtualClosures,
        CheckKind::PointLocations,
        CheckKind::CableDiameters,
        CheckKind::GistoolIds,
        CheckKind::WorkspaceStructure,
    ];

    /// Canonical registry name
    pub fn name(&self) -> &'static str {
        match self {
            CheckKind::OscDuplicates => "osc_duplicates",
            CheckKind::CableReferences => "cable_references",
            CheckKind::SpliceCounts => "splice_counts",
            CheckKind::ClusterOverlaps => "cluster_overlaps",
            CheckKind::Granularity => "granularity",
            CheckKind::NonVirtualClosures => "non_virtual_closures",
            CheckKind::PointLocations => "point_locations",
            CheckKind::CableDiameters => "cable_diameters",
            CheckKind::GistoolIds => "gistool_ids",
            CheckKind::WorkspaceStructure => "workspace_structure",
        }
    }

    /// Human-readable title used by report consumers
    pub fn title(&self) -> &'static str {
        match self {
            CheckKind::OscDuplicates => "OSC Duplicates Check",
            CheckKind::CableReferences => "Cable Reference Validation",
            CheckKind::SpliceCounts => "Splice Count Report",
            CheckKind::ClusterOverlaps => "Cluster Overlap Check",
            CheckKind::Granularity => "Cable Granularity Check",
            CheckKind::NonVirtualClosures => "Non-virtual Closure Validation",
            CheckKind::PointLocations => "Point Location Validation",
            CheckKind::CableDiameters => "Cable Diameter Validation",
            CheckKind::GistoolIds => "GISTOOL_ID Validation",
            CheckKind::WorkspaceStructure => "Shapefile Processing",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CheckKind::OscDuplicates => "Detect duplicated ID values in the closures layer",
            CheckKind::CableReferences => {
                "Verify every cable piece references an existing cable in its family"
            }
            CheckKind::SpliceCounts => {
                "Tabulate splices per closure against the capacity of each closure type"
            }
            CheckKind::ClusterOverlaps => {
                "Detect polygon pairs overlapping with non-zero area within each cluster layer"
            }
            CheckKind::Granularity => {
                "Validate cable and bundle granularity values against the allowed domain"
            }
            CheckKind::NonVirtualClosures => {
                "Apply structural rules that hold for physical (non-virtual) closures"
            }
            CheckKind::PointLocations => {
                "Match feeder points to primary distribution points within tolerance and keep \
                 distribution points clear of primary distribution points"
            }
            CheckKind::CableDiameters => {
                "Validate cable diameters against the allowed set per cable family"
            }
            CheckKind::GistoolIds => {
                "Validate tool-assigned segment identifiers: format, uniqueness, and placement"
            }
            CheckKind::WorkspaceStructure => {
                "Pre-flight structural pass: layer presence, schema completeness, geometry"
            }
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    /// Run this check against the context. Never panics by contract; the
    /// engine still guards the boundary.
    pub fn run(&self, ctx: &CheckContext) -> CheckResult {
        match self {
            CheckKind::OscDuplicates => duplicates::run(ctx),
            CheckKind::CableReferences => references::run(ctx),
            CheckKind::SpliceCounts => splices::run(ctx),
            CheckKind::ClusterOverlaps => overlaps::run(ctx),
            CheckKind::Granularity => granularity::run(ctx),
            CheckKind::NonVirtualClosures => closures::run(ctx),
            CheckKind::PointLocations => locations::run(ctx),
            CheckKind::CableDiameters => diameters::run(ctx),
            CheckKind::GistoolIds => gistool::run(ctx),
            CheckKind::WorkspaceStructure => structure::run(ctx),
        }
    }
}

/// Resolve requested names against the registry. The full catalogue is
/// returned when the request is empty; an unknown name rejects the whole
/// request before any layer I/O.
pub fn resolve(names: &[String]) -> Result<Vec<CheckKind>> {
    if names.is_empty() {
        return Ok(CheckKind::ALL.to_vec());
    }
    names
        .iter()
        .map(|name| {
            CheckKind::from_name(name).ok_or_else(|| ValidationError::UnknownCheck {
                name: name.clone(),
            })
        })
        .collect()
}

/// Label a record by the first populated attribute among `keys`, falling
/// back to its position in the layer.
pub(crate) fn record_label(record: &FeatureRecord, keys: &[&str], index: usize) -> String {
    for key in keys {
        let value = record.attr(key);
        if !value.is_empty() {
            return value.display();
        }
    }
    format!("record {}", index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_check_resolves_by_name() {
        for kind in CheckKind::ALL {
            assert_eq!(CheckKind::from_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn unknown_name_is_an_input_error() {
        let err = resolve(&["definitely_not_a_check".to_string()]).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn empty_request_means_all_checks() {
        let resolved = resolve(&[]).unwrap();
        assert_eq!(resolved.len(), CheckKind::ALL.len());
    }
}
