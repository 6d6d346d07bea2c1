//! # Workspace Structure Check
//!
//! ## Purpose
//! Pre-flight structural pass over the whole export: every expected layer
//! present, required columns in place, geometries non-null, coordinate
//! systems consistent, and feeder cables carrying populated identifiers.
//!
//! This check is a gate for humans, not for the engine: the targeted checks
//! never depend on its outcome and run regardless of what it reports.

use super::{record_label, CheckContext};
use crate::report::{CheckError, CheckResult, IssueDetail};
use crate::workspace::{ensure_consistent_crs, Layer, LayerId};

const LABEL_KEYS: [&str; 5] = ["ID", "CABLE_ID", "EQ_ID", "AGG_ID", "CAB_GROUP"];

pub(crate) fn run(ctx: &CheckContext) -> CheckResult {
    let mut builder = ctx.builder();
    let mut loaded: Vec<Layer> = Vec::new();
    let mut layers_present = 0u64;
    let mut optional_absent = 0u64;
    let mut records_total = 0u64;

    for layer_id in LayerId::ALL {
        if !ctx.workspace.has_layer(layer_id) {
            if layer_id.is_required() {
                builder.detail(IssueDetail::MissingLayer {
                    layer: layer_id.name().to_string(),
                });
            } else {
                optional_absent += 1;
            }
            continue;
        }

        let layer = match ctx.workspace.load(layer_id) {
            Ok(layer) => layer,
            Err(err) => {
                // a broken layer must not stop the rest of the pass
                builder.error(CheckError::from(&err));
                continue;
            }
        };

        layers_present += 1;
        records_total += layer.len() as u64;

        for column in layer_id.required_columns() {
            if !layer.has_column(column) {
                builder.detail(IssueDetail::MissingColumn {
                    layer: layer.name().to_string(),
                    column: column.to_string(),
                });
            }
        }

        for (index, record) in layer.records().iter().enumerate() {
            if record.geometry().is_none() {
                builder.detail(IssueDetail::EmptyGeometry {
                    layer: layer.name().to_string(),
                    record_id: record_label(record, &LABEL_KEYS, index),
                });
            }
        }

        if layer_id == LayerId::FeederCables && layer.has_column("IDENTIFIER") {
            for (index, record) in layer.records().iter().enumerate() {
                if record.attr("IDENTIFIER").is_empty() {
                    builder.detail(IssueDetail::EmptyIdentifier {
                        layer: layer.name().to_string(),
                        record_id: record_label(record, &["CABLE_ID"], index),
                    });
                }
            }
        }

        loaded.push(layer);
    }

    if let Err(err) = ensure_consistent_crs(loaded.iter()) {
        builder.error(CheckError::from(&err));
    }

    builder.metric("layers_present", layers_present);
    builder.metric("optional_layers_absent", optional_absent);
    builder.metric("records_total", records_total);

    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::CheckContext;
    use crate::config::Config;
    use crate::report::CheckStatus;
    use crate::workspace::fixtures::*;
    use crate::workspace::Workspace;
    use serde_json::json;
    use std::path::Path;

    fn cable(props: serde_json::Value) -> serde_json::Value {
        line_feature(props, json!([[0.0, 0.0], [1.0, 0.0]]))
    }

    fn run_on(dir: &Path) -> CheckResult {
        let workspace = Workspace::open(dir).unwrap();
        let config = Config::default();
        run(&CheckContext::new(&workspace, &config, None))
    }

    #[test]
    fn complete_workspace_passes() {
        let dir = tempfile::tempdir().unwrap();
        write_complete_workspace(dir.path());
        let result = run_on(dir.path());
        assert_eq!(result.status, CheckStatus::Passed);
        assert_eq!(result.summary.metrics.get("layers_present"), Some(&11));
    }

    #[test]
    fn missing_required_layer_is_a_finding() {
        let dir = tempfile::tempdir().unwrap();
        write_complete_workspace(dir.path());
        std::fs::remove_file(dir.path().join("OUT_Splices.geojson")).unwrap();
        let result = run_on(dir.path());
        assert_eq!(result.status, CheckStatus::Failed);
        assert!(result
            .details
            .iter()
            .any(|d| matches!(d, IssueDetail::MissingLayer { layer } if layer == "OUT_Splices")));
    }

    #[test]
    fn missing_column_and_empty_identifier_are_findings() {
        let dir = tempfile::tempdir().unwrap();
        write_complete_workspace(dir.path());
        write_layer(
            dir.path(),
            "OUT_FeederCables.geojson",
            json!([cable(json!({"CABLE_ID": 1, "IDENTIFIER": "", "DIAMETER": 9.6, "CABLEGRAN": 4}))]),
        );
        let result = run_on(dir.path());
        assert_eq!(result.status, CheckStatus::Failed);
        assert!(result.details.iter().any(|d| matches!(
            d,
            IssueDetail::MissingColumn { column, .. } if column == "BUNDLEGRAN"
        )));
        assert!(result.details.iter().any(|d| matches!(
            d,
            IssueDetail::EmptyIdentifier { record_id, .. } if record_id == "1"
        )));
    }

    #[test]
    fn null_geometries_are_findings() {
        let dir = tempfile::tempdir().unwrap();
        write_complete_workspace(dir.path());
        write_layer(
            dir.path(),
            "OUT_FeederPoints.geojson",
            json!([null_geometry_feature(json!({"ID": "F1"}))]),
        );
        let result = run_on(dir.path());
        assert_eq!(result.status, CheckStatus::Failed);
        assert!(result.details.iter().any(|d| matches!(
            d,
            IssueDetail::EmptyGeometry { layer, record_id } if layer == "OUT_FeederPoints" && record_id == "F1"
        )));
    }

    #[test]
    fn corrupt_layer_is_an_error_but_the_pass_continues() {
        let dir = tempfile::tempdir().unwrap();
        write_complete_workspace(dir.path());
        std::fs::write(dir.path().join("OUT_Splices.geojson"), "not json at all").unwrap();
        let result = run_on(dir.path());
        assert_eq!(result.status, CheckStatus::Error);
        // the other layers were still inspected
        assert_eq!(result.summary.metrics.get("layers_present"), Some(&10));
    }

    #[test]
    fn crs_disagreement_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_complete_workspace(dir.path());
        write_layer_with_crs(
            dir.path(),
            "OUT_FeederPoints.geojson",
            json!([point_feature(json!({"ID": "F1"}), 0.0, 0.0)]),
            Some("EPSG:31370"),
        );
        write_layer_with_crs(
            dir.path(),
            "OUT_PrimDistributionPoints.geojson",
            json!([point_feature(json!({"ID": "P1"}), 0.0, 0.0)]),
            Some("EPSG:4326"),
        );
        let result = run_on(dir.path());
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.errors[0].kind, "schema_error");
    }
}
