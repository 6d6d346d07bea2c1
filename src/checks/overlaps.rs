//! # Cluster Overlap Check
//!
//! ## Purpose
//! Detects pairs of polygons that overlap with non-zero area within each
//! cluster layer. Touching edges alone are not an overlap. Candidate pairs
//! come from the broad-phase grid index; every candidate is confirmed with an
//! exact area-of-intersection test before it is reported.
//!
//! Pair ordering is canonical (lower record first), so each overlap is
//! reported exactly once.

use super::{record_label, CheckContext};
use crate::report::{CheckError, CheckResult, IssueDetail};
use crate::spatial::{GridIndex, QueryPredicate};
use crate::workspace::LayerId;
use geo::{Area, BooleanOps, Geometry, MultiPolygon};
use serde_json::json;

pub(crate) fn run(ctx: &CheckContext) -> CheckResult {
    let mut builder = ctx.builder();
    let mut skipped: Vec<&str> = Vec::new();
    let mut layers_checked = 0u64;

    for (layer_id, id_attr) in LayerId::CLUSTERS {
        if !ctx.workspace.has_layer(layer_id) {
            skipped.push(layer_id.name());
            continue;
        }
        let layer = match ctx.workspace.load(layer_id) {
            Ok(layer) => layer,
            Err(err) => {
                builder.error(CheckError::from(&err));
                continue;
            }
        };

        layers_checked += 1;
        let index = GridIndex::build(&layer);
        let records = layer.records();

        for (i, record) in records.iter().enumerate() {
            let geometry = match record.geometry() {
                Some(geometry) => geometry,
                None => continue,
            };
            let first = match to_multi_polygon(geometry) {
                Some(polygon) => polygon,
                None => continue,
            };

            for j in index.query(geometry, QueryPredicate::Intersects) {
                // canonical pair order: visit each (i, j) once with i < j
                if j <= i {
                    continue;
                }
                let other = match records[j].geometry().and_then(to_multi_polygon) {
                    Some(polygon) => polygon,
                    None => continue,
                };

                // narrow phase: exact intersection area
                let intersection_area = first.intersection(&other).unsigned_area();
                if intersection_area > 0.0 {
                    let first_id = record_label(record, &[id_attr], i);
                    let second_id = record_label(&records[j], &[id_attr], j);
                    builder.sample(json!({
                        "layer": layer.name(),
                        "first_id": &first_id,
                        "second_id": &second_id,
                    }));
                    builder.detail(IssueDetail::ClusterOverlap {
                        layer: layer.name().to_string(),
                        first_id,
                        second_id,
                        intersection_area,
                    });
                }
            }
        }
    }

    builder.metric("layers_checked", layers_checked);
    if !skipped.is_empty() {
        builder.message(format!(
            "Cluster layers not present in this export were skipped: {}",
            skipped.join(", ")
        ));
    }

    builder.finish()
}

fn to_multi_polygon(geometry: &Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(polygon) => Some(MultiPolygon::new(vec![polygon.clone()])),
        Geometry::MultiPolygon(multi) => Some(multi.clone()),
        _ => None,
    }
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

    fn run_on(features: serde_json::Value) -> CheckResult {
        let dir = tempfile::tempdir().unwrap();
        write_layer(dir.path(), "OUT_DropClusters.geojson", features);
        let workspace = Workspace::open(dir.path()).unwrap();
        let config = Config::default();
        run(&CheckContext::new(&workspace, &config, None))
    }

    #[test]
    fn overlapping_polygons_are_reported_once() {
        let result = run_on(json!([
            square_feature(json!({"AGG_ID": 1}), 0.0, 0.0, 2.0),
            square_feature(json!({"AGG_ID": 2}), 1.0, 1.0, 2.0),
        ]));

        assert_eq!(result.status, CheckStatus::Failed);
        assert_eq!(result.details.len(), 1);
        match &result.details[0] {
            IssueDetail::ClusterOverlap {
                first_id,
                second_id,
                intersection_area,
                ..
            } => {
                assert_eq!(first_id, "1");
                assert_eq!(second_id, "2");
                assert!((intersection_area - 1.0).abs() < 1e-9);
            }
            other => panic!("expected a cluster overlap, got {:?}", other),
        }
    }

    #[test]
    fn touching_edges_are_not_an_overlap() {
        let result = run_on(json!([
            square_feature(json!({"AGG_ID": 1}), 0.0, 0.0, 1.0),
            square_feature(json!({"AGG_ID": 2}), 1.0, 0.0, 1.0),
        ]));
        assert_eq!(result.status, CheckStatus::Passed);
        assert!(result.details.is_empty());
    }

    #[test]
    fn disjoint_polygons_pass() {
        let result = run_on(json!([
            square_feature(json!({"AGG_ID": 1}), 0.0, 0.0, 1.0),
            square_feature(json!({"AGG_ID": 2}), 5.0, 5.0, 1.0),
        ]));
        assert_eq!(result.status, CheckStatus::Passed);
    }

    #[test]
    fn absent_cluster_layers_are_skipped_with_a_note() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::open(dir.path()).unwrap();
        let config = Config::default();
        let result = run(&CheckContext::new(&workspace, &config, None));
        assert_eq!(result.status, CheckStatus::Passed);
        assert_eq!(result.summary.metrics.get("layers_checked"), Some(&0));
        assert!(result.summary.message.is_some());
    }

    #[test]
    fn three_mutual_overlaps_yield_three_pairs() {
        let result = run_on(json!([
            square_feature(json!({"AGG_ID": 1}), 0.0, 0.0, 3.0),
            square_feature(json!({"AGG_ID": 2}), 1.0, 1.0, 3.0),
            square_feature(json!({"AGG_ID": 3}), 2.0, 2.0, 3.0),
        ]));
        assert_eq!(result.status, CheckStatus::Failed);
        assert_eq!(result.details.len(), 3);
    }
}
