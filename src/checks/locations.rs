//! # Point Location Validation
//!
//! ## Purpose
//! Tolerance-based validation of critical point locations, in two parts with
//! explicit directionality:
//!
//! - **Feeder matching (A→B only)**: every feeder point must have a primary
//!   distribution point within `tolerance`. A feeder point whose nearest
//!   primary point is farther than the tolerance is reported once, with both
//!   the coordinates and the measured distance. Primary points with no nearby
//!   feeder point are intentionally not reported from the other direction.
//! - **Distribution separation**: a distribution point lying within
//!   `tolerance` of any primary distribution point is reported once (first
//!   conflicting primary point named).
//!
//! The `tolerance` parameter is in coordinate system units (default 0.01)
//! and can be overridden per request.

use super::{record_label, CheckContext};
use crate::report::{CheckError, CheckResult, IssueDetail};
use crate::spatial::{GridIndex, QueryPredicate};
use crate::workspace::{ensure_consistent_crs, Layer, LayerId};
use geo::{EuclideanDistance, Point};
use serde_json::json;

pub(crate) fn run(ctx: &CheckContext) -> CheckResult {
    let tolerance = ctx.tolerance;

    let feeder = match ctx.workspace.load(LayerId::FeederPoints) {
        Ok(layer) => layer,
        Err(err) => return CheckResult::from_error(&err),
    };
    let primary = match ctx.workspace.load(LayerId::PrimDistributionPoints) {
        Ok(layer) => layer,
        Err(err) => return CheckResult::from_error(&err),
    };
    if let Err(err) = ensure_consistent_crs([&feeder, &primary]) {
        return CheckResult::from_error(&err);
    }

    let mut builder = ctx.builder();

    if primary.is_empty() {
        builder.error(CheckError::new(
            "schema_error",
            format!(
                "{} is empty; feeder points cannot be matched",
                primary.name()
            ),
        ));
        return builder.finish();
    }

    let primary_points: Vec<Option<Point<f64>>> =
        primary.records().iter().map(|r| r.point()).collect();
    let index = GridIndex::build(&primary);

    // Part 1: every feeder point needs a primary point within tolerance
    let mut unmatched = 0u64;
    for (i, record) in feeder.records().iter().enumerate() {
        let point = match record.point() {
            Some(point) => point,
            None => continue,
        };

        let candidates = index.query(
            &geo::Geometry::Point(point),
            QueryPredicate::WithinDistance(tolerance),
        );
        let nearest_candidate = candidates
            .iter()
            .filter_map(|&j| primary_points[j].map(|q| point.euclidean_distance(&q)))
            .fold(None::<f64>, |best, d| {
                Some(best.map_or(d, |b: f64| b.min(d)))
            });

        let matched = nearest_candidate.is_some_and(|d| d <= tolerance);
        if !matched {
            // the window held nothing close enough; scan for the true
            // nearest so the report carries a useful distance
            let nearest_distance = primary_points
                .iter()
                .flatten()
                .map(|q| point.euclidean_distance(q))
                .fold(None::<f64>, |best, d| {
                    Some(best.map_or(d, |b: f64| b.min(d)))
                });

            unmatched += 1;
            let record_id = record_label(record, &["ID"], i);
            builder.sample(json!({
                "feeder_id": &record_id,
                "x": point.x(),
                "y": point.y(),
                "nearest_distance": nearest_distance,
            }));
            builder.detail(IssueDetail::UnmatchedPoint {
                layer: feeder.name().to_string(),
                record_id,
                x: point.x(),
                y: point.y(),
                nearest_distance,
                tolerance,
            });
        }
    }

    // Part 2: distribution points must stay clear of primary points
    let mut conflicts = 0u64;
    match load_optional(ctx, LayerId::DistributionPoints) {
        None => {
            builder.message(format!(
                "{} not present in this export; separation part skipped",
                LayerId::DistributionPoints.name()
            ));
        }
        Some(Err(err)) => {
            builder.error(CheckError::from(&err));
        }
        Some(Ok(distribution)) => {
            if let Err(err) = ensure_consistent_crs([&distribution, &primary]) {
                builder.error(CheckError::from(&err));
            } else {
                for (i, record) in distribution.records().iter().enumerate() {
                    let point = match record.point() {
                        Some(point) => point,
                        None => continue,
                    };
                    let candidates = index.query(
                        &geo::Geometry::Point(point),
                        QueryPredicate::WithinDistance(tolerance),
                    );
                    // one conflict per distribution point is enough
                    let hit = candidates.iter().find_map(|&j| {
                        primary_points[j].and_then(|q| {
                            let distance = point.euclidean_distance(&q);
                            (distance < tolerance).then_some((j, distance))
                        })
                    });
                    if let Some((j, distance)) = hit {
                        conflicts += 1;
                        builder.detail(IssueDetail::PointProximity {
                            layer: distribution.name().to_string(),
                            record_id: record_label(record, &["ID"], i),
                            x: point.x(),
                            y: point.y(),
                            other_layer: primary.name().to_string(),
                            other_id: record_label(&primary.records()[j], &["ID"], j),
                            distance,
                            tolerance,
                        });
                    }
                }
            }
        }
    }

    builder.metric("feeder_points", feeder.len() as u64);
    builder.metric("unmatched_feeder_points", unmatched);
    builder.metric("proximity_conflicts", conflicts);

    builder.finish()
}

fn load_optional(
    ctx: &CheckContext,
    id: LayerId,
) -> Option<crate::errors::Result<Layer>> {
    if ctx.workspace.has_layer(id) {
        Some(ctx.workspace.load(id))
    } else {
        None
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
    use std::path::Path;

    fn points(ids: &[(&str, f64, f64)]) -> serde_json::Value {
        serde_json::Value::Array(
            ids.iter()
                .map(|(id, x, y)| point_feature(json!({"ID": id}), *x, *y))
                .collect(),
        )
    }

    fn run_with(dir: &Path, tolerance: Option<f64>) -> CheckResult {
        let workspace = Workspace::open(dir).unwrap();
        let config = Config::default();
        run(&CheckContext::new(&workspace, &config, tolerance))
    }

    #[test]
    fn exact_matches_pass_with_default_tolerance() {
        let dir = tempfile::tempdir().unwrap();
        write_layer(
            dir.path(),
            "OUT_FeederPoints.geojson",
            points(&[("F1", 0.0, 0.0), ("F2", 10.0, 10.0)]),
        );
        write_layer(
            dir.path(),
            "OUT_PrimDistributionPoints.geojson",
            points(&[("P1", 0.0, 0.0), ("P2", 10.0, 10.0)]),
        );

        let result = run_with(dir.path(), None);
        assert_eq!(result.status, CheckStatus::Passed);
        assert!(result.details.is_empty());
    }

    #[test]
    fn far_feeder_point_is_unmatched_with_measured_distance() {
        let dir = tempfile::tempdir().unwrap();
        write_layer(dir.path(), "OUT_FeederPoints.geojson", points(&[("F1", 0.0, 0.0)]));
        write_layer(
            dir.path(),
            "OUT_PrimDistributionPoints.geojson",
            points(&[("P1", 3.0, 4.0)]),
        );

        let result = run_with(dir.path(), None);
        assert_eq!(result.status, CheckStatus::Failed);
        match &result.details[0] {
            IssueDetail::UnmatchedPoint {
                record_id,
                nearest_distance,
                ..
            } => {
                assert_eq!(record_id, "F1");
                assert!((nearest_distance.unwrap() - 5.0).abs() < 1e-9);
            }
            other => panic!("expected an unmatched point, got {:?}", other),
        }
    }

    #[test]
    fn decreasing_tolerance_only_adds_flagged_points() {
        let dir = tempfile::tempdir().unwrap();
        write_layer(dir.path(), "OUT_FeederPoints.geojson", points(&[("F1", 0.0, 0.0)]));
        write_layer(
            dir.path(),
            "OUT_PrimDistributionPoints.geojson",
            points(&[("P1", 1.0, 0.0)]),
        );

        let loose = run_with(dir.path(), Some(2.0));
        assert_eq!(loose.status, CheckStatus::Passed);

        let tight = run_with(dir.path(), Some(0.5));
        assert_eq!(tight.status, CheckStatus::Failed);
        assert_eq!(tight.summary.metrics.get("unmatched_feeder_points"), Some(&1));
    }

    #[test]
    fn distribution_point_on_primary_point_is_a_conflict() {
        let dir = tempfile::tempdir().unwrap();
        write_layer(dir.path(), "OUT_FeederPoints.geojson", points(&[("F1", 5.0, 5.0)]));
        write_layer(
            dir.path(),
            "OUT_PrimDistributionPoints.geojson",
            points(&[("P1", 5.0, 5.0)]),
        );
        write_layer(
            dir.path(),
            "OUT_DistributionPoints.geojson",
            points(&[("D1", 5.0, 5.0), ("D2", 9.0, 9.0)]),
        );

        let result = run_with(dir.path(), None);
        assert_eq!(result.status, CheckStatus::Failed);
        assert_eq!(result.details.len(), 1);
        match &result.details[0] {
            IssueDetail::PointProximity {
                record_id,
                other_id,
                distance,
                ..
            } => {
                assert_eq!(record_id, "D1");
                assert_eq!(other_id, "P1");
                assert_eq!(*distance, 0.0);
            }
            other => panic!("expected a proximity conflict, got {:?}", other),
        }
    }

    #[test]
    fn missing_primary_layer_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_layer(dir.path(), "OUT_FeederPoints.geojson", points(&[("F1", 0.0, 0.0)]));
        let result = run_with(dir.path(), None);
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.errors[0].kind, "layer_not_found");
    }

    #[test]
    fn empty_primary_layer_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_layer(dir.path(), "OUT_FeederPoints.geojson", points(&[("F1", 0.0, 0.0)]));
        write_layer(dir.path(), "OUT_PrimDistributionPoints.geojson", json!([]));
        let result = run_with(dir.path(), None);
        assert_eq!(result.status, CheckStatus::Error);
    }

    #[test]
    fn crs_mismatch_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_layer_with_crs(
            dir.path(),
            "OUT_FeederPoints.geojson",
            points(&[("F1", 0.0, 0.0)]),
            Some("EPSG:31370"),
        );
        write_layer_with_crs(
            dir.path(),
            "OUT_PrimDistributionPoints.geojson",
            points(&[("P1", 0.0, 0.0)]),
            Some("EPSG:4326"),
        );
        let result = run_with(dir.path(), None);
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.errors[0].kind, "schema_error");
    }
}
