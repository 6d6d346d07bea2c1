//! # Duplicate Closure Identifier Check
//!
//! ## Purpose
//! Detects duplicated `ID` values in the closures layer (each represents one
//! optical splice closure, which must be uniquely identified).
//!
//! ## Result Shape
//! - One `duplicate_key` detail per duplicated identifier with its record count
//! - `summary.total_duplicates`: number of *distinct* duplicated identifiers
//! - Sample closures (`ID`, `IDENTIFIER`) capped at the configured bound

use super::CheckContext;
use crate::report::{CheckResult, IssueDetail};
use crate::workspace::LayerId;
use serde_json::json;
use std::collections::BTreeMap;

pub(crate) fn run(ctx: &CheckContext) -> CheckResult {
    let layer = match ctx.workspace.load(LayerId::Closures) {
        Ok(layer) => layer,
        Err(err) => return CheckResult::from_error(&err),
    };
    if let Err(err) = layer.require_columns(&["ID"]) {
        return CheckResult::from_error(&err);
    }

    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for record in layer.records() {
        let id = record.attr("ID");
        if !id.is_empty() {
            *counts.entry(id.display()).or_insert(0) += 1;
        }
    }

    let mut duplicated: Vec<(String, u64)> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .collect();
    // most-duplicated first, then by identifier for a stable order
    duplicated.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut builder = ctx.builder();
    builder.metric("total_duplicates", duplicated.len() as u64);

    if duplicated.is_empty() {
        builder.message("No duplicated OSC IDs found");
        return builder.finish();
    }

    for (id, duplicate_count) in &duplicated {
        builder.detail(IssueDetail::DuplicateKey {
            id: id.clone(),
            duplicate_count: *duplicate_count,
        });
    }

    // sample the offending closure records themselves
    let duplicated_ids: Vec<&str> = duplicated.iter().map(|(id, _)| id.as_str()).collect();
    for record in layer.records() {
        let id = record.attr("ID");
        if !id.is_empty() && duplicated_ids.contains(&id.display().as_str()) {
            builder.sample(json!({
                "ID": id.display(),
                "IDENTIFIER": record.attr("IDENTIFIER").display(),
            }));
        }
    }

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

    fn run_on(features: serde_json::Value) -> CheckResult {
        let dir = tempfile::tempdir().unwrap();
        write_layer(dir.path(), "OUT_Closures.geojson", features);
        let workspace = Workspace::open(dir.path()).unwrap();
        let config = Config::default();
        run(&CheckContext::new(&workspace, &config, None))
    }

    #[test]
    fn counts_distinct_duplicated_ids() {
        let result = run_on(json!([
            point_feature(json!({"ID": "A", "IDENTIFIER": "BE16"}), 0.0, 0.0),
            point_feature(json!({"ID": "A", "IDENTIFIER": "BE16"}), 1.0, 0.0),
            point_feature(json!({"ID": "B", "IDENTIFIER": "OFDC"}), 2.0, 0.0),
        ]));

        assert_eq!(result.status, CheckStatus::Failed);
        assert_eq!(result.summary.metrics.get("total_duplicates"), Some(&1));
        assert_eq!(
            result.details,
            vec![IssueDetail::DuplicateKey {
                id: "A".to_string(),
                duplicate_count: 2,
            }]
        );
        assert_eq!(result.summary.samples.len(), 2);
    }

    #[test]
    fn unique_ids_pass() {
        let result = run_on(json!([
            point_feature(json!({"ID": "A"}), 0.0, 0.0),
            point_feature(json!({"ID": "B"}), 1.0, 0.0),
        ]));
        assert_eq!(result.status, CheckStatus::Passed);
        assert!(result.details.is_empty());
        assert_eq!(result.summary.metrics.get("total_duplicates"), Some(&0));
    }

    #[test]
    fn missing_id_column_is_an_error() {
        let result = run_on(json!([point_feature(json!({"IDENTIFIER": "BE16"}), 0.0, 0.0)]));
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.errors[0].kind, "schema_error");
    }

    #[test]
    fn missing_layer_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::open(dir.path()).unwrap();
        let config = Config::default();
        let result = run(&CheckContext::new(&workspace, &config, None));
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.errors[0].kind, "layer_not_found");
    }
}
