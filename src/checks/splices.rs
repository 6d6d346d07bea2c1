//! # Splice Count Report
//!
//! ## Purpose
//! Informational tabulation of splices per closure, joined against the
//! configured splice capacity of each closure type. This check has no failure
//! concept: its status is `Passed` unless a processing error occurs, and its
//! payload is a single table-shaped detail.

use super::CheckContext;
use crate::report::{CheckResult, IssueDetail};
use crate::workspace::LayerId;
use std::collections::BTreeMap;

pub(crate) fn run(ctx: &CheckContext) -> CheckResult {
    let closures = match ctx.workspace.load(LayerId::Closures) {
        Ok(layer) => layer,
        Err(err) => return CheckResult::from_error(&err),
    };
    let splices = match ctx.workspace.load(LayerId::Splices) {
        Ok(layer) => layer,
        Err(err) => return CheckResult::from_error(&err),
    };
    if let Err(err) = closures
        .require_columns(&["ID", "IDENTIFIER"])
        .and_then(|_| splices.require_columns(&["ID"]))
    {
        return CheckResult::from_error(&err);
    }

    // splices carry the ID of the closure they belong to
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for record in splices.records() {
        let closure_id = record.attr("ID");
        if !closure_id.is_empty() {
            *counts.entry(closure_id.display()).or_insert(0) += 1;
        }
    }

    let capacities = &ctx.config.checks.splice_capacities;
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(closures.len());
    let mut over_capacity = 0u64;

    for record in closures.records() {
        let identifier = record.attr("IDENTIFIER");
        let closure_type = if identifier.is_empty() {
            "N/A".to_string()
        } else {
            identifier.display()
        };
        let closure_id = record.attr("ID").display();
        let splice_count = counts.get(&closure_id).copied().unwrap_or(0);

        let capacity = capacities.get(&closure_type).copied();
        let note = match capacity {
            Some(limit) if splice_count > limit => {
                over_capacity += 1;
                format!("exceeds the maximum of {} splices", limit)
            }
            _ => String::new(),
        };

        rows.push(vec![
            closure_type,
            closure_id,
            splice_count.to_string(),
            capacity.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()),
            note,
        ]);
    }

    let mut builder = ctx.builder();
    builder.metric("closures_total", closures.len() as u64);
    builder.metric("splices_total", splices.len() as u64);
    builder.metric("over_capacity", over_capacity);
    if over_capacity > 0 {
        builder.message(format!(
            "{} closure(s) exceed their maximum splice count",
            over_capacity
        ));
    } else {
        builder.message("All closures are within their maximum splice limits");
    }
    builder.info(IssueDetail::Table {
        headers: vec![
            "closure_type".to_string(),
            "closure_id".to_string(),
            "splice_count".to_string(),
            "capacity".to_string(),
            "note".to_string(),
        ],
        rows,
    });

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

    fn run_on(closures: serde_json::Value, splices: serde_json::Value) -> CheckResult {
        let dir = tempfile::tempdir().unwrap();
        write_layer(dir.path(), "OUT_Closures.geojson", closures);
        write_layer(dir.path(), "OUT_Splices.geojson", splices);
        let workspace = Workspace::open(dir.path()).unwrap();
        let config = Config::default();
        run(&CheckContext::new(&workspace, &config, None))
    }

    #[test]
    fn tabulates_splices_per_closure() {
        let result = run_on(
            json!([
                point_feature(json!({"ID": "C1", "IDENTIFIER": "OFDC"}), 0.0, 0.0),
                point_feature(json!({"ID": "C2", "IDENTIFIER": "BE16"}), 1.0, 0.0),
            ]),
            json!([
                point_feature(json!({"ID": "C1"}), 0.0, 0.0),
                point_feature(json!({"ID": "C1"}), 0.0, 0.1),
            ]),
        );

        assert_eq!(result.status, CheckStatus::Passed);
        assert_eq!(result.summary.total_issues, 0);
        match &result.details[0] {
            IssueDetail::Table { headers, rows } => {
                assert_eq!(headers.len(), 5);
                assert_eq!(rows[0], vec!["OFDC", "C1", "2", "96", ""]);
                assert_eq!(rows[1][2], "0");
            }
            other => panic!("expected a table payload, got {:?}", other),
        }
    }

    #[test]
    fn over_capacity_is_noted_but_still_passes() {
        let splices: Vec<serde_json::Value> = (0..9)
            .map(|i| point_feature(json!({"ID": "C1"}), i as f64, 0.0))
            .collect();
        let result = run_on(
            json!([point_feature(json!({"ID": "C1", "IDENTIFIER": "POC_UG_1-8HP"}), 0.0, 0.0)]),
            serde_json::Value::Array(splices),
        );

        // informational check: over-capacity closures do not fail it
        assert_eq!(result.status, CheckStatus::Passed);
        assert_eq!(result.summary.metrics.get("over_capacity"), Some(&1));
        match &result.details[0] {
            IssueDetail::Table { rows, .. } => {
                assert!(rows[0][4].contains("maximum of 8"));
            }
            other => panic!("expected a table payload, got {:?}", other),
        }
    }

    #[test]
    fn missing_splice_layer_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_layer(
            dir.path(),
            "OUT_Closures.geojson",
            json!([point_feature(json!({"ID": "C1", "IDENTIFIER": "OFDC"}), 0.0, 0.0)]),
        );
        let workspace = Workspace::open(dir.path()).unwrap();
        let config = Config::default();
        let result = run(&CheckContext::new(&workspace, &config, None));
        assert_eq!(result.status, CheckStatus::Error);
    }
}
