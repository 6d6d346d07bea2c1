//! # Non-Virtual Closure Validation
//!
//! ## Purpose
//! Applies the structural rules that hold for physical closures, each
//! violation tagged with its rule name:
//!
//! - `physical_layer`: closures on the PrimDistribution, Distribution, or
//!   Drop layers must never be flagged virtual
//! - `identifier_populated`: non-virtual closures must carry a non-empty
//!   `IDENTIFIER`

use super::{record_label, CheckContext};
use crate::report::{CheckResult, IssueDetail};
use crate::workspace::LayerId;
use serde_json::json;

/// Closure layers that always correspond to physical equipment
const PHYSICAL_LAYERS: [&str; 3] = ["PrimDistribution", "Distribution", "Drop"];

pub(crate) fn run(ctx: &CheckContext) -> CheckResult {
    let layer = match ctx.workspace.load(LayerId::Closures) {
        Ok(layer) => layer,
        Err(err) => return CheckResult::from_error(&err),
    };
    if let Err(err) = layer.require_columns(LayerId::Closures.required_columns()) {
        return CheckResult::from_error(&err);
    }

    let mut builder = ctx.builder();
    let mut physical_layer_violations = 0u64;
    let mut identifier_violations = 0u64;

    for (index, record) in layer.records().iter().enumerate() {
        let virtual_flag = record.integer("VIRTUAL");

        if virtual_flag == Some(1) {
            if let Some(closure_layer) = record.text("LAYER") {
                if PHYSICAL_LAYERS.contains(&closure_layer) {
                    physical_layer_violations += 1;
                    let record_id = record_label(record, &["EQ_ID", "ID"], index);
                    builder.sample(json!({
                        "rule": "physical_layer",
                        "eq_id": &record_id,
                        "layer": closure_layer,
                    }));
                    builder.detail(IssueDetail::RuleViolation {
                        rule: "physical_layer".to_string(),
                        layer: layer.name().to_string(),
                        record_id,
                        message: format!(
                            "{} closures must never be virtual",
                            closure_layer
                        ),
                    });
                }
            }
        }

        if virtual_flag == Some(0) && record.attr("IDENTIFIER").is_empty() {
            identifier_violations += 1;
            let record_id = record_label(record, &["EQ_ID", "ID"], index);
            builder.sample(json!({
                "rule": "identifier_populated",
                "eq_id": &record_id,
            }));
            builder.detail(IssueDetail::RuleViolation {
                rule: "identifier_populated".to_string(),
                layer: layer.name().to_string(),
                record_id,
                message: "non-virtual closure has an empty IDENTIFIER".to_string(),
            });
        }
    }

    builder.metric("physical_layer_violations", physical_layer_violations);
    builder.metric("identifier_violations", identifier_violations);
    if physical_layer_violations == 0 && identifier_violations == 0 {
        builder.message(
            "All PrimDistribution, Distribution, and Drop closures are non-virtual and identified",
        );
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

    fn closure(props: serde_json::Value) -> serde_json::Value {
        point_feature(props, 0.0, 0.0)
    }

    fn run_on(features: serde_json::Value) -> CheckResult {
        let dir = tempfile::tempdir().unwrap();
        write_layer(dir.path(), "OUT_Closures.geojson", features);
        let workspace = Workspace::open(dir.path()).unwrap();
        let config = Config::default();
        run(&CheckContext::new(&workspace, &config, None))
    }

    #[test]
    fn virtual_distribution_closure_violates_physical_layer_rule() {
        let result = run_on(json!([closure(json!({
            "ID": "C1", "EQ_ID": "EQ-7", "IDENTIFIER": "OFDC",
            "LAYER": "Distribution", "VIRTUAL": 1,
        }))]));

        assert_eq!(result.status, CheckStatus::Failed);
        assert!(matches!(
            &result.details[0],
            IssueDetail::RuleViolation { rule, record_id, .. }
                if rule == "physical_layer" && record_id == "EQ-7"
        ));
    }

    #[test]
    fn virtual_feeder_closure_is_allowed() {
        let result = run_on(json!([closure(json!({
            "ID": "C1", "EQ_ID": "EQ-1", "IDENTIFIER": "BE16",
            "LAYER": "Feeder", "VIRTUAL": 1,
        }))]));
        assert_eq!(result.status, CheckStatus::Passed);
    }

    #[test]
    fn physical_closure_without_identifier_is_flagged() {
        let result = run_on(json!([closure(json!({
            "ID": "C1", "EQ_ID": "EQ-2", "IDENTIFIER": "",
            "LAYER": "Drop", "VIRTUAL": 0,
        }))]));

        assert_eq!(result.status, CheckStatus::Failed);
        assert!(matches!(
            &result.details[0],
            IssueDetail::RuleViolation { rule, .. } if rule == "identifier_populated"
        ));
        assert_eq!(
            result.summary.metrics.get("identifier_violations"),
            Some(&1)
        );
    }

    #[test]
    fn compliant_closures_pass() {
        let result = run_on(json!([
            closure(json!({
                "ID": "C1", "EQ_ID": "EQ-1", "IDENTIFIER": "BE16",
                "LAYER": "Distribution", "VIRTUAL": 0,
            })),
            closure(json!({
                "ID": "C2", "EQ_ID": "EQ-2", "IDENTIFIER": "OFDC",
                "LAYER": "Drop", "VIRTUAL": 0,
            })),
        ]));
        assert_eq!(result.status, CheckStatus::Passed);
        assert!(result.summary.message.is_some());
    }

    #[test]
    fn missing_columns_are_an_error() {
        let result = run_on(json!([closure(json!({"ID": "C1"}))]));
        assert_eq!(result.status, CheckStatus::Error);
    }
}
