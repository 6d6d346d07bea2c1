//! # Cable Granularity Check
//!
//! ## Purpose
//! Validates the `CABLEGRAN` and `BUNDLEGRAN` attributes of every cable
//! layer against the allowed domain: values below the configured minimum,
//! notably the export's `-1` sentinel, are design errors.

use super::{record_label, CheckContext};
use crate::report::{CheckError, CheckResult, IssueDetail};
use crate::workspace::CableFamily;
use serde_json::json;

const GRANULARITY_FIELDS: [&str; 2] = ["CABLEGRAN", "BUNDLEGRAN"];

pub(crate) fn run(ctx: &CheckContext) -> CheckResult {
    let mut builder = ctx.builder();
    let min = ctx.config.checks.min_granularity;
    let allowed = format!(">= {}", min);
    let mut skipped: Vec<&str> = Vec::new();
    let mut layers_checked = 0u64;

    for family in CableFamily::ALL {
        let layer_id = family.cables();
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
        if let Err(err) = layer.require_columns(&GRANULARITY_FIELDS) {
            builder.error(CheckError::from(&err));
            continue;
        }

        layers_checked += 1;
        for (index, record) in layer.records().iter().enumerate() {
            for field in GRANULARITY_FIELDS {
                let value = record.attr(field);
                if let Some(observed) = value.as_f64() {
                    if observed < min as f64 {
                        let record_id = record_label(record, &["CABLE_ID"], index);
                        builder.sample(json!({
                            "layer": layer.name(),
                            "cable_id": &record_id,
                            "field": field,
                            "observed": observed,
                        }));
                        builder.detail(IssueDetail::OutOfDomain {
                            layer: layer.name().to_string(),
                            record_id,
                            field: field.to_string(),
                            observed: value.display(),
                            allowed: allowed.clone(),
                        });
                    }
                }
            }
        }
    }

    builder.metric("layers_checked", layers_checked);
    if !skipped.is_empty() {
        builder.message(format!(
            "Cable layers not present in this export were skipped: {}",
            skipped.join(", ")
        ));
    }

    builder.finish()
}
