//! # Cable Diameter Validation
//!
//! ## Purpose
//! Validates every cable's `DIAMETER` against the allowed set configured for
//! its family. A diameter outside the set is a design violation; a missing or
//! non-numeric diameter is malformed input and contributes to the check's
//! `errors`, not its findings.

use super::{record_label, CheckContext};
use crate::report::{CheckError, CheckResult, IssueDetail};
use crate::workspace::CableFamily;
use serde_json::json;

const DIAMETER_EPSILON: f64 = 1e-6;

pub(crate) fn run(ctx: &CheckContext) -> CheckResult {
    let mut builder = ctx.builder();
    let mut skipped: Vec<&str> = Vec::new();
    let mut layers_checked = 0u64;
    let mut cables_checked = 0u64;

    for family in CableFamily::ALL {
        let allowed = match ctx.config.checks.allowed_diameters.get(family.name()) {
            Some(allowed) => allowed,
            None => continue,
        };
        let layer_id = family.cables();

        if !ctx.workspace.has_layer(layer_id) {
            if layer_id.is_required() {
                builder.error(CheckError::new(
                    "layer_not_found",
                    format!("{} not found in workspace", layer_id.name()),
                ));
            } else {
                skipped.push(layer_id.name());
            }
            continue;
        }
        let layer = match ctx.workspace.load(layer_id) {
            Ok(layer) => layer,
            Err(err) => {
                builder.error(CheckError::from(&err));
                continue;
            }
        };
        if let Err(err) = layer.require_columns(&["DIAMETER"]) {
            builder.error(CheckError::from(&err));
            continue;
        }

        layers_checked += 1;
        for (index, record) in layer.records().iter().enumerate() {
            cables_checked += 1;
            let value = record.attr("DIAMETER");
            let record_id = record_label(record, &["CABLE_ID"], index);

            match value.as_f64() {
                None => {
                    // malformed input, not a design violation
                    builder.error(CheckError::new(
                        "malformed_input",
                        format!(
                            "{}: cable {} has a missing or non-numeric DIAMETER ({})",
                            layer.name(),
                            record_id,
                            value.display()
                        ),
                    ));
                }
                Some(observed) => {
                    let in_set = allowed
                        .iter()
                        .any(|d| (d - observed).abs() <= DIAMETER_EPSILON);
                    if !in_set {
                        builder.sample(json!({
                            "layer": layer.name(),
                            "cable_id": &record_id,
                            "observed": observed,
                        }));
                        builder.detail(IssueDetail::InvalidDiameter {
                            layer: layer.name().to_string(),
                            record_id,
                            observed,
                            allowed: allowed.clone(),
                        });
                    }
                }
            }
        }
    }

    builder.metric("layers_checked", layers_checked);
    builder.metric("cables_checked", cables_checked);
    if !skipped.is_empty() {
        builder.message(format!(
            "Cable layers not present in this export were skipped: {}",
            skipped.join(", ")
        ));
    }

    builder.finish()
}
