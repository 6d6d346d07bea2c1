//! # Tool-Assigned Identifier Validation
//!
//! ## Purpose
//! Validates `GISTOOL_ID` values on the used-segments layer:
//!
//! - populated values must match the configured pattern (`malformed_id`)
//! - populated values must be unique within the workspace (`duplicate_id`)
//! - AERIAL and BURIED segments must not carry one at all (`unexpected_id`);
//!   the planning tool only assigns identifiers to the remaining segment
//!   kinds

use super::{record_label, CheckContext};
use crate::report::{CheckError, CheckResult, IssueDetail};
use crate::workspace::LayerId;
use serde_json::json;
use std::collections::BTreeMap;

/// Segment kinds that must not carry a tool-assigned identifier
const BARE_SEGMENT_TYPES: [&str; 2] = ["AERIAL", "BURIED"];

pub(crate) fn run(ctx: &CheckContext) -> CheckResult {
    let layer = match ctx.workspace.load(LayerId::UsedSegments) {
        Ok(layer) => layer,
        Err(err) => return CheckResult::from_error(&err),
    };
    if let Err(err) = layer.require_columns(LayerId::UsedSegments.required_columns()) {
        return CheckResult::from_error(&err);
    }

    let mut builder = ctx.builder();
    let pattern = match regex::Regex::new(&ctx.config.checks.gistool_pattern) {
        Ok(pattern) => pattern,
        Err(e) => {
            builder.error(CheckError::new(
                "configuration",
                format!("invalid gistool_pattern: {}", e),
            ));
            return builder.finish();
        }
    };

    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    let mut populated = 0u64;

    for (index, record) in layer.records().iter().enumerate() {
        let value = record.attr("GISTOOL_ID");
        if value.is_empty() {
            continue;
        }
        populated += 1;
        let text = value.display();
        *counts.entry(text.clone()).or_insert(0) += 1;

        let record_id = record_label(record, &["ID"], index);
        if let Some(segment_type) = record.text("TYPE") {
            if BARE_SEGMENT_TYPES.contains(&segment_type) {
                builder.sample(json!({
                    "segment_id": &record_id,
                    "type": segment_type,
                    "gistool_id": &text,
                }));
                builder.detail(IssueDetail::UnexpectedId {
                    layer: layer.name().to_string(),
                    record_id: record_id.clone(),
                    segment_type: segment_type.to_string(),
                    value: text.clone(),
                });
            }
        }

        if !pattern.is_match(&text) {
            builder.detail(IssueDetail::MalformedId {
                layer: layer.name().to_string(),
                record_id,
                value: text,
            });
        }
    }

    for (value, count) in counts {
        if count > 1 {
            builder.detail(IssueDetail::DuplicateId {
                layer: layer.name().to_string(),
                value,
                count,
            });
        }
    }

    builder.metric("segments_total", layer.len() as u64);
    builder.metric("populated_ids", populated);

    builder.finish()
}
