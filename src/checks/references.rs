//! # Cable Reference Integrity Check
//!
//! ## Purpose
//! Verifies that every cable piece references an existing cable: for each
//! cable family (Feeder, Drop, Distribution, PrimDistribution) the pieces
//! layer's `CABLE_ID` values must resolve in the family's cables layer.
//!
//! ## Result Shape
//! - `null_reference` for pieces with an empty reference, distinct from
//! - `dangling_reference` for non-empty references that do not resolve
//! - Families absent from the export entirely are skipped with a note;
//!   a family with only one of its two layers present is a processing error

use super::{record_label, CheckContext};
use crate::report::{CheckError, CheckResult, IssueDetail};
use crate::workspace::CableFamily;
use serde_json::json;
use std::collections::BTreeSet;

pub(crate) fn run(ctx: &CheckContext) -> CheckResult {
    let mut builder = ctx.builder();
    let mut skipped: Vec<&str> = Vec::new();
    let mut checked_families = 0u64;

    for family in CableFamily::ALL {
        let cables_id = family.cables();
        let pieces_id = family.pieces();
        let cables_present = ctx.workspace.has_layer(cables_id);
        let pieces_present = ctx.workspace.has_layer(pieces_id);

        if !cables_present && !pieces_present {
            skipped.push(family.name());
            continue;
        }
        if cables_present != pieces_present {
            let (present, absent) = if cables_present {
                (cables_id, pieces_id)
            } else {
                (pieces_id, cables_id)
            };
            builder.error(CheckError::new(
                "layer_not_found",
                format!(
                    "{} family is incomplete: {} present but {} missing",
                    family.name(),
                    present.name(),
                    absent.name()
                ),
            ));
            continue;
        }

        let cables = match ctx.workspace.load(cables_id) {
            Ok(layer) => layer,
            Err(err) => {
                builder.error(CheckError::from(&err));
                continue;
            }
        };
        let pieces = match ctx.workspace.load(pieces_id) {
            Ok(layer) => layer,
            Err(err) => {
                builder.error(CheckError::from(&err));
                continue;
            }
        };
        if let Err(err) = cables
            .require_columns(&["CABLE_ID"])
            .and_then(|_| pieces.require_columns(&["CABLE_ID"]))
        {
            builder.error(CheckError::from(&err));
            continue;
        }

        checked_families += 1;
        let valid_ids: BTreeSet<String> = cables
            .records()
            .iter()
            .map(|r| r.attr("CABLE_ID"))
            .filter(|v| !v.is_empty())
            .map(|v| v.display())
            .collect();

        let mut dangling_seen: BTreeSet<String> = BTreeSet::new();
        for (index, record) in pieces.records().iter().enumerate() {
            let reference = record.attr("CABLE_ID");
            if reference.is_empty() {
                builder.detail(IssueDetail::NullReference {
                    layer: pieces.name().to_string(),
                    record_id: record_label(record, &["ID"], index),
                });
            } else if !valid_ids.contains(&reference.display()) {
                let value = reference.display();
                if dangling_seen.insert(value.clone()) {
                    builder.sample(json!({
                        "family": family.name(),
                        "cable_id": value,
                    }));
                }
                builder.detail(IssueDetail::DanglingReference {
                    layer: pieces.name().to_string(),
                    record_id: record_label(record, &["ID"], index),
                    reference: value,
                });
            }
        }
    }

    builder.metric("checked_families", checked_families);
    if !skipped.is_empty() {
        builder.message(format!(
            "Families not present in this export were skipped: {}",
            skipped.join(", ")
        ));
    }

    builder.finish()
}
