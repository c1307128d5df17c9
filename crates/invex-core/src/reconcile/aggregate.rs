//! Invoice-level reconciliation: runs the line pass and summarizes the
//! results against header-declared totals.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::str::FromStr;
use tracing::{info, warn};

use super::line::{LineReconciler, LineStatus, TOLERANCE};
use super::normalize::insert_decimal_point;
use crate::models::output::ExtractionOutput;
use crate::models::report::{QtyStatus, ReconciliationReport};
use crate::template::{CorrectionPriority, DecimalSpec};

/// Sentinel for "no declared item count", distinct from "all accounted for".
const MISSED_UNKNOWN: i64 = -1;

/// Reconcile an extraction output in place and report the findings.
///
/// Every line is normalized, repaired, and checked independently; the header
/// `totalqty` gets its decimal point restored with its own precision. The
/// aggregate pass itself only reads the per-line results.
pub fn reconcile(
    output: &mut ExtractionOutput,
    decimals: &DecimalSpec,
    priority: CorrectionPriority,
) -> ReconciliationReport {
    let reconciler = LineReconciler::new(decimals).with_priority(priority);

    let mut corrected_count = 0u32;
    let mut issue_lines = Vec::new();
    let mut qty_sum = Decimal::ZERO;

    for (index, line) in output.lines.iter_mut().enumerate() {
        match reconciler.reconcile(index, line) {
            LineStatus::Match => {}
            LineStatus::Corrected => corrected_count += 1,
            LineStatus::Mismatch => issue_lines.push(index),
        }
        if let Some(qty) = line.qty.as_deref().and_then(|q| Decimal::from_str(q).ok()) {
            qty_sum += qty;
        }
    }

    let traversed = output.lines.len() as i64;
    let missed_count = match output.noofitem {
        Some(declared) => declared.trunc().to_i64().unwrap_or(0) - traversed,
        None => MISSED_UNKNOWN,
    };
    if missed_count > 0 {
        warn!(
            declared = %output.noofitem.unwrap_or_default(),
            traversed,
            "parser traversed fewer lines than the invoice declares"
        );
    }

    let qty_status = match output.totalqty.as_mut() {
        Some(declared) => {
            *declared = insert_decimal_point(declared, decimals.totalqty);
            match Decimal::from_str(declared) {
                Ok(expected) if (expected - qty_sum).abs() <= TOLERANCE => QtyStatus::Match,
                Ok(expected) => {
                    warn!(%expected, summed = %qty_sum, "total quantity does not reconcile");
                    QtyStatus::NoMatch
                }
                Err(_) => {
                    warn!(declared = %declared, "declared total quantity is not numeric");
                    QtyStatus::NoMatch
                }
            }
        }
        None => QtyStatus::Unknown,
    };

    info!(
        missed = missed_count,
        corrected = corrected_count,
        issues = issue_lines.len(),
        ?qty_status,
        "reconciliation complete"
    );

    ReconciliationReport {
        missed_count,
        corrected_count,
        issue_lines,
        qty_status,
        declared_item_count: output.noofitem,
    }
}
