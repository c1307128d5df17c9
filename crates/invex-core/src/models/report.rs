//! Reconciliation diagnostics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of comparing summed line quantities against the declared total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QtyStatus {
    /// Sum of line quantities agrees with the declared total within tolerance.
    Match,
    /// Sum of line quantities disagrees with the declared total.
    NoMatch,
    /// No total quantity was declared, so no comparison was attempted.
    #[default]
    Unknown,
}

/// Diagnostic summary produced by reconciling one invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// Declared item count minus lines actually traversed. Zero means every
    /// declared line was parsed; `-1` means no count was declared at all,
    /// which is distinct from "all accounted for".
    pub missed_count: i64,

    /// Lines whose quantity was recomputed back into tolerance.
    pub corrected_count: u32,

    /// 0-based indices of lines still failing the arithmetic check, in
    /// traversal order.
    pub issue_lines: Vec<usize>,

    /// Declared-vs-summed quantity status.
    pub qty_status: QtyStatus,

    /// Declared item count, when the template extracted one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_item_count: Option<Decimal>,
}

impl ReconciliationReport {
    /// Whether the invoice reconciled without any open findings.
    pub fn is_clean(&self) -> bool {
        self.missed_count == 0
            && self.issue_lines.is_empty()
            && self.qty_status != QtyStatus::NoMatch
    }
}
