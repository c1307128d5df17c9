//! Per-line validation and bounded repair of OCR-corrupted numeric fields.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, info, warn};

use super::normalize::insert_decimal_point;
use crate::models::output::LineItem;
use crate::template::{CorrectionPriority, DecimalSpec};

/// Characters tesseract tends to emit where a leading zero was printed.
///
/// Deliberately narrow: this is not general OCR error correction.
const ZERO_CONFUSABLES: &[char] = &['O', 'o', 'D', 'Q'];

/// Literal value a field is forced to when it cannot be repaired.
const FORCED_ZERO: &str = "0.0";

/// Absolute discrepancy allowed between `qty x rate` and `total`.
///
/// Absorbs residual OCR and rounding noise; existing template expectations
/// depend on this exact value.
pub const TOLERANCE: Decimal = Decimal::ONE;

/// Arithmetic classification of a single line after reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    /// `qty x rate` agrees with `total` within tolerance.
    Match,
    /// Agreement was reached only after recomputing the quantity.
    Corrected,
    /// Still outside tolerance after any permitted correction.
    Mismatch,
}

/// Reconciles one line item at a time: decimal restoration, misread repair,
/// and the arithmetic consistency check.
///
/// Lines are processed independently; the reconciler itself keeps no state
/// between calls.
pub struct LineReconciler<'a> {
    decimals: &'a DecimalSpec,
    priority: CorrectionPriority,
}

impl<'a> LineReconciler<'a> {
    /// Create a reconciler for the given decimal configuration.
    pub fn new(decimals: &'a DecimalSpec) -> Self {
        Self {
            decimals,
            priority: CorrectionPriority::None,
        }
    }

    /// Set which field a failed arithmetic check may recompute.
    pub fn with_priority(mut self, priority: CorrectionPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Normalize, repair, and classify one line, mutating it in place.
    ///
    /// `index` is the 0-based position of the line in the invoice, used for
    /// logging and for the caller's issue list.
    pub fn reconcile(&self, index: usize, line: &mut LineItem) -> LineStatus {
        normalize_field(&mut line.qty, self.decimals.qty);
        normalize_field(&mut line.rate, self.decimals.rate);
        normalize_field(&mut line.total, self.decimals.total);

        repair_field(index, "qty", &mut line.qty);
        repair_field(index, "rate", &mut line.rate);
        repair_field(index, "total", &mut line.total);
        repair_field(index, "gst", &mut line.gst);

        for (name, value) in [
            ("qty", &line.qty),
            ("rate", &line.rate),
            ("total", &line.total),
            ("gst", &line.gst),
        ] {
            if parse_field(value) == Some(Decimal::ZERO) {
                // Zero is a legitimate value; worth a note, not a finding.
                info!(line = index, field = name, "field parsed to zero");
            }
        }

        let (Some(qty), Some(rate), Some(total)) = (
            parse_field(&line.qty),
            parse_field(&line.rate),
            parse_field(&line.total),
        ) else {
            debug!(line = index, "incomplete qty/rate/total triple, arithmetic check skipped");
            return LineStatus::Match;
        };

        let total_rounded = total.round_dp(2);
        if within_tolerance(qty, rate, total_rounded) {
            return LineStatus::Match;
        }

        if self.priority != CorrectionPriority::Qty || rate.is_zero() {
            warn!(
                line = index,
                %qty,
                %rate,
                %total,
                "line total does not reconcile"
            );
            return LineStatus::Mismatch;
        }

        let recomputed = (total / rate).round_dp(2);
        if within_tolerance(recomputed, rate, total_rounded) {
            info!(line = index, %qty, %recomputed, "quantity recomputed from total / rate");
            line.qty = Some(format!("{recomputed:.2}"));
            LineStatus::Corrected
        } else {
            warn!(
                line = index,
                %qty,
                %rate,
                %total,
                "line total does not reconcile even after quantity recompute"
            );
            LineStatus::Mismatch
        }
    }
}

fn within_tolerance(qty: Decimal, rate: Decimal, total_rounded: Decimal) -> bool {
    let product = (qty * rate).round_dp(2);
    (product - total_rounded).abs() <= TOLERANCE
}

fn normalize_field(field: &mut Option<String>, places: u32) {
    if let Some(value) = field {
        *value = insert_decimal_point(value, places);
    }
}

/// Detect a misread field and apply the bounded correction heuristic.
///
/// A field is misread when it contains any character that is neither a digit
/// nor the single decimal separator. If the first character is one of the
/// zero confusables, the value is reread as `0.<remaining digits>`; anything
/// else is unrecoverable and forced to `0.0`.
fn repair_field(index: usize, name: &str, field: &mut Option<String>) {
    let original = match field.as_deref() {
        Some(value) if !is_well_formed(value) => value.to_string(),
        _ => return,
    };

    let leading_confusable = original
        .chars()
        .next()
        .is_some_and(|c| ZERO_CONFUSABLES.contains(&c));

    let repaired = if leading_confusable {
        let digits: String = original
            .chars()
            .skip(1)
            .filter(char::is_ascii_digit)
            .collect();
        if digits.is_empty() {
            None
        } else {
            Some(format!("0.{digits}"))
        }
    } else {
        None
    };

    match repaired {
        Some(value) => {
            warn!(
                line = index,
                field = name,
                from = %original,
                to = %value,
                "repaired zero-confusable misread"
            );
            *field = Some(value);
        }
        None => {
            warn!(
                line = index,
                field = name,
                value = %original,
                "unrecoverable field misread, forcing 0.0"
            );
            *field = Some(FORCED_ZERO.to_string());
        }
    }
}

lazy_static! {
    // Digits with at most one decimal separator.
    static ref WELL_FORMED: Regex = Regex::new(r"^(?:\d+\.?\d*|\.\d+)$").unwrap();
}

fn is_well_formed(value: &str) -> bool {
    WELL_FORMED.is_match(value)
}

fn parse_field(field: &Option<String>) -> Option<Decimal> {
    let value = field.as_deref()?;
    Decimal::from_str(value.trim_end_matches('.')).ok()
}
