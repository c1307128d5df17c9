//! Numeric reconciliation: decimal restoration, per-line repair, and
//! aggregate summaries.
//!
//! OCR output frequently drops decimal points or misreads characters. This
//! module restores the configured precision, applies a deliberately bounded
//! correction heuristic, and classifies what is left over instead of guessing
//! any further.

mod aggregate;
mod line;
mod normalize;

pub use aggregate::reconcile;
pub use line::{LineReconciler, LineStatus, TOLERANCE};
pub use normalize::insert_decimal_point;
