//! Core library for template-driven invoice extraction and numeric
//! reconciliation.
//!
//! This crate provides:
//! - Text-source backends (plain text, PDF embedded text, tesseract OCR)
//! - Declarative regex templates with deterministic first-match selection
//! - Decimal restoration for OCR output that dropped the decimal point
//! - Line and aggregate reconciliation with a bounded correction heuristic

pub mod engine;
pub mod error;
pub mod models;
pub mod reconcile;
pub mod source;
pub mod template;

pub use engine::{Engine, Outcome};
pub use error::{ExtractError, InvexError, Result, SourceError, TemplateError};
pub use models::output::{ExtractionOutput, LineItem};
pub use models::report::{QtyStatus, ReconciliationReport};
pub use reconcile::{LineReconciler, LineStatus, TOLERANCE, insert_decimal_point, reconcile};
pub use source::{Backend, OcrCommand, PdfText, PlainText, TesseractOcr, TextSource};
pub use template::{
    CorrectionPriority, DecimalSpec, RegexTemplate, Template, TemplateOptions, TemplateSpec,
    load_templates, select_by_content, select_by_tid,
};
