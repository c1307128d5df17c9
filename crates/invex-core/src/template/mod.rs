//! Declarative invoice templates: capability trait, options, and selection.

mod loader;
mod regex_template;
mod selector;

pub use loader::load_templates;
pub use regex_template::{LineRuleSpec, RegexTemplate, TemplateSpec};
pub use selector::{select_by_content, select_by_tid};

use serde::{Deserialize, Serialize};

use crate::error::ExtractError;
use crate::models::output::ExtractionOutput;

/// Per-field counts of trailing digits that represent the fractional part
/// when an extracted string carries no decimal separator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DecimalSpec {
    /// Fractional digits of a line quantity.
    pub qty: u32,
    /// Fractional digits of a unit rate.
    pub rate: u32,
    /// Fractional digits of a line total.
    pub total: u32,
    /// Fractional digits of the header total quantity.
    pub totalqty: u32,
}

/// Which field a failed arithmetic check is allowed to recompute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CorrectionPriority {
    /// Recompute the quantity from `total / rate`.
    Qty,
    /// No correction; mismatches go straight to the issue list.
    #[default]
    None,
}

/// Declarative knobs shared by every template implementation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateOptions {
    /// Identifiers this template answers to.
    pub tid: Vec<String>,

    /// Tesseract page segmentation mode override for this layout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psm: Option<u32>,

    /// Image preprocessing command to run before OCR.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imgcmd: Option<Vec<String>>,

    /// Fractional digit counts for decimal restoration. Reconciliation runs
    /// only when this is present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimal: Option<DecimalSpec>,

    /// `"qty"` allows a failed line check to recompute the quantity; any
    /// other value disables correction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correction_priority: Option<String>,

    /// Currency reported when the document does not carry one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Date formats tried in order when parsing the date field.
    pub date_formats: Vec<String>,

    /// Replacement pairs applied during input preparation.
    pub replace: Vec<(String, String)>,

    /// Lowercase the input before matching.
    pub lowercase: bool,

    /// Strip all whitespace from the input before matching.
    pub remove_whitespace: bool,
}

impl TemplateOptions {
    /// Effective correction priority.
    pub fn correction_priority(&self) -> CorrectionPriority {
        match self.correction_priority.as_deref() {
            Some("qty") => CorrectionPriority::Qty,
            _ => CorrectionPriority::None,
        }
    }
}

/// Matching and extraction capability for one invoice issuer/layout.
///
/// Templates are read-only after load: selection and extraction never mutate
/// them, so a template list can be shared by concurrent invocations.
pub trait Template {
    /// Declarative options (identifiers, scan mode, reconciliation config).
    fn options(&self) -> &TemplateOptions;

    /// Normalize raw text into the form the match and extract patterns
    /// expect.
    fn prepare_input(&self, text: &str) -> String;

    /// Whether this template applies to the prepared text.
    fn matches_input(&self, text: &str) -> bool;

    /// Extract structured fields from the prepared text.
    fn extract(&self, text: &str) -> Result<ExtractionOutput, ExtractError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn correction_priority_recognizes_qty_only() {
        let mut options = TemplateOptions {
            correction_priority: Some("qty".to_string()),
            ..Default::default()
        };
        assert_eq!(options.correction_priority(), CorrectionPriority::Qty);

        options.correction_priority = Some("rate".to_string());
        assert_eq!(options.correction_priority(), CorrectionPriority::None);

        options.correction_priority = None;
        assert_eq!(options.correction_priority(), CorrectionPriority::None);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: TemplateOptions = serde_json::from_str("{}").unwrap();
        assert!(options.tid.is_empty());
        assert!(options.decimal.is_none());
        assert!(!options.remove_whitespace);
    }
}
