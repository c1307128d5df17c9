//! Extracted invoice data models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Structured output produced by a template's field extraction.
///
/// Header fields plus the ordered line items. Reconciliation rewrites the
/// numeric strings in place, so a caller holding this value afterwards sees
/// the normalized and corrected data, not the raw OCR capture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// Issuing party, as declared by the matching template.
    pub issuer: String,

    /// Invoice total amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,

    /// Issue date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    /// Invoice number/identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,

    /// Currency code.
    #[serde(default)]
    pub currency: String,

    /// Short description of the document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,

    /// Declared number of line items, when the layout prints one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noofitem: Option<Decimal>,

    /// Declared total quantity. Kept as the raw digit string so the decimal
    /// normalizer can restore its decimal point during reconciliation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totalqty: Option<String>,

    /// Line items in document order.
    #[serde(default)]
    pub lines: Vec<LineItem>,
}

/// One row of an invoice.
///
/// The numeric fields stay strings: OCR frequently drops the decimal point or
/// misreads characters, and reconciliation repairs the raw string rather than
/// a lossy parse of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product or service description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Quantity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qty: Option<String>,

    /// Unit rate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<String>,

    /// Line total.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<String>,

    /// Tax amount for this line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gst: Option<String>,
}
