//! Text-extraction backends.
//!
//! One capability: produce raw text for an invoice file. The interchangeable
//! backends (plain text, PDF embedded text, tesseract OCR) are named variants
//! selected through explicit configuration, not a lookup table keyed by
//! string.

mod ocr;
mod pdf;
mod plain;

pub use ocr::{OcrCommand, TesseractOcr};
pub use pdf::PdfText;
pub use plain::PlainText;

use std::path::Path;

use crate::error::SourceError;

/// Result type for text-source operations.
pub type Result<T> = std::result::Result<T, SourceError>;

/// A backend able to produce raw text for an invoice file.
///
/// The call may block on an external process; no timeout is imposed here, so
/// callers needing bounded latency must wrap the invocation themselves.
pub trait TextSource {
    /// Extract the raw text of the document at `path`.
    fn to_text(&self, path: &Path) -> Result<String>;
}

/// Named backend variants the engine can construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Read the file as UTF-8 text.
    Plain,
    /// Extract embedded text from a PDF.
    Pdf,
    /// OCR an image through the system tesseract binary.
    Ocr,
}
