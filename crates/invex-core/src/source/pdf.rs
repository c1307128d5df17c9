//! PDF text extraction via the embedded text layer.

use std::path::Path;

use tracing::debug;

use super::{Result, TextSource};
use crate::error::SourceError;

/// Text source for PDFs that carry an extractable text layer.
///
/// Scanned PDFs without embedded text come back (near-)empty; route those
/// through the OCR backend instead.
pub struct PdfText;

impl TextSource for PdfText {
    fn to_text(&self, path: &Path) -> Result<String> {
        let text = pdf_extract::extract_text(path)
            .map_err(|e| SourceError::TextExtraction(e.to_string()))?;
        debug!(path = %path.display(), chars = text.len(), "extracted embedded PDF text");
        Ok(text)
    }
}
