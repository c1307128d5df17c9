//! Plain-text input: the file already is the extracted text.

use std::fs;
use std::path::Path;

use super::{Result, TextSource};
use crate::error::SourceError;

/// Text source for files that need no extraction at all.
pub struct PlainText;

impl TextSource for PlainText {
    fn to_text(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path)?;
        String::from_utf8(bytes).map_err(|e| SourceError::Encoding(e.to_string()))
    }
}
