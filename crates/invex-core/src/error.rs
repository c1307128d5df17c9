//! Error types for the invex-core library.

use thiserror::Error;

/// Main error type for the invex library.
#[derive(Error, Debug)]
pub enum InvexError {
    /// Text-source backend error.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Template loading or compilation error.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl InvexError {
    /// Whether this error means an external backend tool is missing.
    ///
    /// Such errors are surfaced to the caller instead of being folded into a
    /// `Failed` outcome: retrying other invoices with the same backend would
    /// fail identically until the tool is installed.
    pub fn is_dependency_unavailable(&self) -> bool {
        matches!(
            self,
            InvexError::Source(SourceError::DependencyUnavailable(_))
        )
    }
}

/// Errors raised by text-source backends.
#[derive(Error, Debug)]
pub enum SourceError {
    /// A required external tool is not installed.
    #[error("{0} is not installed")]
    DependencyUnavailable(String),

    /// The backend command ran but reported failure.
    #[error("backend command failed: {0}")]
    Command(String),

    /// Failed to extract text from the document.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Backend produced bytes that are not valid UTF-8.
    #[error("output is not valid UTF-8: {0}")]
    Encoding(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to template loading and compilation.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// A template document could not be parsed.
    #[error("failed to parse template {path}: {reason}")]
    Parse { path: String, reason: String },

    /// A template pattern failed to compile.
    #[error("invalid pattern for {field}: {reason}")]
    Pattern { field: String, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to field extraction.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// A required field did not match.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A captured value could not be parsed.
    #[error("failed to parse {field}: {value}")]
    Parse { field: String, value: String },

    /// Nothing could be extracted from the document.
    #[error("no invoice data found")]
    NoData,
}

/// Result type for the invex library.
pub type Result<T> = std::result::Result<T, InvexError>;
