//! Extraction orchestrator: template selection, text production, field
//! extraction, and optional reconciliation.

use std::path::Path;

use tracing::{error, info};

use crate::error::{InvexError, Result};
use crate::models::output::ExtractionOutput;
use crate::models::report::ReconciliationReport;
use crate::reconcile;
use crate::source::{Backend, OcrCommand, PdfText, PlainText, TesseractOcr, TextSource};
use crate::template::{Template, select_by_content, select_by_tid};

/// Result of processing one invoice.
///
/// Internal faults are folded into `Failed` at this boundary instead of
/// propagating, so a single malformed invoice never aborts a batch. The one
/// exception is a missing external tool, which is returned as a hard error
/// because every retry with the same configuration would fail identically.
#[derive(Debug)]
pub enum Outcome {
    /// No template matched; an empty, non-fatal result.
    NoMatch,
    /// Extraction succeeded. The report is present when the matching
    /// template declares reconciliation configuration.
    Extracted {
        output: ExtractionOutput,
        report: Option<ReconciliationReport>,
    },
    /// An internal failure was caught and logged.
    Failed { reason: String },
}

impl Outcome {
    /// Whether this outcome carries extracted data.
    pub fn is_extracted(&self) -> bool {
        matches!(self, Outcome::Extracted { .. })
    }
}

/// Per-invoice extraction pipeline.
///
/// The engine is synchronous and holds no mutable state, so one instance can
/// serve many concurrent invocations as long as the template list is left
/// alone.
pub struct Engine {
    templates: Vec<Box<dyn Template>>,
    backend: Backend,
    ocr_command: OcrCommand,
    preprocess: Option<OcrCommand>,
}

impl Engine {
    /// Create an engine over an ordered template list.
    pub fn new(templates: Vec<Box<dyn Template>>) -> Self {
        Self {
            templates,
            backend: Backend::Pdf,
            ocr_command: OcrCommand::uniform_block(),
            preprocess: None,
        }
    }

    /// Select the text-extraction backend.
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Override the base OCR command template.
    pub fn with_ocr_command(mut self, command: OcrCommand) -> Self {
        self.ocr_command = command;
        self
    }

    /// Set a base image preprocessing command for the OCR backend.
    pub fn with_preprocess(mut self, preprocess: Option<OcrCommand>) -> Self {
        self.preprocess = preprocess;
        self
    }

    /// Process one invoice file.
    ///
    /// Selection order: an explicit `tid` wins, scanned in template-list
    /// order; otherwise the first template whose content match accepts the
    /// text. A template selected by `tid` may override the OCR command
    /// configuration before the text is produced.
    pub fn process(&self, path: &Path, tid: Option<&str>) -> Result<Outcome> {
        let preselected = tid.and_then(|t| select_by_tid(&self.templates, t));

        let (command, preprocess) = match preselected {
            Some(template) => {
                let options = template.options();
                let command = options
                    .psm
                    .map(OcrCommand::for_psm)
                    .unwrap_or_else(|| self.ocr_command.clone());
                let preprocess = options
                    .imgcmd
                    .as_deref()
                    .and_then(OcrCommand::from_args)
                    .or_else(|| self.preprocess.clone());
                (command, preprocess)
            }
            None => (self.ocr_command.clone(), self.preprocess.clone()),
        };

        let source: Box<dyn TextSource> = match self.backend {
            Backend::Plain => Box::new(PlainText),
            Backend::Pdf => Box::new(PdfText),
            Backend::Ocr => Box::new(TesseractOcr::new(command).with_preprocess(preprocess)),
        };

        let raw_text = match source.to_text(path) {
            Ok(text) => text,
            Err(e) => {
                let err = InvexError::from(e);
                if err.is_dependency_unavailable() {
                    return Err(err);
                }
                error!(path = %path.display(), %err, "text extraction failed");
                return Ok(Outcome::Failed {
                    reason: err.to_string(),
                });
            }
        };

        let (template, prepared) = match preselected {
            Some(template) => (template, template.prepare_input(&raw_text)),
            None => match select_by_content(&self.templates, &raw_text) {
                Some(found) => found,
                None => {
                    info!(path = %path.display(), "no template for this invoice");
                    return Ok(Outcome::NoMatch);
                }
            },
        };

        let mut output = match template.extract(&prepared) {
            Ok(output) => output,
            Err(e) => {
                error!(path = %path.display(), %e, "field extraction failed");
                return Ok(Outcome::Failed {
                    reason: e.to_string(),
                });
            }
        };

        let options = template.options();
        let report = options.decimal.as_ref().map(|decimals| {
            reconcile::reconcile(&mut output, decimals, options.correction_priority())
        });

        Ok(Outcome::Extracted { output, report })
    }
}
