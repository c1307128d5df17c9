//! CLI subcommands.

pub mod batch;
pub mod process;

use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;
use console::style;

use invex_core::{
    Backend, Engine, OcrCommand, QtyStatus, ReconciliationReport, Template, load_templates,
};

/// Text-extraction backend choice.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum BackendArg {
    /// Read the file as UTF-8 text
    Txt,
    /// Extract the PDF text layer
    Pdf,
    /// OCR through the system tesseract binary
    Ocr,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Txt => Backend::Plain,
            BackendArg::Pdf => Backend::Pdf,
            BackendArg::Ocr => Backend::Ocr,
        }
    }
}

/// Load templates and assemble an engine from the shared CLI options.
pub fn build_engine(
    templates_dir: &Path,
    backend: BackendArg,
    ocr_args: Option<&[String]>,
    imgcmd: Option<&[String]>,
) -> anyhow::Result<Engine> {
    let templates = load_templates(templates_dir)
        .with_context(|| format!("loading templates from {}", templates_dir.display()))?;
    if templates.is_empty() {
        anyhow::bail!("no templates found in {}", templates_dir.display());
    }

    let templates: Vec<Box<dyn Template>> = templates
        .into_iter()
        .map(|t| Box::new(t) as Box<dyn Template>)
        .collect();

    let mut engine = Engine::new(templates).with_backend(backend.into());
    if let Some(args) = ocr_args {
        let command =
            OcrCommand::from_args(args).context("--ocr-args needs at least a program name")?;
        engine = engine.with_ocr_command(command);
    }
    if let Some(args) = imgcmd {
        engine = engine.with_preprocess(OcrCommand::from_args(args));
    }
    Ok(engine)
}

/// One-line reconciliation summary, colored by severity.
pub fn report_line(report: &ReconciliationReport) -> String {
    let qty = match report.qty_status {
        QtyStatus::Match => "Match",
        QtyStatus::NoMatch => "NoMatch",
        QtyStatus::Unknown => "Unknown",
    };
    let declared = report
        .declared_item_count
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    let summary = format!(
        "missed: {} corrected: {} lines with issues: {} qty: {} declared items: {}",
        report.missed_count,
        report.corrected_count,
        report.issue_lines.len(),
        qty,
        declared,
    );
    if report.is_clean() {
        style(summary).green().to_string()
    } else {
        style(summary).yellow().to_string()
    }
}
