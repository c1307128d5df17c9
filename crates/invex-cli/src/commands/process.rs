//! Process command - extract data from a single invoice file.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use invex_core::Outcome;

use super::{BackendArg, build_engine, report_line};
use crate::output::{self, OutputFormat};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (text, PDF, or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Folder containing invoice templates (*.json)
    #[arg(short, long)]
    templates: PathBuf,

    /// Explicit template identifier; skips content-based selection
    #[arg(long)]
    tid: Option<String>,

    /// Text extraction backend
    #[arg(short, long, value_enum, default_value = "pdf")]
    backend: BackendArg,

    /// Override the OCR command (comma-separated, program first)
    #[arg(long, value_delimiter = ',')]
    ocr_args: Option<Vec<String>>,

    /// Image preprocessing command (comma-separated, program first)
    #[arg(long, value_delimiter = ',')]
    imgcmd: Option<Vec<String>>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Date format used by the CSV writer
    #[arg(long, default_value = "%Y-%m-%d")]
    date_format: String,
}

pub async fn run(args: ProcessArgs) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let engine = build_engine(
        &args.templates,
        args.backend,
        args.ocr_args.as_deref(),
        args.imgcmd.as_deref(),
    )?;

    info!("Processing file: {}", args.input.display());
    let outcome = engine.process(&args.input, args.tid.as_deref())?;

    match outcome {
        Outcome::NoMatch => {
            println!(
                "{} No template matched {}",
                style("✗").yellow(),
                args.input.display()
            );
        }
        Outcome::Failed { reason } => {
            println!("{} Extraction failed: {}", style("✗").red(), reason);
        }
        Outcome::Extracted { output, report } => {
            let rendered =
                output::render(std::slice::from_ref(&output), args.format, &args.date_format)?;

            if let Some(path) = &args.output {
                fs::write(path, &rendered)?;
                println!(
                    "{} Output written to {}",
                    style("✓").green(),
                    path.display()
                );
            } else {
                println!("{rendered}");
            }

            if let Some(report) = report {
                println!();
                println!("{}", report_line(&report));
            }
        }
    }

    Ok(())
}
