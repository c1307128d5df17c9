//! Batch processing command for multiple invoice files.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, warn};

use invex_core::{ExtractionOutput, Outcome};

use super::{BackendArg, build_engine, report_line};
use crate::output::{self, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Folder containing invoice templates (*.json)
    #[arg(short, long)]
    templates: PathBuf,

    /// Explicit template identifier applied to every file
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

    /// Combined output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Date format used by the CSV writer and filename templates
    #[arg(long, default_value = "%Y-%m-%d")]
    date_format: String,

    /// Copy processed files to this folder, renamed by --filename-format
    #[arg(long)]
    copy: Option<PathBuf>,

    /// Move processed files to this folder, renamed by --filename-format
    #[arg(long = "move")]
    move_to: Option<PathBuf>,

    /// Filename template for --copy and --move
    #[arg(long, default_value = "{date} {invoice_number} {desc}.pdf")]
    filename_format: String,
}

pub async fn run(args: BatchArgs) -> anyhow::Result<()> {
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let engine = build_engine(
        &args.templates,
        args.backend,
        args.ocr_args.as_deref(),
        args.imgcmd.as_deref(),
    )?;

    for dir in [args.copy.as_ref(), args.move_to.as_ref()].into_iter().flatten() {
        fs::create_dir_all(dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut outputs = Vec::new();
    let mut no_match = 0usize;
    let mut failed = 0usize;
    // The exit status mirrors the last processed invoice's missed count, a
    // documented quirk relied on by surrounding automation.
    let mut last_missed: Option<i64> = None;

    for path in &files {
        // One bad invoice must not stop the rest of the batch.
        match engine.process(path, args.tid.as_deref()) {
            Ok(Outcome::Extracted { output, report }) => {
                if let Some(report) = &report {
                    last_missed = Some(report.missed_count);
                    pb.println(format!("{}  {}", path.display(), report_line(report)));
                }
                if let Err(e) = relocate(path, &output, &args) {
                    warn!(path = %path.display(), %e, "failed to copy/move processed file");
                }
                outputs.push(output);
            }
            Ok(Outcome::NoMatch) => {
                no_match += 1;
                pb.println(format!(
                    "{}  {}",
                    path.display(),
                    style("no template matched").yellow()
                ));
            }
            Ok(Outcome::Failed { reason }) => {
                failed += 1;
                pb.println(format!(
                    "{}  {}",
                    path.display(),
                    style(format!("failed: {reason}")).red()
                ));
            }
            Err(e) => {
                failed += 1;
                error!(path = %path.display(), %e, "processing error");
                pb.println(format!(
                    "{}  {}",
                    path.display(),
                    style(format!("error: {e}")).red()
                ));
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done");

    println!(
        "{} {} extracted, {} without a template, {} failed",
        style("ℹ").blue(),
        outputs.len(),
        no_match,
        failed
    );

    if !outputs.is_empty() {
        let rendered = output::render(&outputs, args.format, &args.date_format)?;
        match &args.output {
            Some(path) => {
                fs::write(path, &rendered)?;
                println!(
                    "{} Output written to {}",
                    style("✓").green(),
                    path.display()
                );
            }
            None => println!("{rendered}"),
        }
    }

    if let Some(missed) = last_missed {
        std::process::exit(missed.clamp(0, 255) as i32);
    }
    Ok(())
}

/// Copy or move a processed file, renamed from its extracted fields.
fn relocate(path: &Path, output: &ExtractionOutput, args: &BatchArgs) -> anyhow::Result<()> {
    let (Some(copy_or_move), moving) = (
        args.copy.as_ref().or(args.move_to.as_ref()),
        args.move_to.is_some() && args.copy.is_none(),
    ) else {
        return Ok(());
    };

    let filename = format_filename(&args.filename_format, output, &args.date_format);
    let target = copy_or_move.join(filename);
    if moving {
        fs::rename(path, &target)?;
    } else {
        fs::copy(path, &target)?;
    }
    Ok(())
}

fn format_filename(template: &str, output: &ExtractionOutput, date_format: &str) -> String {
    let date = output
        .date
        .map(|d| d.format(date_format).to_string())
        .unwrap_or_default();
    let number = output.invoice_number.as_deref().unwrap_or_default();
    let desc = output.desc.as_deref().unwrap_or_default();

    template
        .replace("{date}", &date)
        .replace("{invoice_number}", &number.replace('/', "-"))
        .replace("{desc}", desc)
}
