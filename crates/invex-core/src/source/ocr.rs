//! OCR text source wrapping the system tesseract binary.

use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Result, TextSource};
use crate::error::SourceError;

/// An external command template: program plus fixed arguments.
///
/// The input path (and, for tesseract, the `stdout` sink) are appended per
/// call. These values are immutable configuration threaded through the
/// engine, never process-wide state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrCommand {
    /// Executable name or path.
    pub program: String,
    /// Fixed arguments, in order.
    pub args: Vec<String>,
}

impl OcrCommand {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Sparse-text scan (page segmentation mode 3) with a restricted
    /// character whitelist.
    pub fn sparse_text() -> Self {
        Self::new(
            "tesseract",
            &[
                "-c",
                "tessedit_char_whitelist=/.: abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789",
            ],
        )
    }

    /// Uniform-block scan (page segmentation mode 6) with the extended
    /// character whitelist.
    pub fn uniform_block() -> Self {
        Self::new(
            "tesseract",
            &[
                "-l",
                "eng",
                "--oem",
                "1",
                "--psm",
                "6",
                "-c",
                "tessedit_char_whitelist=#-/%.:, abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789",
            ],
        )
    }

    /// Command for a template-declared page segmentation mode.
    pub fn for_psm(psm: u32) -> Self {
        if psm == 3 {
            Self::sparse_text()
        } else {
            Self::uniform_block()
        }
    }

    /// Build from raw arguments; the first element is the program.
    pub fn from_args(args: &[String]) -> Option<Self> {
        let (program, rest) = args.split_first()?;
        Some(Self {
            program: program.clone(),
            args: rest.to_vec(),
        })
    }
}

/// OCR backend spawning the tesseract binary, optionally behind an image
/// preprocessing command.
pub struct TesseractOcr {
    command: OcrCommand,
    preprocess: Option<OcrCommand>,
}

impl TesseractOcr {
    /// Create an OCR source with the given tesseract command template.
    pub fn new(command: OcrCommand) -> Self {
        Self {
            command,
            preprocess: None,
        }
    }

    /// Run an image preprocessing command before OCR. The command is invoked
    /// as `program args... <input> <output>`.
    pub fn with_preprocess(mut self, preprocess: Option<OcrCommand>) -> Self {
        self.preprocess = preprocess;
        self
    }

    fn run_preprocess(
        &self,
        command: &OcrCommand,
        input: &Path,
    ) -> Result<tempfile::NamedTempFile> {
        let converted = tempfile::Builder::new().suffix(".png").tempfile()?;
        let output = Command::new(&command.program)
            .args(&command.args)
            .arg(input)
            .arg(converted.path())
            .output()
            .map_err(|e| spawn_error(&command.program, e))?;
        if !output.status.success() {
            return Err(SourceError::Command(format!(
                "{} exited with {}: {}",
                command.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        debug!(program = %command.program, "image preprocessing complete");
        Ok(converted)
    }
}

impl TextSource for TesseractOcr {
    fn to_text(&self, path: &Path) -> Result<String> {
        // Keep the temp file alive until tesseract has read it.
        let converted = match &self.preprocess {
            Some(command) => Some(self.run_preprocess(command, path)?),
            None => None,
        };
        let input = converted.as_ref().map_or(path, |f| f.path());

        let output = Command::new(&self.command.program)
            .args(&self.command.args)
            .arg(input)
            .arg("stdout")
            .output()
            .map_err(|e| spawn_error(&self.command.program, e))?;

        if !output.status.success() {
            return Err(SourceError::Command(format!(
                "{} exited with {}: {}",
                self.command.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        if !output.stderr.is_empty() {
            warn!(
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "tesseract reported warnings"
            );
        }

        String::from_utf8(output.stdout).map_err(|e| SourceError::Encoding(e.to_string()))
    }
}

fn spawn_error(program: &str, error: std::io::Error) -> SourceError {
    if error.kind() == ErrorKind::NotFound {
        SourceError::DependencyUnavailable(program.to_string())
    } else {
        SourceError::Io(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn psm_three_selects_the_sparse_command() {
        assert_eq!(OcrCommand::for_psm(3), OcrCommand::sparse_text());
        assert_eq!(OcrCommand::for_psm(6), OcrCommand::uniform_block());
        // Anything other than 3 falls back to the block preset.
        assert_eq!(OcrCommand::for_psm(11), OcrCommand::uniform_block());
    }

    #[test]
    fn from_args_splits_program_and_arguments() {
        let args = vec!["convert".to_string(), "-density".to_string(), "350".to_string()];
        let command = OcrCommand::from_args(&args).unwrap();
        assert_eq!(command.program, "convert");
        assert_eq!(command.args, vec!["-density", "350"]);

        assert!(OcrCommand::from_args(&[]).is_none());
    }

    #[test]
    fn missing_binary_maps_to_dependency_unavailable() {
        let source = TesseractOcr::new(OcrCommand {
            program: "definitely-not-a-real-binary".to_string(),
            args: Vec::new(),
        });
        let err = source.to_text(Path::new("input.png")).unwrap_err();
        assert!(matches!(err, SourceError::DependencyUnavailable(_)));
    }
}
