use crate::config::{Config, FailurePolicy};
use crate::discover::{find_inputs, output_path};
use crate::error::{ConvertError, Result};
use crate::renderer::Renderer;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Converted,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub status: FileStatus,
}

impl FileOutcome {
    /// Human-readable line naming the input and output files.
    pub fn status_line(&self) -> String {
        let input = display_name(&self.input);
        let output = display_name(&self.output);
        match &self.status {
            FileStatus::Converted => format!("Converted {input} -> {output}"),
            FileStatus::Failed(reason) => {
                format!("Failed to convert {input} -> {output}: {reason}")
            }
        }
    }
}

/// Outcomes in the order the files were processed.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn converted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == FileStatus::Converted)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.converted()
    }
}

pub struct BatchConverter<R> {
    config: Config,
    renderer: R,
}

impl<R: Renderer> BatchConverter<R> {
    pub fn new(config: Config, renderer: R) -> Self {
        Self { config, renderer }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Converts every matching file in the configured directory, one at a
    /// time, writing a status line per file to `out`.
    ///
    /// Fails before touching any file when the renderer is unavailable, the
    /// output extension equals the input extension, or the directory holds
    /// no input files.
    pub fn run<W: Write>(&self, out: &mut W) -> Result<BatchReport> {
        self.renderer.check_available()?;
        self.config.validate()?;

        let directory = &self.config.directory;
        let extension = &self.config.input_extension;
        let inputs = find_inputs(directory, extension)?;
        if inputs.is_empty() {
            return Err(ConvertError::NoInputFiles {
                directory: directory.clone(),
                extension: extension.clone(),
            });
        }
        info!(
            "converting {} file(s) in {} with {}",
            inputs.len(),
            directory.display(),
            self.renderer.name()
        );

        let format = self.config.output_format;
        let mut report = BatchReport::default();
        for input in inputs {
            let output = output_path(&input, format.extension());
            info!("rendering {} -> {}", input.display(), output.display());

            let result = self.renderer.render(&input, &output, format);
            let status = match &result {
                Ok(()) => FileStatus::Converted,
                Err(err) => {
                    warn!("{err}");
                    FileStatus::Failed(failure_reason(err))
                }
            };

            let outcome = FileOutcome {
                input,
                output,
                status,
            };
            writeln!(out, "{}", outcome.status_line()).map_err(ConvertError::Status)?;
            if let Err(err) = result {
                if self.config.on_failure == FailurePolicy::Abort {
                    return Err(err);
                }
            }
            report.outcomes.push(outcome);
        }

        info!(
            "{} converted, {} failed",
            report.converted(),
            report.failed()
        );
        Ok(report)
    }
}

fn failure_reason(err: &ConvertError) -> String {
    match err {
        ConvertError::Render { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}
