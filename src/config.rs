use crate::error::{ConvertError, Result};
use crate::renderer::{DEFAULT_PROGRAM, OutputFormat};
use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT_EXTENSION: &str = "dot";

/// What to do when the tool fails on a single file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Report the failure and move on to the next file.
    #[default]
    Continue,
    /// Stop the run at the first failure.
    Abort,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub directory: PathBuf,
    pub program: String,
    pub input_extension: String,
    pub output_format: OutputFormat,
    pub on_failure: FailurePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            program: DEFAULT_PROGRAM.to_string(),
            input_extension: DEFAULT_INPUT_EXTENSION.to_string(),
            output_format: OutputFormat::default(),
            on_failure: FailurePolicy::default(),
        }
    }
}

impl Config {
    pub fn set_input_extension(&mut self, extension: &str) {
        self.input_extension = normalize_extension(extension);
    }

    /// Rejects settings under which an output path would be its own input.
    pub fn validate(&self) -> Result<()> {
        let output_extension = self.output_format.extension();
        if self.input_extension == output_extension {
            return Err(ConvertError::SameExtension(output_extension.to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ConfigFile {
    directory: Option<PathBuf>,
    program: Option<String>,
    input_extension: Option<String>,
    output_format: Option<OutputFormat>,
    on_failure: Option<FailurePolicy>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let parsed: ConfigFile = serde_json::from_str(&contents)
        .with_context(|| format!("invalid config {}", path.display()))?;

    if let Some(v) = parsed.directory {
        config.directory = v;
    }
    if let Some(v) = parsed.program {
        config.program = v;
    }
    if let Some(v) = parsed.input_extension {
        config.set_input_extension(&v);
    }
    if let Some(v) = parsed.output_format {
        config.output_format = v;
    }
    if let Some(v) = parsed.on_failure {
        config.on_failure = v;
    }
    Ok(config)
}

fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_string()
}
