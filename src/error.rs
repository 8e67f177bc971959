use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConvertError>;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("external tool '{0}' not found in PATH")]
    ToolMissing(String),

    #[error("no .{extension} files found in {}", directory.display())]
    NoInputFiles { directory: PathBuf, extension: String },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to convert {}: {reason}", input.display())]
    Render { input: PathBuf, reason: String },

    #[error("input and output extension are both .{0}, outputs would overwrite inputs")]
    SameExtension(String),

    #[error("invalid input pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("failed to write status line: {0}")]
    Status(#[source] std::io::Error),
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
