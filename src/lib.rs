#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod convert;
pub mod discover;
pub mod error;
pub mod renderer;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, FailurePolicy, load_config};
pub use convert::{BatchConverter, BatchReport, FileOutcome, FileStatus};
pub use error::ConvertError;
pub use renderer::{GraphvizRenderer, OutputFormat, Renderer, find_executable};
