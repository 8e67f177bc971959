use crate::config::{Config, FailurePolicy, load_config};
use crate::convert::BatchConverter;
use crate::renderer::{GraphvizRenderer, OutputFormat};
use anyhow::Result;
use clap::{ArgAction, Parser};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

static INIT: Once = Once::new();

#[derive(Parser, Debug)]
#[command(
    name = "dotbatch",
    version,
    about = "Render every Graphviz file in a directory with dot"
)]
pub struct Args {
    /// Directory holding the input files. Defaults to the current directory.
    #[arg(short = 'd', long = "directory")]
    pub directory: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Extension of the input files
    #[arg(short = 'x', long = "inputExtension")]
    pub input_extension: Option<String>,

    /// Rendering executable, looked up in PATH
    #[arg(short = 'p', long = "program")]
    pub program: Option<String>,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// What to do when a single file fails to render
    #[arg(long = "onFailure", value_enum)]
    pub on_failure: Option<FailurePolicy>,

    /// Increase log verbosity. RUST_LOG takes precedence when set.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbosity: u8,

    /// Write logs to this file instead of stderr
    #[arg(short = 'l', long = "logOutput", value_name = "LOG_FILE")]
    pub log_output: Option<PathBuf>,
}

impl Args {
    /// Loads the config file, if any, then applies flags on top of it.
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(directory) = &self.directory {
            config.directory = directory.clone();
        }
        if let Some(format) = self.output_format {
            config.output_format = format;
        }
        if let Some(extension) = &self.input_extension {
            config.set_input_extension(extension);
        }
        if let Some(program) = &self.program {
            config.program = program.clone();
        }
        if let Some(policy) = self.on_failure {
            config.on_failure = policy;
        }
        Ok(config)
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbosity, args.log_output.as_deref());

    let config = args.resolve_config()?;
    let renderer = GraphvizRenderer::new(config.program.clone());
    let converter = BatchConverter::new(config, renderer);
    converter.run(&mut io::stdout().lock())?;
    Ok(())
}

fn init_logging(verbosity: u8, log_output: Option<&Path>) {
    INIT.call_once(|| {
        let to_file = log_output.is_some();
        let writer = log_writer(log_output);
        tracing_subscriber::fmt()
            .with_env_filter(env_filter(verbosity))
            .with_writer(writer)
            .with_ansi(!to_file)
            .with_target(false)
            .init();
    });
}

fn env_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::default().add_directive(LevelFilter::from_level(level_for(verbosity)).into())
    })
}

/// Opens the log file, falling back to stderr when it cannot be created.
fn log_writer(log_output: Option<&Path>) -> BoxMakeWriter {
    let Some(path) = log_output else {
        return BoxMakeWriter::new(io::stderr);
    };
    match File::create(path) {
        Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
        Err(err) => {
            eprintln!(
                "Could not create log file at {}: {err}. Defaulting to stderr.",
                path.display()
            );
            BoxMakeWriter::new(io::stderr)
        }
    }
}

fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}
