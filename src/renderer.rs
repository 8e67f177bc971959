use crate::error::{ConvertError, Result};
use serde::Deserialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

pub const DEFAULT_PROGRAM: &str = "dot";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pdf,
    Svg,
    Png,
    Ps,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
            OutputFormat::Ps => "ps",
        }
    }

    /// Value passed to the tool's `-T` flag.
    pub fn selector(self) -> &'static str {
        self.extension()
    }
}

/// Backend that turns one graph description into one rendered document.
pub trait Renderer {
    fn name(&self) -> &str;

    /// Fails with [`ConvertError::ToolMissing`] when the backend cannot run.
    fn check_available(&self) -> Result<()>;

    fn render(&self, input: &Path, output: &Path, format: OutputFormat) -> Result<()>;
}

/// Runs the Graphviz command line tool as a blocking child process.
#[derive(Debug, Clone)]
pub struct GraphvizRenderer {
    program: String,
}

impl GraphvizRenderer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, input: &Path, output: &Path, format: OutputFormat) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(format!("-T{}", format.selector()))
            .arg(input)
            .arg("-o")
            .arg(output);
        cmd
    }
}

impl Default for GraphvizRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl Renderer for GraphvizRenderer {
    fn name(&self) -> &str {
        &self.program
    }

    fn check_available(&self) -> Result<()> {
        let path_var = std::env::var_os("PATH");
        match find_executable(&self.program, path_var.as_deref()) {
            Some(found) => {
                debug!("using {} at {}", self.program, found.display());
                Ok(())
            }
            None => Err(ConvertError::ToolMissing(self.program.clone())),
        }
    }

    fn render(&self, input: &Path, output: &Path, format: OutputFormat) -> Result<()> {
        let mut cmd = self.command(input, output, format);
        debug!("running {:?}", cmd);
        let result = cmd.output().map_err(|err| ConvertError::Render {
            input: input.to_path_buf(),
            reason: format!("could not run {}: {err}", self.program),
        })?;

        if result.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&result.stderr);
        let stderr = stderr.trim();
        let reason = if stderr.is_empty() {
            format!("{} exited with {}", self.program, result.status)
        } else {
            format!("{} exited with {}: {}", self.program, result.status, stderr)
        };
        Err(ConvertError::Render {
            input: input.to_path_buf(),
            reason,
        })
    }
}

/// Resolves `program` the way a shell would: names containing a path
/// separator are checked as given, bare names are searched for in `path_var`.
pub fn find_executable(program: &str, path_var: Option<&OsStr>) -> Option<PathBuf> {
    if program.is_empty() {
        return None;
    }
    let direct = Path::new(program);
    if direct.components().count() > 1 {
        return executable_candidate(direct);
    }
    let path_var = path_var?;
    std::env::split_paths(path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .find_map(|dir| executable_candidate(&dir.join(program)))
}

fn executable_candidate(path: &Path) -> Option<PathBuf> {
    if is_executable(path) {
        return Some(path.to_path_buf());
    }
    #[cfg(windows)]
    {
        let exe = path.with_extension("exe");
        if is_executable(&exe) {
            return Some(exe);
        }
    }
    None
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_selectors_match_extensions() {
        assert_eq!(OutputFormat::default(), OutputFormat::Pdf);
        assert_eq!(OutputFormat::Pdf.selector(), "pdf");
        assert_eq!(OutputFormat::Svg.extension(), "svg");
    }

    #[test]
    fn command_line_is_format_input_output() {
        let renderer = GraphvizRenderer::default();
        let cmd = renderer.command(Path::new("a.dot"), Path::new("a.pdf"), OutputFormat::Pdf);
        assert_eq!(cmd.get_program(), "dot");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, ["-Tpdf", "a.dot", "-o", "a.pdf"]);
    }

    #[test]
    fn missing_program_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let found = find_executable("nonexistent_binary_xyz123", Some(dir.path().as_os_str()));
        assert!(found.is_none());
        assert!(find_executable("dot", None).is_none());
        assert!(find_executable("", Some(dir.path().as_os_str())).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn finds_executable_on_path() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("dot");
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();

        // Present but not executable.
        assert!(find_executable("dot", Some(dir.path().as_os_str())).is_none());

        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();
        let path_var =
            std::env::join_paths([PathBuf::from("/nonexistent-dir"), dir.path().to_path_buf()])
                .unwrap();
        assert_eq!(find_executable("dot", Some(&path_var)), Some(tool.clone()));

        let absolute = tool.to_str().unwrap();
        assert_eq!(find_executable(absolute, None), Some(tool));
    }

    #[test]
    fn unavailable_program_reports_tool_missing() {
        let renderer = GraphvizRenderer::new("nonexistent_binary_xyz123");
        let err = renderer.check_available().unwrap_err();
        assert!(matches!(err, ConvertError::ToolMissing(name) if name == "nonexistent_binary_xyz123"));
    }
}
