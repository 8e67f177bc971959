use crate::error::{ConvertError, Result};
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Lists the regular files directly inside `directory` matching
/// `*.<extension>`, in file name order.
pub fn find_inputs(directory: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let meta = std::fs::metadata(directory).map_err(|err| ConvertError::io(directory, err))?;
    if !meta.is_dir() {
        let err = std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory");
        return Err(ConvertError::io(directory, err));
    }

    let pattern = input_pattern(directory, extension);
    let mut inputs = Vec::new();
    for entry in glob::glob_with(&pattern, MATCH_OPTIONS)? {
        let path = entry.map_err(|err| {
            let path = err.path().to_path_buf();
            ConvertError::io(path, err.into_error())
        })?;
        // Follows symlinks, so a link to a graph file still counts.
        if path.is_file() {
            inputs.push(path);
        }
    }
    Ok(inputs)
}

/// `graph1.dot` becomes `graph1.<extension>` next to it.
pub fn output_path(input: &Path, extension: &str) -> PathBuf {
    input.with_extension(extension)
}

fn input_pattern(directory: &Path, extension: &str) -> String {
    let directory = Pattern::escape(&directory.to_string_lossy());
    let file = format!("*.{}", Pattern::escape(extension));
    Path::new(&directory).join(file).to_string_lossy().into_owned()
}
