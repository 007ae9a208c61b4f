use std::io;
use std::path::PathBuf;

use tempfile::NamedTempFile;

const PREFIX: &str = "kerf-";
const MAX_SUFFIX_LEN: usize = 16;

/// Hands out temporary files that are deleted when dropped, including when
/// the owning future is cancelled.
#[derive(Debug, Clone, Default)]
pub struct ScratchSpace {
    root: Option<PathBuf>,
}

impl ScratchSpace {
    /// Scratch files are created under `root`, or the system temp directory
    /// when `None`.
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    /// Creates an empty scratch file whose name ends in `.{format}`.
    pub fn acquire(&self, format: &str) -> io::Result<NamedTempFile> {
        let suffix = file_suffix(format);
        let mut builder = tempfile::Builder::new();
        builder.prefix(PREFIX).suffix(&suffix);

        match &self.root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempfile_in(root)
            }
            None => builder.tempfile(),
        }
    }
}

fn file_suffix(format: &str) -> String {
    let cleaned: String = format
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(MAX_SUFFIX_LEN)
        .collect();

    if cleaned.is_empty() {
        String::new()
    } else {
        format!(".{}", cleaned)
    }
}
