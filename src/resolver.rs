//! Access to files referenced by a project document

use std::fs;
use std::io;
use std::path::PathBuf;

/// Reads auxiliary text files referenced from a project
pub trait FileResolver {
    /// Read the lines of the file at `relative_path`
    fn read_lines(&self, relative_path: &str) -> io::Result<Vec<String>>;
}

impl<F> FileResolver for F
where
    F: Fn(&str) -> io::Result<Vec<String>>,
{
    fn read_lines(&self, relative_path: &str) -> io::Result<Vec<String>> {
        self(relative_path)
    }
}

/// Resolves paths against a base directory on the local file system
#[derive(Debug, Clone)]
pub struct FsResolver {
    base_dir: PathBuf,
}

impl FsResolver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// The full path of a referenced file
    pub fn resolve(&self, relative_path: &str) -> PathBuf {
        self.base_dir.join(native_separators(relative_path))
    }
}

impl FileResolver for FsResolver {
    fn read_lines(&self, relative_path: &str) -> io::Result<Vec<String>> {
        let path = self.resolve(relative_path);
        tracing::debug!(
            "Reading options file {} (base {})",
            path.display(),
            self.base_dir.display()
        );
        let content = fs::read_to_string(&path)?;
        Ok(split_lines(&content))
    }
}

/// Project files written on Windows use `\` in item paths
#[cfg(windows)]
fn native_separators(path: &str) -> String {
    path.to_string()
}

#[cfg(not(windows))]
fn native_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Split text into lines, accepting both `\n` and `\r\n` endings
fn split_lines(content: &str) -> Vec<String> {
    content.lines().map(str::to_string).collect()
}
