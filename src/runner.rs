//! Applies reconciliation to project files on disk

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::resolver::FsResolver;
use crate::sync::{Outcome, ProjectLangVersionSync};

/// Extension of the project files picked up from directories
const PROJECT_EXTENSION: &str = "csproj";

/// What to do with a reconciled project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Rewrite changed files in place
    Write,
    /// Report files that would change without touching them
    Check,
    /// Print every reconciled document to the output
    Stdout,
}

/// Errors processing a single project file
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Sync {
        path: PathBuf,
        #[source]
        source: SyncError,
    },
}

/// The result of processing one project file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: Outcome,
    /// Whether the reconciled text differs from the file
    pub changed: bool,
}

/// Totals over a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub processed: usize,
    pub changed: usize,
    pub failed: usize,
}

impl Summary {
    /// Process exit status: 2 on failures, 1 when check mode found changes
    pub fn exit_code(&self, mode: Mode) -> u8 {
        if self.failed > 0 {
            2
        } else if mode == Mode::Check && self.changed > 0 {
            1
        } else {
            0
        }
    }
}

/// Reconciles project files with their options files
pub struct Runner {
    sync: ProjectLangVersionSync,
    mode: Mode,
}

impl Runner {
    pub fn new(config: SyncConfig, mode: Mode) -> Self {
        Self {
            sync: ProjectLangVersionSync::new(config),
            mode,
        }
    }

    /// Expand directories into the project files they contain
    ///
    /// Directories are not searched recursively; their projects are sorted by name.
    /// A directory that cannot be listed is returned as an error and the remaining
    /// paths are still expanded.
    pub fn collect_projects(paths: &[PathBuf]) -> (Vec<PathBuf>, Vec<RunError>) {
        let mut projects = Vec::new();
        let mut errors = Vec::new();
        for path in paths {
            if !path.is_dir() {
                projects.push(path.clone());
                continue;
            }

            match list_projects(path) {
                Ok(found) => {
                    if found.is_empty() {
                        tracing::warn!("No .{} files in {}", PROJECT_EXTENSION, path.display());
                    }
                    projects.extend(found);
                }
                Err(source) => errors.push(RunError::Io {
                    path: path.clone(),
                    source,
                }),
            }
        }
        (projects, errors)
    }

    /// Reconcile one project file
    pub fn process_file(&self, path: &Path, out: &mut impl Write) -> Result<FileReport, RunError> {
        let io_error = |source: io::Error| RunError::Io {
            path: path.to_path_buf(),
            source,
        };

        let text = fs::read_to_string(path).map_err(io_error)?;
        let resolver = FsResolver::new(self.sync.config().project_root_for(path));
        let result = self
            .sync
            .reconcile_with_report(&text, &resolver)
            .map_err(|source| RunError::Sync {
                path: path.to_path_buf(),
                source,
            })?;
        let changed = result.is_changed();

        match self.mode {
            Mode::Write if changed => {
                fs::write(path, result.text.as_bytes()).map_err(io_error)?;
                tracing::info!("Updated {}", path.display());
            }
            Mode::Check if changed => {
                tracing::info!("Would update {}", path.display());
            }
            Mode::Stdout => {
                out.write_all(result.text.as_bytes()).map_err(io_error)?;
            }
            _ => {
                tracing::debug!("Unchanged {}", path.display());
            }
        }

        Ok(FileReport {
            path: path.to_path_buf(),
            outcome: result.outcome,
            changed,
        })
    }

    /// Expand `paths` and reconcile every project found
    ///
    /// Directories that cannot be listed count as failures.
    pub fn run_paths(&self, paths: &[PathBuf], out: &mut impl Write) -> Summary {
        let (projects, errors) = Self::collect_projects(paths);
        for err in &errors {
            tracing::error!("{}", err);
        }

        let mut summary = self.run(&projects, out);
        summary.failed += errors.len();
        summary
    }

    /// Reconcile every project, continuing past failures
    pub fn run(&self, projects: &[PathBuf], out: &mut impl Write) -> Summary {
        let mut summary = Summary::default();
        for path in projects {
            summary.processed += 1;
            match self.process_file(path, out) {
                Ok(report) if report.changed => summary.changed += 1,
                Ok(_) => {}
                Err(err) => {
                    tracing::error!("{}", err);
                    summary.failed += 1;
                }
            }
        }
        summary
    }
}

/// Project files directly inside `dir`, sorted by name
fn list_projects(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_project = path.extension().is_some_and(|ext| ext == PROJECT_EXTENSION);
        if is_project && path.is_file() {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}
