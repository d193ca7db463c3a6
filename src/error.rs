//! Error types for project reconciliation

use std::io;

/// A malformed project document
///
/// Positions are 0-indexed and point at the byte offset the XML reader reported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at line {} column {}", .line + 1, .column + 1)]
pub struct ParseError {
    /// Human readable description
    pub message: String,
    /// Line of the error (0-indexed)
    pub line: u32,
    /// Column of the error (0-indexed)
    pub column: u32,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

/// Errors that abort a reconciliation
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The project document is not well-formed
    #[error("invalid project document: {0}")]
    Parse(#[from] ParseError),

    /// More than one reference entry points at an options file
    #[error("ambiguous options file reference: {}", .paths.join(", "))]
    AmbiguousReference { paths: Vec<String> },

    /// More than one element exists where at most one is expected
    #[error("ambiguous element <{name}>: found {count}")]
    AmbiguousElement { name: String, count: usize },

    /// The referenced options file could not be read
    #[error("cannot read options file '{path}': {source}")]
    MissingResource {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A setting has to be created but the project has no property group
    #[error("project document has no <{name}> to hold the language version")]
    MissingPropertyGroup { name: String },
}

impl SyncError {
    /// Create a missing-resource error for a referenced path
    pub fn missing_resource(path: impl Into<String>, source: io::Error) -> Self {
        Self::MissingResource {
            path: path.into(),
            source,
        }
    }
}
