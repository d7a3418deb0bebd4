//! Error types for board construction and pattern loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building or querying a [`Grid`](crate::grid::Grid).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Pattern input was empty or its rows had unequal lengths.
    #[error("Malformed pattern: {reason}")]
    MalformedPattern { reason: String },

    /// A query addressed a cell outside the grid.
    #[error("Cell ({row}, {col}) is out of bounds for a {height}x{width} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        height: usize,
        width: usize,
    },
}

impl GridError {
    #[must_use]
    pub fn malformed<S: Into<String>>(reason: S) -> Self {
        Self::MalformedPattern {
            reason: reason.into(),
        }
    }
}

/// Errors raised while reading an initial board from outside the process.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read board from stdin: {0}")]
    Stdin(#[source] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Pattern '{name}' not found in {}", path.display())]
    PatternNotFound { name: String, path: PathBuf },

    #[error("No pattern file given (use --file or set FILENAME)")]
    NoSource,

    #[error(transparent)]
    Grid(#[from] GridError),
}
