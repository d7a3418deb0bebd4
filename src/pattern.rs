//! Initial boards from outside the process: named patterns in a JSON file,
//! or a plain-text board.
//!
//! A pattern file is a JSON object mapping names to 0/1 matrices:
//!
//! ```json
//! { "test1": [[1, 0, 0, 1], [0, 1, 1, 0]] }
//! ```

use std::{
    collections::BTreeMap,
    fs,
    io::BufRead,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::info;

use crate::{
    error::{GridError, LoadError},
    grid::Grid,
};

/// Pattern looked up when the caller names none.
pub const DEFAULT_PATTERN: &str = "test1";

#[derive(Deserialize, Debug, Default)]
#[serde(transparent)]
pub struct PatternBook {
    patterns: BTreeMap<String, Vec<Vec<u8>>>,
}

impl PatternBook {
    pub fn from_json(s: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.patterns.keys().map(String::as_str)
    }

    /// Builds the board stored under `name`, or `None` if there is no such entry.
    pub fn grid(&self, name: &str) -> Option<Result<Grid, GridError>> {
        self.patterns.get(name).map(|rows| Grid::from_rows(rows.as_slice()))
    }
}

/// Reads `path` and builds the pattern called `name`.
pub fn load(path: &Path, name: &str) -> Result<Grid, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let book = PatternBook::from_json(&content)?;

    let grid = book
        .grid(name)
        .ok_or_else(|| LoadError::PatternNotFound {
            name: name.to_owned(),
            path: path.to_path_buf(),
        })??;

    info!(
        path = %path.display(),
        pattern = name,
        height = grid.height(),
        width = grid.width(),
        "loaded pattern"
    );
    Ok(grid)
}

/// Like [`load`], but `None` means "no file was configured".
pub fn load_from(path: Option<PathBuf>, name: &str) -> Result<Grid, LoadError> {
    let path = path.ok_or(LoadError::NoSource)?;
    load(&path, name)
}

/// Parses a text board, one row per line.
///
/// `0`, `.` and space are dead; any other character is alive. Blank lines are
/// skipped, so trailing newlines do not add rows.
pub fn parse_text(s: &str) -> Result<Grid, GridError> {
    let mut data: Vec<Vec<bool>> = vec![];

    for i in s.lines() {
        let r: Vec<bool> = i
            .trim_end_matches('\r')
            .chars()
            .map(|j| !matches!(j, '0' | '.' | ' '))
            .collect();
        if !r.is_empty() {
            data.push(r);
        }
    }

    Grid::new(data)
}

/// Reads lines from `input` up to the first empty line and parses them.
pub fn read_text<R: BufRead>(input: R) -> Result<Grid, LoadError> {
    let mut s = String::new();
    for w in input.lines() {
        let w = w.map_err(LoadError::Stdin)?;
        if w.is_empty() {
            break;
        }
        s.push_str(&w);
        s.push('\n');
    }
    Ok(parse_text(&s)?)
}
