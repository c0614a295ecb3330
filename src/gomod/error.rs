//! Error types for the `go.mod` codec.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A single problem found while parsing a `go.mod` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: PathBuf,
    pub line: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.file.display(), self.line, self.message)
    }
}

/// Every diagnostic reported for one parse, in source order.
///
/// Never empty when returned from [`ModFile::parse`](super::ModFile::parse).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, diagnostic) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}

/// Errors from editing or formatting a parsed `go.mod` file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModError {
    /// A replace directive could not be built from the given targets.
    #[error("invalid replacement for '{path}': {reason}")]
    InvalidReplace { path: String, reason: String },

    #[error("no replace directive at index {index} (file has {count})")]
    NoSuchReplace { index: usize, count: usize },

    /// A token cannot be written back into the text format.
    #[error("line {line}: token {token:?} cannot be encoded")]
    Unencodable { line: usize, token: String },
}
