//! Error types for gomod-absolutize.
//!
//! All operations return `Result<T>` which aliases `Result<T, AbsolutizeError>`.
//! Every pipeline stage wraps its cause in its own variant, labelled with
//! the manifest path.

use crate::gomod::{Diagnostics, ModError};
use crate::rewrite::RewriteError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from an absolutize run.
#[derive(Debug, Error)]
pub enum AbsolutizeError {
    /// Command line could not be parsed; carries clap's usage message.
    #[error("{0}")]
    Usage(#[from] clap::Error),

    /// Command line parsed but a value is unusable.
    #[error("Invalid argument '{0}': {1}")]
    InvalidArgument(String, String),

    /// Manifest does not exist.
    #[error("Couldn't find go.mod file {}", .0.display())]
    NotFound(PathBuf),

    /// Manifest exists but could not be read.
    #[error("Couldn't read go.mod file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Manifest is not valid `go.mod` syntax. Holds every diagnostic.
    #[error("Couldn't parse go.mod file {}: {diagnostics}", .path.display())]
    Parse {
        path: PathBuf,
        diagnostics: Diagnostics,
    },

    /// A replace target could not be rewritten.
    #[error("Couldn't replace path to absolute in {}: {source}", .path.display())]
    Transform {
        path: PathBuf,
        source: RewriteError,
    },

    /// The edited manifest could not be encoded.
    #[error("Couldn't format go.mod file {}: {source}", .path.display())]
    Encode { path: PathBuf, source: ModError },

    /// The edited manifest could not be written back.
    #[error("Couldn't save go.mod in {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Unexpected error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for gomod-absolutize operations.
pub type Result<T> = std::result::Result<T, AbsolutizeError>;
