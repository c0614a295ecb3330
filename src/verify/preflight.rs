//! Pre-flight resolution of command-line input.
//!
//! Turns raw arguments into [`ResolvedArgs`] before any manifest I/O
//! happens.

use crate::error::{AbsolutizeError, Result};
use crate::paths;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Validated input for one run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArgs {
    /// Manifest to rewrite in place.
    pub manifest_path: PathBuf,
    /// Absolute, normalized base for relative replace targets.
    pub working_dir: PathBuf,
}

/// Builds [`ResolvedArgs`] from user input.
///
/// The working directory is made absolute against the current directory
/// and normalized lexically; it does not have to exist.
///
/// # Errors
///
/// - `InvalidArgument`: an argument is empty
/// - `Other`: the current directory is needed but unavailable
pub fn prepare_args(manifest_path: &Path, working_dir: &Path) -> Result<ResolvedArgs> {
    if manifest_path.as_os_str().is_empty() {
        return Err(AbsolutizeError::InvalidArgument(
            "manifestPath".to_string(),
            "cannot be empty".to_string(),
        ));
    }
    if working_dir.as_os_str().is_empty() {
        return Err(AbsolutizeError::InvalidArgument(
            "workingDir".to_string(),
            "cannot be empty".to_string(),
        ));
    }

    let absolute = std::path::absolute(working_dir).with_context(|| {
        format!(
            "Couldn't absolutize working directory {}",
            working_dir.display()
        )
    })?;
    let working_dir = paths::clean(&absolute);

    log::debug!("Working directory resolved to {}", working_dir.display());

    Ok(ResolvedArgs {
        manifest_path: manifest_path.to_path_buf(),
        working_dir,
    })
}
