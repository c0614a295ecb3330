//! Reading and writing `go.mod` files.
//!
//! The codec is split into three layers:
//!
//! - **`lexer`**: tokens, string quoting and unquoting
//! - **`syntax`**: the concrete syntax tree and its canonical formatter
//! - **`file`**: typed directives on top of the tree, with in-place edits
//!
//! Callers only need [`ModFile`]: `parse` bytes into a file, inspect
//! [`ModFile::replaces`], edit with [`ModFile::set_replace_at`] or
//! [`ModFile::set_replace`] and encode with [`ModFile::format`]. Comments and
//! layout of untouched lines survive the round trip.

pub mod error;
pub mod file;
pub mod lexer;
pub mod syntax;

pub use error::{Diagnostic, Diagnostics, ModError};
pub use file::{ModFile, ModuleVersion, Replace, display_target, is_directory_path};
