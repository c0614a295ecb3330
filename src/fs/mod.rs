//! File system helpers.
//!
//! Writes replace files through a sibling temporary file so a crash never
//! leaves a truncated manifest behind.

pub mod write;

pub use write::write_atomic;
