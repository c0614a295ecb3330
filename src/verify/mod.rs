//! Validation of user input before a run.

pub mod preflight;

pub use preflight::{ResolvedArgs, prepare_args};
