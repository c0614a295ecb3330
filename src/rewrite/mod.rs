//! Manifest rewrites.

pub mod replace;

pub use replace::{RewriteError, Substitution, qualifies, rewrite_relative_paths};
