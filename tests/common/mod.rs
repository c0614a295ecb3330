//! Shared helpers for the integration tests.

use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A go.mod mixing every kind of replace directive.
#[allow(unused)]
pub const MIXED_GO_MOD: &str = "module github.com/example/app

go 1.21

require (
\tgithub.com/example/a v1.0.0
\tgithub.com/example/c v1.0.0
)

replace github.com/example/a => ../a

replace (
\tgithub.com/example/b => ./vendor/b // vendored copy
\tgithub.com/example/c => github.com/example/c v1.0.1
\tgithub.com/example/d => /some/absolute/path/unix
)
";

/// Creates a temporary project directory holding `go.mod` with `content`.
pub fn create_go_mod(content: &str) -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let manifest = temp.path().join("go.mod");
    fs::write(&manifest, content).unwrap();
    (temp, manifest)
}

/// Runs the binary against `manifest`, resolving against `working_dir`.
pub fn run_absolutize(
    manifest: &Path,
    working_dir: &Path,
    extra_args: &[&str],
) -> assert_cmd::assert::Assert {
    let mut cmd = cargo_bin_cmd!("gomod-absolutize");
    cmd.arg("--manifestPath")
        .arg(manifest)
        .arg("--workingDir")
        .arg(working_dir)
        .args(extra_args)
        .env("NO_COLOR", "1");

    cmd.assert()
}
