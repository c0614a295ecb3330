use crate::command::AbsolutizeArgs;
use clap::Parser;

/// Rewrite relative replace paths in a go.mod file as absolute paths.
///
/// Replace directives pointing at a relative local directory are resolved
/// against the working directory. Versioned and already absolute
/// replacements are left untouched.
#[derive(Parser, Debug)]
#[command(name = "gomod-absolutize", version)]
pub struct Cli {
    #[command(flatten)]
    pub args: AbsolutizeArgs,

    /// Increase log output (-v info, -vv debug)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Log filter implied by `--verbose`, used when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "gomod-absolutize",
            "--manifestPath",
            "go.mod",
            "--workingDir",
            "/work",
        ])
        .unwrap();
        assert_eq!(cli.args.manifest_path, PathBuf::from("go.mod"));
        assert_eq!(cli.args.working_dir, PathBuf::from("/work"));
        assert!(!cli.args.dry_run);
        assert_eq!(cli.log_filter(), "warn");
    }

    #[test]
    fn test_parse_aliases() {
        let cli = Cli::try_parse_from([
            "gomod-absolutize",
            "--goModPath=go.mod",
            "--wd=.",
            "-n",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.args.manifest_path, PathBuf::from("go.mod"));
        assert!(cli.args.dry_run);
        assert_eq!(cli.log_filter(), "debug");

        let cli = Cli::try_parse_from([
            "gomod-absolutize",
            "--manifest-path",
            "go.mod",
            "--working-dir",
            ".",
        ])
        .unwrap();
        assert_eq!(cli.args.working_dir, PathBuf::from("."));
    }

    #[test]
    fn test_missing_flags_rejected() {
        let err = Cli::try_parse_from(["gomod-absolutize", "--manifestPath", "go.mod"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_empty_value_rejected() {
        assert!(
            Cli::try_parse_from([
                "gomod-absolutize",
                "--manifestPath",
                "",
                "--workingDir",
                "/work",
            ])
            .is_err()
        );
    }
}
