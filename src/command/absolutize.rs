//! Orchestration of one absolutize run.
//!
//! A run moves through fixed stages: the manifest is loaded and parsed,
//! its replace targets are rewritten, and the result is saved back to the
//! same path. Any failure stops the run where it happened; nothing is
//! retried or rolled back.

use crate::error::{AbsolutizeError, Result};
use crate::fs::write_atomic;
use crate::gomod::ModFile;
use crate::rewrite::{Substitution, rewrite_relative_paths};
use crate::verify::{ResolvedArgs, prepare_args};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Arguments of an absolutize run.
#[derive(Args, Debug, Clone)]
pub struct AbsolutizeArgs {
    /// Path to the go.mod file to rewrite in place
    #[arg(
        long = "manifestPath",
        visible_alias = "manifest-path",
        alias = "goModPath",
        value_name = "PATH"
    )]
    pub manifest_path: PathBuf,

    /// Directory that relative replace paths are resolved against
    #[arg(
        long = "workingDir",
        visible_alias = "working-dir",
        alias = "wd",
        value_name = "DIR"
    )]
    pub working_dir: PathBuf,

    /// Show the replacements without writing the file
    #[arg(long, short = 'n')]
    pub dry_run: bool,
}

/// Run options that do not come from the manifest itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub dry_run: bool,
}

/// A pipeline stage, used to report where a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Transform,
    Save,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    NotStarted,
    Loaded,
    Transformed,
    Saved,
    Done,
    Failed(Stage),
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub substitutions: Vec<Substitution>,
    /// False for dry runs and when the encoded bytes matched the file.
    pub written: bool,
}

/// Owns the manifest for the duration of one run.
#[must_use = "Pipeline does nothing until run"]
pub struct Pipeline<'a> {
    args: &'a ResolvedArgs,
    options: Options,
    state: PipelineState,
    original: Vec<u8>,
    file: Option<ModFile>,
    substitutions: Vec<Substitution>,
}

impl<'a> Pipeline<'a> {
    pub fn new(args: &'a ResolvedArgs, options: Options) -> Self {
        Self {
            args,
            options,
            state: PipelineState::NotStarted,
            original: Vec::new(),
            file: None,
            substitutions: Vec::new(),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    fn advance(&mut self, next: PipelineState) {
        log::debug!("Pipeline {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn fail<T>(&mut self, stage: Stage, err: AbsolutizeError) -> Result<T> {
        self.advance(PipelineState::Failed(stage));
        Err(err)
    }

    /// Runs every stage, reporting each substitution through `on_replace`
    /// before it is applied.
    pub fn run(mut self, on_replace: impl FnMut(&Substitution)) -> Result<Report> {
        self.load()?;
        self.transform(on_replace)?;
        let written = self.save()?;
        self.advance(PipelineState::Done);
        Ok(Report {
            substitutions: self.substitutions,
            written,
        })
    }

    fn load(&mut self) -> Result<()> {
        let args = self.args;
        let path = &args.manifest_path;
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let err = AbsolutizeError::NotFound(path.clone());
                return self.fail(Stage::Load, err);
            }
            Err(source) => {
                let err = AbsolutizeError::Read {
                    path: path.clone(),
                    source,
                };
                return self.fail(Stage::Load, err);
            }
        };

        match ModFile::parse(path.clone(), &data) {
            Ok(file) => {
                log::debug!(
                    "Parsed {} with {} replace directive(s)",
                    path.display(),
                    file.replaces().len()
                );
                self.original = data;
                self.file = Some(file);
                self.advance(PipelineState::Loaded);
                Ok(())
            }
            Err(diagnostics) => {
                for diagnostic in diagnostics.iter() {
                    log::warn!("{diagnostic}");
                }
                let err = AbsolutizeError::Parse {
                    path: path.clone(),
                    diagnostics,
                };
                self.fail(Stage::Load, err)
            }
        }
    }

    fn transform(&mut self, on_replace: impl FnMut(&Substitution)) -> Result<()> {
        let Some(file) = self.file.as_mut() else {
            return Err(anyhow::anyhow!("transform before load").into());
        };

        match rewrite_relative_paths(file, &self.args.working_dir, on_replace) {
            Ok(substitutions) => {
                self.substitutions = substitutions;
                self.advance(PipelineState::Transformed);
                Ok(())
            }
            Err(source) => {
                let err = AbsolutizeError::Transform {
                    path: self.args.manifest_path.clone(),
                    source,
                };
                self.fail(Stage::Transform, err)
            }
        }
    }

    fn save(&mut self) -> Result<bool> {
        let Some(file) = self.file.as_ref() else {
            return Err(anyhow::anyhow!("save before load").into());
        };

        let content = match file.format() {
            Ok(content) => content,
            Err(source) => {
                let err = AbsolutizeError::Encode {
                    path: file.name().to_path_buf(),
                    source,
                };
                return self.fail(Stage::Save, err);
            }
        };
        let target = file.name().to_path_buf();

        if self.options.dry_run {
            log::info!("Would update: {}", target.display());
            self.advance(PipelineState::Saved);
            return Ok(false);
        }

        if content == self.original {
            log::debug!("Content unchanged, skipping: {}", target.display());
            self.advance(PipelineState::Saved);
            return Ok(false);
        }

        if let Err(source) = write_atomic(&target, &content) {
            let err = AbsolutizeError::Write {
                path: target,
                source,
            };
            return self.fail(Stage::Save, err);
        }
        log::info!("Updated: {}", target.display());
        self.advance(PipelineState::Saved);
        Ok(true)
    }
}

/// Loads, rewrites and saves the manifest named by `args`.
pub fn absolutize(
    args: &ResolvedArgs,
    options: Options,
    on_replace: impl FnMut(&Substitution),
) -> Result<Report> {
    Pipeline::new(args, options).run(on_replace)
}

pub fn execute(args: AbsolutizeArgs) -> Result<()> {
    let resolved = prepare_args(&args.manifest_path, &args.working_dir)?;
    let options = Options {
        dry_run: args.dry_run,
    };

    let verb = if args.dry_run { "Would replace" } else { "Replacing" };
    let report = absolutize(&resolved, options, |s| {
        println!("{} {} with {}", verb.cyan(), s.old_path, s.new_path.green());
    })?;

    if args.dry_run {
        println!(
            "{} {} replacement(s) found, {} not modified",
            "Dry run:".yellow().bold(),
            report.substitutions.len(),
            resolved.manifest_path.display()
        );
    } else {
        log::info!(
            "{} replacement(s) applied to {}",
            report.substitutions.len(),
            resolved.manifest_path.display()
        );
    }

    Ok(())
}
