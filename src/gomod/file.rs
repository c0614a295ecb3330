//! Directive model for a parsed `go.mod` file.
//!
//! [`ModFile`] decodes the syntax tree into typed directives and keeps a
//! link from each `replace` entry to the line it came from, so edits touch
//! only that line.

use super::error::{Diagnostic, Diagnostics, ModError};
use super::lexer::{auto_quote, unquote};
use super::syntax::{FileSyntax, LineId, Stmt};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static SEMVER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^v(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)(-[0-9A-Za-z-]+(\.[0-9A-Za-z-]+)*)?(\+[0-9A-Za-z-]+(\.[0-9A-Za-z-]+)*)?$",
    )
    .expect("semver pattern is valid")
});

static GO_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([1-9][0-9]*)\.(0|[1-9][0-9]*)(\.(0|[1-9][0-9]*))?([a-z]+[0-9]+)?$")
        .expect("go version pattern is valid")
});

static TOOLCHAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(default|go[1-9][0-9]*(\.(0|[1-9][0-9]*)){0,2}([a-z]+[0-9]+)?(-.+)?)$")
        .expect("toolchain pattern is valid")
});

const REPLACE_USAGE: &str = "usage: replace module/path [v1.2.3] => other/module v1.4 \
     or replace module/path [v1.2.3] => ../local/directory";

/// A module reference: path plus version, where an empty version on a
/// replacement target means a local directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ModuleVersion {
    pub path: String,
    pub version: String,
}

impl ModuleVersion {
    pub fn new(path: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
        }
    }
}

/// A `replace` directive: `old [version] => new [version]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replace {
    pub old: ModuleVersion,
    pub new: ModuleVersion,
    syntax: LineId,
}

impl Replace {
    /// True when the replacement points at a local directory.
    pub fn is_local(&self) -> bool {
        self.new.version.is_empty()
    }
}

/// A decoded `go.mod` file.
#[derive(Debug, Clone)]
pub struct ModFile {
    name: PathBuf,
    syntax: FileSyntax,
    module: Option<String>,
    go: Option<String>,
    toolchain: Option<String>,
    require: Vec<ModuleVersion>,
    exclude: Vec<ModuleVersion>,
    replace: Vec<Replace>,
}

impl ModFile {
    /// Parses `data` as a `go.mod` file named `name`.
    ///
    /// Every lexical, structural and directive error is collected; the
    /// file is only returned when there are none.
    pub fn parse(name: impl Into<PathBuf>, data: &[u8]) -> Result<ModFile, Diagnostics> {
        let name = name.into();
        let mut diagnostics = Diagnostics::default();

        let src = match std::str::from_utf8(data) {
            Ok(src) => src,
            Err(e) => {
                let line = data[..e.valid_up_to()].iter().filter(|b| **b == b'\n').count() + 1;
                diagnostics.push(Diagnostic {
                    file: name,
                    line,
                    message: "invalid UTF-8".to_string(),
                });
                return Err(diagnostics);
            }
        };

        let (syntax, errors) = FileSyntax::parse(src);
        for error in errors {
            diagnostics.push(Diagnostic {
                file: name.clone(),
                line: error.line,
                message: error.message,
            });
        }

        let mut file = ModFile {
            name,
            syntax,
            module: None,
            go: None,
            toolchain: None,
            require: Vec::new(),
            exclude: Vec::new(),
            replace: Vec::new(),
        };

        // Collect (verb, args, line, id) up front; the syntax tree
        // is borrowed while directives are decoded into `file`.
        let mut directives = Vec::new();
        for stmt in &file.syntax.stmts {
            match stmt {
                Stmt::Line(line) => {
                    let verb = line.tokens[0].clone();
                    directives.push((
                        verb,
                        line.tokens[1..].to_vec(),
                        line.line,
                        line.id,
                    ));
                }
                Stmt::Block(block) => {
                    if block.verb.len() != 1 {
                        diagnostics
                            .push(file.diagnostic(block.line, "unknown block type".to_string()));
                        continue;
                    }
                    let verb = &block.verb[0];
                    if matches!(verb.as_str(), "module" | "go" | "toolchain") {
                        diagnostics.push(
                            file.diagnostic(block.line, format!("{verb} directive cannot be a block")),
                        );
                        continue;
                    }
                    for entry in &block.entries {
                        if let Stmt::Line(line) = entry {
                            directives.push((
                                verb.clone(),
                                line.tokens.clone(),
                                line.line,
                                line.id,
                            ));
                        }
                    }
                }
                Stmt::Blank | Stmt::Comment(_) => {}
            }
        }

        for (verb, args, line, id) in directives {
            if let Err(message) = file.add_directive(&verb, &args, id) {
                diagnostics.push(file.diagnostic(line, message));
            }
        }

        if diagnostics.is_empty() {
            Ok(file)
        } else {
            Err(diagnostics)
        }
    }

    fn diagnostic(&self, line: usize, message: String) -> Diagnostic {
        Diagnostic {
            file: self.name.clone(),
            line,
            message,
        }
    }

    fn add_directive(
        &mut self,
        verb: &str,
        args: &[String],
        id: LineId,
    ) -> Result<(), String> {
        match verb {
            "module" => {
                if self.module.is_some() {
                    return Err("repeated module statement".to_string());
                }
                let [path] = args else {
                    return Err("usage: module module/path".to_string());
                };
                let path = parse_string(path)?;
                check_module_path(&path)?;
                self.module = Some(path);
            }
            "go" => {
                if self.go.is_some() {
                    return Err("repeated go statement".to_string());
                }
                let [version] = args else {
                    return Err("go directive expects exactly one argument".to_string());
                };
                if !GO_VERSION.is_match(version) {
                    return Err(format!(
                        "invalid go version '{version}': must match format 1.23.0"
                    ));
                }
                self.go = Some(version.clone());
            }
            "toolchain" => {
                if self.toolchain.is_some() {
                    return Err("repeated toolchain statement".to_string());
                }
                let [name] = args else {
                    return Err("toolchain directive expects exactly one argument".to_string());
                };
                if !TOOLCHAIN.is_match(name) {
                    return Err(format!(
                        "invalid toolchain version '{name}': must match format go1.23.0 or default"
                    ));
                }
                self.toolchain = Some(name.clone());
            }
            "godebug" => {
                let [setting] = args else {
                    return Err("usage: godebug key=value".to_string());
                };
                let setting = parse_string(setting)?;
                match setting.split_once('=') {
                    Some((key, _)) if !key.is_empty() => {}
                    _ => return Err("usage: godebug key=value".to_string()),
                }
            }
            "require" | "exclude" => {
                let [path, version] = args else {
                    return Err(format!("usage: {verb} module/path v1.2.3"));
                };
                let path = parse_string(path)?;
                check_module_path(&path)?;
                let version = parse_version(verb, &path, version)?;
                let module = ModuleVersion::new(path, version);
                if verb == "require" {
                    self.require.push(module);
                } else {
                    self.exclude.push(module);
                }
            }
            "replace" => {
                let (old, new) = parse_replace(args)?;
                self.replace.push(Replace { old, new, syntax: id });
            }
            "retract" => {
                if args.is_empty() {
                    return Err("usage: retract v1.2.3 or retract [v1.2.3, v1.2.4]".to_string());
                }
            }
            "tool" | "ignore" => {
                let [path] = args else {
                    return Err(format!("usage: {verb} path"));
                };
                parse_string(path)?;
            }
            _ => return Err(format!("unknown directive: {verb}")),
        }
        Ok(())
    }

    /// Path the file was parsed from; the save target.
    pub fn name(&self) -> &Path {
        &self.name
    }

    /// Replace directives in document order.
    pub fn replaces(&self) -> &[Replace] {
        &self.replace
    }

    /// Sets the replacement of the `idx`-th replace directive.
    ///
    /// Only that entry's line changes; its old target, its comment and every
    /// other directive stay as they are.
    pub fn set_replace_at(
        &mut self,
        idx: usize,
        new_path: &str,
        new_version: &str,
    ) -> Result<(), ModError> {
        let count = self.replace.len();
        let replace = self
            .replace
            .get_mut(idx)
            .ok_or(ModError::NoSuchReplace { index: idx, count })?;

        let new = ModuleVersion::new(new_path, new_version);
        let args = replace_args(&replace.old, &new)?;
        self.syntax.set_args(replace.syntax, "replace", args);
        replace.new = new;
        Ok(())
    }

    /// Sets the replacement for the old target `old_path@old_version`.
    ///
    /// The first replace with exactly that old target is updated in place
    /// (its comment is kept) and any later replace with the same old target
    /// is removed. If none exists, a new line is added after the last
    /// replace of the same module path, or at the end of the file.
    pub fn set_replace(
        &mut self,
        old_path: &str,
        old_version: &str,
        new_path: &str,
        new_version: &str,
    ) -> Result<(), ModError> {
        let old = ModuleVersion::new(old_path, old_version);
        let new = ModuleVersion::new(new_path, new_version);
        let args = replace_args(&old, &new)?;

        let mut updated = false;
        let mut hint = None;
        let mut stale = Vec::new();
        for (idx, replace) in self.replace.iter_mut().enumerate() {
            if replace.old == old {
                if updated {
                    stale.push(idx);
                    continue;
                }
                replace.new = new.clone();
                self.syntax.set_args(replace.syntax, "replace", args.clone());
                updated = true;
            }
            if replace.old.path == old_path {
                hint = Some(replace.syntax);
            }
        }

        for idx in stale.into_iter().rev() {
            let removed = self.replace.remove(idx);
            log::debug!(
                "Dropping duplicate replace for {}",
                display_target(&removed.old)
            );
            self.syntax.remove_line(removed.syntax);
        }

        if !updated {
            let syntax = self.syntax.add_line(hint, "replace", args);
            self.replace.push(Replace { old, new, syntax });
        }
        Ok(())
    }

    /// Encodes the file in canonical `go.mod` form.
    pub fn format(&self) -> Result<Vec<u8>, ModError> {
        self.syntax.format().map(String::into_bytes)
    }
}

/// Renders `path` or `path@version`.
pub fn display_target(target: &ModuleVersion) -> String {
    if target.version.is_empty() {
        target.path.clone()
    } else {
        format!("{}@{}", target.path, target.version)
    }
}

/// Whether `path` names a local directory rather than a module.
///
/// Matches `.`/`..` prefixes in either separator style, rooted paths and
/// Windows drive-letter paths.
pub fn is_directory_path(path: &str) -> bool {
    let bytes = path.as_bytes();
    path == "."
        || path.starts_with("./")
        || path.starts_with(".\\")
        || path == ".."
        || path.starts_with("../")
        || path.starts_with("..\\")
        || path.starts_with('/')
        || path.starts_with('\\')
        || (bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':')
}

fn parse_string(raw: &str) -> Result<String, String> {
    unquote(raw)
}

fn parse_version(verb: &str, path: &str, version: &str) -> Result<String, String> {
    let version = unquote(version)?;
    if SEMVER.is_match(&version) {
        Ok(version)
    } else {
        Err(format!(
            "{verb} {path}: version \"{version}\" invalid: must be of the form v1.2.3"
        ))
    }
}

fn check_module_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("malformed module path \"\": empty string".to_string());
    }
    if path.starts_with('-') || path.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(format!("malformed module path {path:?}"));
    }
    Ok(())
}

fn check_replacement(new_path: &str, new_version: &str) -> Result<(), String> {
    if new_version.is_empty() {
        if !is_directory_path(new_path) {
            return Err(
                "replacement module without version must be directory path (rooted or starting with ./ or ../)"
                    .to_string(),
            );
        }
    } else {
        if is_directory_path(new_path) {
            return Err(format!(
                "replacement module directory path {new_path:?} cannot have version"
            ));
        }
        if !SEMVER.is_match(new_version) {
            return Err(format!(
                "replace {new_path}: version \"{new_version}\" invalid: must be of the form v1.2.3"
            ));
        }
    }
    Ok(())
}

/// Validates `old => new` and renders the directive's arguments.
fn replace_args(old: &ModuleVersion, new: &ModuleVersion) -> Result<Vec<String>, ModError> {
    let invalid = |reason: String| ModError::InvalidReplace {
        path: old.path.clone(),
        reason,
    };

    check_module_path(&old.path).map_err(invalid)?;
    if !old.version.is_empty() && !SEMVER.is_match(&old.version) {
        return Err(invalid(format!("invalid version '{}'", old.version)));
    }
    if new.path.is_empty() || new.path.chars().any(char::is_control) {
        return Err(invalid(format!("invalid replacement path {:?}", new.path)));
    }
    check_replacement(&new.path, &new.version).map_err(invalid)?;

    let mut args = vec![auto_quote(&old.path)];
    if !old.version.is_empty() {
        args.push(old.version.clone());
    }
    args.push("=>".to_string());
    args.push(auto_quote(&new.path));
    if !new.version.is_empty() {
        args.push(new.version.clone());
    }
    Ok(args)
}

fn parse_replace(args: &[String]) -> Result<(ModuleVersion, ModuleVersion), String> {
    let arrow = match args {
        [_, arrow, ..] if arrow == "=>" => 1,
        [_, _, arrow, ..] if arrow == "=>" => 2,
        _ => return Err(REPLACE_USAGE.to_string()),
    };
    if args.len() < arrow + 2 || args.len() > arrow + 3 {
        return Err(REPLACE_USAGE.to_string());
    }

    let old_path = parse_string(&args[0])?;
    check_module_path(&old_path)?;
    let old_version = if arrow == 2 {
        parse_version("replace", &old_path, &args[1])?
    } else {
        String::new()
    };

    let new_path = parse_string(&args[arrow + 1])?;
    let new_version = match args.get(arrow + 2) {
        Some(version) => unquote(version)?,
        None => String::new(),
    };
    check_replacement(&new_path, &new_version)?;

    Ok((
        ModuleVersion::new(old_path, old_version),
        ModuleVersion::new(new_path, new_version),
    ))
}
