//! Rewriting relative `replace` targets as absolute paths.
//!
//! A replace qualifies when its replacement has no version (it points at a
//! local directory) and the directory is not already absolute:
//!
//! ```text
//! replace example.com/lib => ../lib              // rewritten
//! replace example.com/lib => /abs/lib            // already absolute
//! replace example.com/lib => example.com/fork v1.0.1   // pinned, never touched
//! ```
//!
//! Entries are processed in document order and each qualifying entry is
//! edited through [`ModFile::set_replace_at`]: only its own line changes, so
//! the old target, any comment on the line and every other replace (even one
//! with the same old target) are kept.

use crate::gomod::{ModError, ModFile, Replace, display_target};
use crate::paths;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One rewritten replace target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// Old target of the replace, `path` or `path@version`.
    pub module: String,
    pub old_path: String,
    pub new_path: String,
}

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error(transparent)]
    Codec(#[from] ModError),

    #[error("resolved path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),
}

/// Whether `replace` points at a relative local directory.
pub fn qualifies(replace: &Replace) -> bool {
    replace.is_local() && !Path::new(&replace.new.path).is_absolute()
}

/// Rewrites every qualifying replace target relative to `working_dir`.
///
/// `on_replace` sees each substitution before it is applied. The first
/// failing edit stops the walk; edits made before it are kept.
pub fn rewrite_relative_paths(
    file: &mut ModFile,
    working_dir: &Path,
    mut on_replace: impl FnMut(&Substitution),
) -> Result<Vec<Substitution>, RewriteError> {
    let mut substitutions = Vec::new();

    for idx in 0..file.replaces().len() {
        let replace = &file.replaces()[idx];
        if !qualifies(replace) {
            log::debug!(
                "Skipping {} => {}",
                display_target(&replace.old),
                display_target(&replace.new)
            );
            continue;
        }

        let old = replace.old.clone();
        let current = replace.new.path.clone();
        let resolved = paths::resolve(working_dir, &current);
        let new_path = resolved
            .to_str()
            .ok_or_else(|| RewriteError::NonUtf8Path(resolved.clone()))?
            .to_string();

        let substitution = Substitution {
            module: display_target(&old),
            old_path: current,
            new_path,
        };
        log::info!(
            "Replacing {} with {} for {}",
            substitution.old_path,
            substitution.new_path,
            substitution.module
        );
        on_replace(&substitution);

        file.set_replace_at(idx, &substitution.new_path, "")?;
        substitutions.push(substitution);
    }

    Ok(substitutions)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::gomod::ModuleVersion;

    const GO_MOD: &str = "module example.com/app

go 1.21

replace (
\tgithub.com/x/a => ../a
\tgithub.com/x/b => ./b // local checkout
\tgithub.com/x/c => github.com/x/c v1.0.1
\tgithub.com/x/d => /some/absolute/path/unix
)
";

    fn parse(src: &str) -> ModFile {
        ModFile::parse("go.mod", src.as_bytes()).unwrap()
    }

    fn rewrite(file: &mut ModFile) -> Vec<Substitution> {
        rewrite_relative_paths(file, Path::new("/test/dummy/abs"), |_| {}).unwrap()
    }

    #[test]
    fn test_rewrites_relative_local_paths() {
        let mut file = parse(GO_MOD);
        let substitutions = rewrite(&mut file);

        let replaces = file.replaces();
        assert_eq!(replaces[0].new, ModuleVersion::new("/test/dummy/a", ""));
        assert_eq!(replaces[1].new, ModuleVersion::new("/test/dummy/abs/b", ""));
        assert_eq!(substitutions.len(), 2);
        assert_eq!(substitutions[0].module, "github.com/x/a");
        assert_eq!(substitutions[0].old_path, "../a");
        assert_eq!(substitutions[0].new_path, "/test/dummy/a");
    }

    #[test]
    fn test_pinned_and_absolute_entries_untouched() {
        let mut file = parse(GO_MOD);
        rewrite(&mut file);

        let replaces = file.replaces();
        assert_eq!(replaces[2].new, ModuleVersion::new("github.com/x/c", "v1.0.1"));
        assert_eq!(
            replaces[3].new,
            ModuleVersion::new("/some/absolute/path/unix", "")
        );
    }

    #[test]
    fn test_order_and_keys_preserved() {
        let mut file = parse(GO_MOD);
        let before: Vec<_> = file.replaces().iter().map(|r| r.old.clone()).collect();
        rewrite(&mut file);
        let after: Vec<_> = file.replaces().iter().map(|r| r.old.clone()).collect();
        assert_eq!(before, after);

        let text = String::from_utf8(file.format().unwrap()).unwrap();
        assert!(text.contains("\tgithub.com/x/b => /test/dummy/abs/b // local checkout\n"));
    }

    #[test]
    fn test_versioned_old_target_is_kept() {
        let mut file = parse("replace github.com/x/a v1.2.3 => ../a\n");
        rewrite(&mut file);
        assert_eq!(
            String::from_utf8(file.format().unwrap()).unwrap(),
            "replace github.com/x/a v1.2.3 => /test/dummy/a\n"
        );
    }

    #[test]
    fn test_second_pass_is_a_no_op() {
        let mut file = parse(GO_MOD);
        rewrite(&mut file);
        let first = file.format().unwrap();

        let mut again = ModFile::parse("go.mod", &first).unwrap();
        assert!(rewrite(&mut again).is_empty());
        assert_eq!(again.format().unwrap(), first);
    }

    #[test]
    fn test_reporter_sees_substitutions_in_order() {
        let mut file = parse(GO_MOD);
        let mut seen = Vec::new();
        rewrite_relative_paths(&mut file, Path::new("/w"), |s| {
            seen.push(s.old_path.clone());
        })
        .unwrap();
        assert_eq!(seen, vec!["../a", "./b"]);
    }

    #[test]
    fn test_duplicate_old_targets_rewritten_independently() {
        let mut file = parse("replace a => ../one\nreplace a => ../two\n");
        let substitutions = rewrite(&mut file);
        assert_eq!(substitutions.len(), 2);
        assert_eq!(
            String::from_utf8(file.format().unwrap()).unwrap(),
            "replace a => /test/dummy/one\nreplace a => /test/dummy/two\n"
        );
    }

    #[test]
    fn test_entry_after_duplicate_key_is_visited() {
        let mut file = parse("replace a => /abs/a\nreplace a => ../two\nreplace b => ../b\n");
        let substitutions = rewrite_relative_paths(&mut file, Path::new("/w/app"), |_| {}).unwrap();

        let rewritten: Vec<_> = substitutions.iter().map(|s| s.old_path.as_str()).collect();
        assert_eq!(rewritten, vec!["../two", "../b"]);
        assert_eq!(
            String::from_utf8(file.format().unwrap()).unwrap(),
            "replace a => /abs/a\nreplace a => /w/two\nreplace b => /w/b\n"
        );
    }

    #[test]
    fn test_pinned_entry_with_same_key_untouched() {
        let mut file = parse("replace a => c v1.0.1\nreplace a => ../two\n");
        let substitutions = rewrite_relative_paths(&mut file, Path::new("/w/app"), |_| {}).unwrap();

        assert_eq!(substitutions.len(), 1);
        assert_eq!(file.replaces()[0].new, ModuleVersion::new("c", "v1.0.1"));
        assert_eq!(
            String::from_utf8(file.format().unwrap()).unwrap(),
            "replace a => c v1.0.1\nreplace a => /w/two\n"
        );
    }

    #[test]
    fn test_nothing_to_rewrite() {
        let src = "module m\n\nreplace a => /abs/a\n";
        let mut file = parse(src);
        assert!(rewrite(&mut file).is_empty());
        assert_eq!(file.format().unwrap(), src.as_bytes());
    }
}
