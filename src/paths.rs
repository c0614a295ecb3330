//! Lexical path resolution.
//!
//! Nothing here touches the file system: paths are joined and normalized
//! as strings using the host's separator rules.

use std::path::{Component, Path, PathBuf};

/// Resolves `candidate` against `working_dir`.
///
/// Absolute candidates are returned unchanged. Relative ones are joined to
/// `working_dir` and then [`clean`]ed. On Windows a rooted candidate without
/// a drive (`\lib`) is not absolute; it is appended below `working_dir`
/// rather than replacing everything but the drive.
///
/// # Examples
///
/// ```
/// # use gomod_absolutize::paths::resolve;
/// # use std::path::Path;
/// assert_eq!(
///     resolve(Path::new("work/app"), "../lib"),
///     Path::new("work/lib")
/// );
/// ```
pub fn resolve(working_dir: &Path, candidate: &str) -> PathBuf {
    let candidate = Path::new(candidate);
    if candidate.is_absolute() {
        return candidate.to_path_buf();
    }
    if candidate.has_root() {
        // `join` would keep only the drive of `working_dir`.
        let mut joined = working_dir.to_path_buf();
        joined.extend(candidate.components().skip_while(|c| {
            matches!(c, Component::RootDir | Component::Prefix(_))
        }));
        return clean(&joined);
    }
    clean(&working_dir.join(candidate))
}

/// Lexically normalizes a path.
///
/// - `.` components and repeated separators are dropped
/// - `..` removes the preceding normal component
/// - `..` directly under the root is dropped
/// - leading `..` of a relative path is kept
/// - an empty result becomes `.`
pub fn clean(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn test_resolve_relative() {
        let wd = Path::new("/test/dummy/abs");
        assert_eq!(resolve(wd, "../a"), PathBuf::from("/test/dummy/a"));
        assert_eq!(resolve(wd, "./b"), PathBuf::from("/test/dummy/abs/b"));
        assert_eq!(resolve(wd, "."), PathBuf::from("/test/dummy/abs"));
        assert_eq!(resolve(wd, "b//c/./d/.."), PathBuf::from("/test/dummy/abs/b/c"));
    }

    #[test]
    #[cfg(unix)]
    fn test_resolve_absolute_is_unchanged() {
        let wd = Path::new("/test/dummy/abs");
        assert_eq!(
            resolve(wd, "/some/absolute/path/unix"),
            PathBuf::from("/some/absolute/path/unix")
        );
        // Not cleaned either.
        assert_eq!(resolve(wd, "/x/../y"), PathBuf::from("/x/../y"));
    }

    #[test]
    #[cfg(unix)]
    fn test_clean() {
        assert_eq!(clean(Path::new("/../../a")), PathBuf::from("/a"));
        assert_eq!(clean(Path::new("../../a")), PathBuf::from("../../a"));
        assert_eq!(clean(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(clean(Path::new("a/..")), PathBuf::from("."));
        assert_eq!(clean(Path::new("")), PathBuf::from("."));
        assert_eq!(clean(Path::new("/")), PathBuf::from("/"));
    }

    #[test]
    #[cfg(windows)]
    fn test_resolve_windows() {
        let wd = Path::new(r"C:\test\dummy\abs");
        assert_eq!(resolve(wd, r"..\a"), PathBuf::from(r"C:\test\dummy\a"));
        assert_eq!(resolve(wd, "../a"), PathBuf::from(r"C:\test\dummy\a"));
        assert_eq!(
            resolve(wd, r"C:\some\absolute\path"),
            PathBuf::from(r"C:\some\absolute\path")
        );
    }

    #[test]
    #[cfg(windows)]
    fn test_resolve_windows_rooted_without_drive() {
        let wd = Path::new(r"C:\w");
        assert_eq!(resolve(wd, r"\foo"), PathBuf::from(r"C:\w\foo"));
        assert_eq!(resolve(wd, "/foo/../bar"), PathBuf::from(r"C:\w\bar"));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let wd = std::env::temp_dir();
        let once = resolve(&wd, "../sibling");
        let twice = resolve(&wd, once.to_str().unwrap());
        assert_eq!(once, twice);
    }
}
