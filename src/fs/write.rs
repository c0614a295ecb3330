//! Atomic file replacement.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Replaces the contents of `path` with `contents`.
///
/// The bytes go to a temporary file in the same directory, which is synced
/// and then renamed over `path`. Permissions of an existing file are kept,
/// and a symlinked `path` has its target replaced rather than the link.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(&target).ok().map(|m| m.permissions());

    let mut temp = tempfile::Builder::new()
        .prefix(".gomod-absolutize")
        .suffix(".tmp")
        .tempfile_in(parent)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;

    if let Some(permissions) = permissions {
        fs::set_permissions(temp.path(), permissions)?;
    }

    temp.persist(&target).map_err(|e| e.error)?;
    log::debug!("Wrote {} bytes to {}", contents.len(), target.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_replaces_contents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("go.mod");
        fs::write(&path, "module old\n").unwrap();

        write_atomic(&path, b"module new\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "module new\n");
        // No temporary files left behind.
        let entries: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_write_atomic_creates_missing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("go.mod");

        write_atomic(&path, b"module m\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "module m\n");
    }

    #[test]
    fn test_write_atomic_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing").join("go.mod");

        assert!(write_atomic(&path, b"module m\n").is_err());
    }

    #[test]
    #[cfg(unix)]
    fn test_write_atomic_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("go.mod");
        fs::write(&path, "module old\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        write_atomic(&path, b"module new\n").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[test]
    #[cfg(unix)]
    fn test_write_atomic_follows_symlink() {
        let temp = TempDir::new().unwrap();
        let real = temp.path().join("real.mod");
        let link = temp.path().join("go.mod");
        fs::write(&real, "module old\n").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        write_atomic(&link, b"module new\n").unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&real).unwrap(), "module new\n");
    }
}
