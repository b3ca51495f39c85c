//! Filesystem utilities.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
///
/// Existing contents are replaced.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }
    fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))
}

/// Canonicalize a path, but don't fail if it doesn't exist yet.
/// Returns the path as-is if canonicalization fails.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Make `path` absolute against `base` without touching the filesystem.
///
/// `.` components are dropped; `..` is kept as written.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    joined
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_string_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a").join("b").join("out.py");

        write_string(&path, "X = 1\n").unwrap();
        assert_eq!(read_to_string(&path).unwrap(), "X = 1\n");

        write_string(&path, "Y = 2\n").unwrap();
        assert_eq!(read_to_string(&path).unwrap(), "Y = 2\n");
    }

    #[test]
    fn test_read_missing_file_names_path() {
        let tmp = TempDir::new().unwrap();
        let err = read_to_string(&tmp.path().join("nope.h")).unwrap_err();
        assert!(err.to_string().contains("nope.h"));
    }

    #[test]
    #[cfg(unix)]
    fn test_absolutize() {
        let base = Path::new("/project");
        assert_eq!(
            absolutize(base, Path::new("include/a.h")),
            PathBuf::from("/project/include/a.h")
        );
        assert_eq!(absolutize(base, Path::new("/abs")), PathBuf::from("/abs"));
        assert_eq!(
            absolutize(base, Path::new("./src/.")).to_string_lossy(),
            "/project/src"
        );
        assert_eq!(absolutize(base, Path::new(".")), PathBuf::from("/project"));
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path(Path::new("/project"), Path::new("/project/pkg/_constants.py")),
            PathBuf::from("pkg/_constants.py")
        );
    }
}
