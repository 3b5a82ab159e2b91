//! Filesystem path normalization.

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute, symlink-free form.
///
/// Tries `canonicalize()` first. A path that no longer exists (a removed
/// file) canonicalizes its parent and re-appends the file name, so events
/// for deleted files still land under the canonical project root.
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
pub fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }

    if let (Some(parent), Some(name)) = (path.parent(), path.file_name())
        && let Ok(parent) = parent.canonicalize()
    {
        return parent.join(name);
    }

    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_path_relative() {
        let normalized = normalize_path(Path::new("relative/path/file.txt"));
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_path_missing_absolute() {
        let path = Path::new("/definitely/missing/file.txt");
        assert_eq!(normalize_path(path), path);
    }

    #[cfg(unix)]
    #[test]
    fn test_normalize_path_resolves_symlinked_dir() {
        let temp = TempDir::new().unwrap();
        let real = temp.path().join("real");
        fs::create_dir_all(&real).unwrap();
        fs::write(real.join("a.js"), "").unwrap();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let canonical = real.canonicalize().unwrap();
        assert_eq!(normalize_path(&link.join("a.js")), canonical.join("a.js"));
        // removed file: parent still resolves
        assert_eq!(normalize_path(&link.join("gone.js")), canonical.join("gone.js"));
    }
}
