//! Glob patterns with a walk base.
//!
//! A pattern such as `src/assets/images/**/*` has base `src/assets/images`:
//! the leading components free of glob metacharacters. Matched files keep
//! their path relative to the base when written to an output directory.

use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobMatcher};
use jwalk::WalkDir;

use super::PathError;

const GLOB_META: &[char] = &['*', '?', '[', ']', '{', '}', '!'];

/// A compiled glob anchored at the project root.
#[derive(Debug, Clone)]
pub struct Pattern {
    /// Original pattern text, root-relative, `/`-separated.
    raw: String,
    /// Root-relative directory the walk starts from.
    base: PathBuf,
    matcher: GlobMatcher,
    /// Literal patterns name exactly one file.
    literal: bool,
}

impl Pattern {
    /// Compile a root-relative glob pattern.
    pub fn new(raw: &str) -> Result<Self, PathError> {
        let matcher = Glob::new(raw)
            .map_err(|e| PathError::Glob(raw.to_string(), e.to_string()))?
            .compile_matcher();

        let literal = !raw.contains(GLOB_META);
        let base = if literal {
            Path::new(raw).parent().map(Path::to_path_buf).unwrap_or_default()
        } else {
            raw.split('/')
                .take_while(|part| !part.contains(GLOB_META))
                .collect()
        };

        Ok(Self {
            raw: raw.to_string(),
            base,
            matcher,
            literal,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Root-relative walk base.
    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn is_literal(&self) -> bool {
        self.literal
    }

    /// Match a root-relative path.
    pub fn is_match(&self, relative: &Path) -> bool {
        self.matcher.is_match(relative)
    }

    /// Match an absolute path, resolved against `root`.
    pub fn matches_under(&self, root: &Path, path: &Path) -> bool {
        path.strip_prefix(root)
            .map(|rel| self.is_match(rel))
            .unwrap_or(false)
    }

    /// Path of `file` relative to the pattern base (the part preserved in output).
    pub fn relative_to_base<'a>(&self, root: &Path, file: &'a Path) -> Option<&'a Path> {
        file.strip_prefix(root.join(&self.base)).ok()
    }

    /// Collect matching files under `root`, sorted for deterministic output.
    ///
    /// A missing base directory yields an empty set.
    pub fn collect(&self, root: &Path) -> Vec<PathBuf> {
        if self.literal {
            let file = root.join(&self.raw);
            return if file.is_file() { vec![file] } else { Vec::new() };
        }

        let base = root.join(&self.base);
        if !base.is_dir() {
            return Vec::new();
        }

        let mut files: Vec<PathBuf> = WalkDir::new(&base)
            .skip_hidden(false)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.path())
            .filter(|path| self.matches_under(root, path))
            .collect();
        files.sort();
        files
    }
}

/// Join a root-relative directory and a `/`-separated glob suffix into one pattern string.
pub fn join_pattern(dir: &Path, suffix: &str) -> String {
    let mut parts: Vec<String> = dir
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    parts.extend(suffix.split('/').filter(|s| !s.is_empty()).map(str::to_string));
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_base_of_recursive_glob() {
        let pattern = Pattern::new("src/assets/images/**/*").unwrap();
        assert_eq!(pattern.base(), Path::new("src/assets/images"));
        assert!(!pattern.is_literal());
    }

    #[test]
    fn test_base_of_literal() {
        let pattern = Pattern::new("src/assets/sass/main.sass").unwrap();
        assert_eq!(pattern.base(), Path::new("src/assets/sass"));
        assert!(pattern.is_literal());
    }

    #[test]
    fn test_alternation_match() {
        let pattern = Pattern::new("src/**/*.{sass,scss,css}").unwrap();
        assert!(pattern.is_match(Path::new("src/assets/sass/main.sass")));
        assert!(pattern.is_match(Path::new("src/a/b/c.css")));
        assert!(!pattern.is_match(Path::new("src/assets/js/index.js")));
    }

    #[test]
    fn test_matches_under_root() {
        let pattern = Pattern::new("src/views/**/*.pug").unwrap();
        let root = Path::new("/project");
        assert!(pattern.matches_under(root, Path::new("/project/src/views/pages/index.pug")));
        assert!(!pattern.matches_under(root, Path::new("/elsewhere/src/views/index.pug")));
    }

    #[test]
    fn test_join_pattern() {
        assert_eq!(
            join_pattern(Path::new("src"), "assets/images/**/*"),
            "src/assets/images/**/*"
        );
        assert_eq!(join_pattern(Path::new("./src"), "**/*.js"), "src/**/*.js");
        assert_eq!(join_pattern(Path::new("site/src"), "a.sass"), "site/src/a.sass");
    }

    #[test]
    fn test_collect_and_relative_paths() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("src/img/nested")).unwrap();
        fs::write(root.join("src/img/a.png"), b"a").unwrap();
        fs::write(root.join("src/img/nested/b.png"), b"b").unwrap();

        let pattern = Pattern::new("src/img/**/*").unwrap();
        let files = pattern.collect(root);
        assert_eq!(files.len(), 2);

        let rel: Vec<_> = files
            .iter()
            .map(|f| pattern.relative_to_base(root, f).unwrap().to_path_buf())
            .collect();
        assert!(rel.contains(&PathBuf::from("a.png")));
        assert!(rel.contains(&PathBuf::from("nested/b.png")));
    }

    #[test]
    fn test_collect_missing_base_is_empty() {
        let temp = TempDir::new().unwrap();
        let pattern = Pattern::new("src/fonts/**/*").unwrap();
        assert!(pattern.collect(temp.path()).is_empty());
    }
}
