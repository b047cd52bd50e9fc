//! File set for collecting Python files to analyze.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use super::{Error, IgnoreList, Result};

/// A sorted set of Python files under one root, with ignore patterns applied.
#[derive(Debug, Clone)]
pub struct FileSet {
    /// Root directory.
    root: PathBuf,
    /// All files in the set, sorted for deterministic ordering.
    files: Vec<PathBuf>,
}

impl FileSet {
    /// Discover `*.py` files under a directory, honoring `.treeline-ignore`
    /// plus the built-in default patterns.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(Error::DirectoryNotFound {
                path: path.to_path_buf(),
            });
        }
        let root = path.canonicalize()?;
        let ignore_list = IgnoreList::for_directory(&root);

        let mut files = Vec::new();
        let walker = WalkBuilder::new(&root)
            .standard_filters(false)
            .hidden(false)
            .build();

        for entry in walker.flatten() {
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some("py") {
                continue;
            }

            // Ignore patterns match against the path relative to the root.
            let rel = path.strip_prefix(&root).unwrap_or(path);
            if ignore_list.matches(rel) {
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();

        Ok(Self { root, files })
    }

    /// Get the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get all files in the set.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Get the number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the file set is empty.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate over files.
    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.files.iter()
    }

    /// Get relative path from root.
    pub fn relative_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root)
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|_| path.to_path_buf())
    }

    /// Dotted module name for a file: path relative to root, separators
    /// replaced with `.`, `.py` suffix stripped.
    pub fn module_name(&self, path: &Path) -> String {
        let rel = self.relative_path(path);
        let no_ext = rel.with_extension("");
        no_ext
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl<'a> IntoIterator for &'a FileSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_set_empty() {
        let temp = tempfile::tempdir().unwrap();
        let file_set = FileSet::from_path(temp.path()).unwrap();
        assert!(file_set.is_empty());
    }

    #[test]
    fn test_file_set_only_python() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("main.py"), "x = 1").unwrap();
        std::fs::write(temp.path().join("README.md"), "# readme").unwrap();

        let file_set = FileSet::from_path(temp.path()).unwrap();
        assert_eq!(file_set.len(), 1);
    }

    #[test]
    fn test_missing_root_is_hard_error() {
        let result = FileSet::from_path("/definitely/not/here");
        assert!(matches!(result, Err(Error::DirectoryNotFound { .. })));
    }

    #[test]
    fn test_default_ignores_exclude_pycache() {
        let temp = tempfile::tempdir().unwrap();
        let cache_dir = temp.path().join("__pycache__");
        std::fs::create_dir(&cache_dir).unwrap();
        std::fs::write(cache_dir.join("mod.py"), "x = 1").unwrap();
        std::fs::write(temp.path().join("mod.py"), "x = 1").unwrap();

        let file_set = FileSet::from_path(temp.path()).unwrap();
        assert_eq!(file_set.len(), 1);
    }

    #[test]
    fn test_module_name_from_nested_path() {
        let temp = tempfile::tempdir().unwrap();
        let pkg = temp.path().join("pkg").join("sub");
        std::fs::create_dir_all(&pkg).unwrap();
        let file = pkg.join("mod.py");
        std::fs::write(&file, "x = 1").unwrap();

        let file_set = FileSet::from_path(temp.path()).unwrap();
        assert_eq!(file_set.module_name(&file_set.files()[0]), "pkg.sub.mod");
    }

    #[test]
    fn test_user_ignore_file_excludes_directory() {
        let temp = tempfile::tempdir().unwrap();
        let skipped = temp.path().join("skipped");
        std::fs::create_dir(&skipped).unwrap();
        std::fs::write(skipped.join("hidden.py"), "x = 1").unwrap();
        std::fs::write(temp.path().join("kept.py"), "x = 1").unwrap();
        std::fs::write(temp.path().join(".treeline-ignore"), "skipped/\n").unwrap();

        let file_set = FileSet::from_path(temp.path()).unwrap();
        assert_eq!(file_set.len(), 1);
        assert!(file_set.files()[0].ends_with("kept.py"));
    }
}
