//! Source file representation.

use std::path::{Path, PathBuf};

use super::{Error, Result};

/// A Python source file with its content loaded.
///
/// Ephemeral: created per analysis pass and discarded after extraction.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path to the file.
    pub path: PathBuf,
    /// File content as bytes.
    pub content: Vec<u8>,
}

impl SourceFile {
    /// Load a source file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.extension().and_then(|e| e.to_str()) != Some("py") {
            return Err(Error::NotPython {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            content,
        })
    }

    /// Create from existing content.
    pub fn from_content(path: impl Into<PathBuf>, content: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            content,
        }
    }

    /// Get content as string (lossy conversion).
    pub fn content_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }

    /// Count total lines.
    pub fn total_lines(&self) -> usize {
        self.content_str().lines().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_file_from_content() {
        let content = b"def main():\n    print('hello')\n".to_vec();
        let file = SourceFile::from_content("test.py", content);

        assert_eq!(file.total_lines(), 2);
        assert!(file.content_str().contains("def main"));
    }

    #[test]
    fn test_load_rejects_non_python() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("readme.md");
        std::fs::write(&path, "# readme").unwrap();

        assert!(matches!(
            SourceFile::load(&path),
            Err(Error::NotPython { .. })
        ));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = SourceFile::load("/nonexistent/thing.py");
        assert!(result.is_err());
    }
}
