//! Content hashing and the persisted analysis cache.
//!
//! One JSON document lives at the analyzed root (`.treeline_cache.json`),
//! keyed by directory name. It is read once at the start of a run and
//! written once at the end; there are never concurrent writers. A corrupt
//! document is logged and treated as empty.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::checkers::QualityIssue;
use crate::core::{FileSet, Result};
use crate::graph::AnalysisBundle;

pub const CACHE_FILE: &str = ".treeline_cache.json";

/// Cached state for one analyzed directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheEntry {
    /// File path → xxh3 content hash from the previous run.
    pub hashes: BTreeMap<String, String>,
    /// Per-file issues from the previous run, reusable for unchanged files.
    pub issues: Vec<QualityIssue>,
    /// The last bundle handed to the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle: Option<AnalysisBundle>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheDocument {
    entries: BTreeMap<String, CacheEntry>,
}

/// The on-disk cache document for one root directory.
pub struct CacheStore {
    path: PathBuf,
    document: CacheDocument,
}

impl CacheStore {
    /// Read the cache next to `root`. Missing or corrupt files yield an
    /// empty store.
    pub fn load(root: &Path) -> Self {
        let path = root.join(CACHE_FILE);
        let document = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(document) => document,
                Err(e) => {
                    tracing::warn!(file = %path.display(), "ignoring corrupt cache file: {e}");
                    CacheDocument::default()
                }
            },
            Err(_) => CacheDocument::default(),
        };
        Self { path, document }
    }

    pub fn entry(&self, key: &str) -> Option<&CacheEntry> {
        self.document.entries.get(key)
    }

    pub fn insert(&mut self, key: String, entry: CacheEntry) {
        self.document.entries.insert(key, entry);
    }

    pub fn save(&self) -> Result<()> {
        let text = serde_json::to_string(&self.document)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

/// Cache key for a root directory: its final path component.
pub fn directory_key(root: &Path) -> String {
    root.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.to_string_lossy().into_owned())
}

/// xxh3 hash of every file in the set, keyed by path. Unreadable files are
/// simply absent, which makes them look "changed" on the next run.
pub fn hash_files(files: &FileSet) -> BTreeMap<String, String> {
    files
        .files()
        .par_iter()
        .filter_map(|path| {
            let content = fs::read(path).ok()?;
            Some((
                path.to_string_lossy().into_owned(),
                format!("{:016x}", xxh3_64(&content)),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = CacheStore::load(dir.path());
        assert!(store.entry("proj").is_none());

        let mut hashes = BTreeMap::new();
        hashes.insert("a.py".to_string(), "00ff".to_string());
        store.insert(
            "proj".to_string(),
            CacheEntry {
                hashes: hashes.clone(),
                issues: Vec::new(),
                bundle: None,
            },
        );
        store.save().unwrap();

        let reloaded = CacheStore::load(dir.path());
        assert_eq!(reloaded.entry("proj").unwrap().hashes, hashes);
    }

    #[test]
    fn test_corrupt_cache_treated_as_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CACHE_FILE), "{not json").unwrap();
        let store = CacheStore::load(dir.path());
        assert!(store.entry("proj").is_none());
    }

    #[test]
    fn test_hashes_track_content_changes() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.py"), "x = 1\n").unwrap();
        let files = FileSet::from_path(dir.path()).unwrap();

        let before = hash_files(&files);
        assert_eq!(before.len(), 1);
        assert_eq!(hash_files(&files), before);

        fs::write(dir.path().join("a.py"), "x = 2\n").unwrap();
        let after = hash_files(&files);
        assert_ne!(before, after);
        assert_eq!(before.keys().collect::<Vec<_>>(), after.keys().collect::<Vec<_>>());
    }

    #[test]
    fn test_directory_key_is_final_component() {
        assert_eq!(directory_key(Path::new("/tmp/project")), "project");
    }
}
