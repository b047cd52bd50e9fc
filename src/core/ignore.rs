//! Ignore-pattern handling for `.treeline-ignore` files.
//!
//! Three pattern forms are supported:
//! - `dir/` matches any ancestor directory component by exact name
//! - `*.ext` matches files by suffix
//! - anything else matches as a case-sensitive substring of the full path

use std::path::Path;

/// Patterns that are always applied in addition to user patterns.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "venv/",
    ".venv/",
    "env/",
    "node_modules/",
    "__pycache__/",
    ".git/",
    ".svn/",
    "build/",
    "dist/",
    "*.pyc",
    "*.pyo",
    "*.log",
];

/// Name of the per-directory ignore file.
pub const IGNORE_FILE: &str = ".treeline-ignore";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pattern {
    /// `dir/` — exact ancestor directory component.
    Dir(String),
    /// `*.ext` — file suffix.
    Suffix(String),
    /// Case-sensitive substring of the full path string.
    Substring(String),
}

impl Pattern {
    fn parse(raw: &str) -> Self {
        if let Some(dir) = raw.strip_suffix('/') {
            Pattern::Dir(dir.to_string())
        } else if let Some(suffix) = raw.strip_prefix("*.") {
            Pattern::Suffix(format!(".{suffix}"))
        } else {
            Pattern::Substring(raw.to_string())
        }
    }
}

/// Compiled set of ignore patterns for one analysis root.
#[derive(Debug, Clone)]
pub struct IgnoreList {
    patterns: Vec<Pattern>,
}

impl IgnoreList {
    /// Build from the default set plus the root's `.treeline-ignore`, if any.
    pub fn for_directory(root: &Path) -> Self {
        let mut patterns: Vec<Pattern> = DEFAULT_IGNORE_PATTERNS
            .iter()
            .map(|p| Pattern::parse(p))
            .collect();

        let ignore_file = root.join(IGNORE_FILE);
        if let Ok(content) = std::fs::read_to_string(&ignore_file) {
            for line in content.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                patterns.push(Pattern::parse(line));
            }
        }

        Self { patterns }
    }

    /// Build from explicit pattern strings (defaults are not added).
    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| Pattern::parse(p.as_ref()))
                .collect(),
        }
    }

    /// Whether a path should be excluded from analysis.
    pub fn matches(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        self.patterns.iter().any(|pattern| match pattern {
            Pattern::Dir(name) => path
                .parent()
                .map(|parent| {
                    parent
                        .components()
                        .any(|c| c.as_os_str().to_string_lossy() == *name)
                })
                .unwrap_or(false),
            Pattern::Suffix(suffix) => path_str.ends_with(suffix.as_str()),
            Pattern::Substring(sub) => path_str.contains(sub.as_str()),
        })
    }
}
