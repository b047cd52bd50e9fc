//! Line-based duplicate detection across a whole file set.
//!
//! Unlike the per-file checkers this runs over every analyzed file at once:
//! each distinct trimmed line is bucketed, and any line whose occurrence
//! count exceeds the threshold yields one issue per occurrence. Always
//! recomputed in full, never served from cache, since a change in one file
//! shifts the counts for every other.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::Config;

use super::{IssueCategory, LineLocation, QualityIssue};

/// Longest line fragment quoted in an issue description.
const SNIPPET_LEN: usize = 60;

pub struct DuplicationScanner {
    threshold: usize,
}

impl DuplicationScanner {
    pub fn new(config: &Config) -> Self {
        Self {
            threshold: config.max_duplicated_lines,
        }
    }

    /// Scan `(path, content)` pairs and report every occurrence of each
    /// over-duplicated line. Blank lines are skipped; indentation is
    /// ignored when comparing.
    pub fn scan(&self, files: &[(PathBuf, String)]) -> Vec<QualityIssue> {
        let mut buckets: BTreeMap<&str, Vec<LineLocation>> = BTreeMap::new();
        for (path, content) in files {
            for (i, line) in content.lines().enumerate() {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                buckets.entry(trimmed).or_default().push(LineLocation {
                    file: path.clone(),
                    line: i as u32 + 1,
                });
            }
        }

        let mut issues = Vec::new();
        for (line_text, occurrences) in buckets {
            let count = occurrences.len();
            if count <= self.threshold {
                continue;
            }
            let snippet = snippet_of(line_text);
            for loc in occurrences {
                issues.push(QualityIssue {
                    category: IssueCategory::Duplication,
                    description: format!("Duplicated line appearing {count} times: '{snippet}'"),
                    file: loc.file.to_string_lossy().into_owned(),
                    line: Some(loc.line),
                });
            }
        }
        issues
    }
}

fn snippet_of(line: &str) -> String {
    if line.chars().count() <= SNIPPET_LEN {
        line.to_string()
    } else {
        let cut: String = line.chars().take(SNIPPET_LEN).collect();
        format!("{cut}...")
    }
}
