//! Metric checkers.
//!
//! Each checker reads one parsed file and appends tagged issues to a shared
//! sink. Checkers are independent: a fault inside one is logged and must not
//! stop the others (see [`run_checkers`]).

pub mod complexity;
pub mod duplication;
pub mod security;
pub mod smells;
pub mod style;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::parser::ParseResult;

pub use complexity::ComplexityChecker;
pub use duplication::DuplicationScanner;
pub use security::SecurityChecker;
pub use smells::CodeSmellChecker;
pub use style::StyleChecker;

/// Category tag for a detected issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Complexity,
    CodeSmells,
    Security,
    Duplication,
    Style,
    /// File could not be read.
    File,
    /// File could not be parsed.
    Parsing,
}

impl std::fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Complexity => "complexity",
            Self::CodeSmells => "code_smells",
            Self::Security => "security",
            Self::Duplication => "duplication",
            Self::Style => "style",
            Self::File => "file",
            Self::Parsing => "parsing",
        };
        f.write_str(s)
    }
}

/// A tagged (category, description, file, optional line) record describing a
/// detected defect or risk. Append-only per analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityIssue {
    pub category: IssueCategory,
    pub description: String,
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// Shared append-only collection of issues for one analysis unit.
#[derive(Debug, Default)]
pub struct IssueSink {
    issues: Vec<QualityIssue>,
}

impl IssueSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one issue.
    pub fn push(
        &mut self,
        category: IssueCategory,
        description: impl Into<String>,
        file: &Path,
        line: Option<u32>,
    ) {
        self.issues.push(QualityIssue {
            category,
            description: description.into(),
            file: file.to_string_lossy().into_owned(),
            line,
        });
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[QualityIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<QualityIssue> {
        self.issues
    }
}

/// A single metric checker over one parsed file.
///
/// Implementations are read-only with respect to the tree and report
/// everything through the sink.
pub trait Checker: Send + Sync {
    /// Unique identifier for this checker.
    fn name(&self) -> &'static str;

    /// Inspect one parsed file and append issues to the sink.
    fn check(&self, parse: &ParseResult, sink: &mut IssueSink) -> Result<()>;
}

/// The fixed per-file checker list. Duplication is not part of it: that
/// scan spans files and runs once per directory.
pub fn default_checkers(config: &crate::config::Config) -> Vec<Box<dyn Checker>> {
    vec![
        Box::new(ComplexityChecker::new(config)),
        Box::new(CodeSmellChecker::new(config)),
        Box::new(StyleChecker::new(config)),
        Box::new(SecurityChecker::new()),
    ]
}

/// Run every checker over one parsed file.
///
/// A checker error is logged and swallowed so one broken checker cannot
/// prevent the others (or other files) from running.
pub fn run_checkers(checkers: &[Box<dyn Checker>], parse: &ParseResult, sink: &mut IssueSink) {
    for checker in checkers {
        if let Err(e) = checker.check(parse, sink) {
            tracing::warn!(
                checker = checker.name(),
                file = %parse.path.display(),
                "checker failed: {e}"
            );
        }
    }
}

/// Location of a duplicated or flagged line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineLocation {
    pub file: PathBuf,
    pub line: u32,
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::core::SourceFile;
    use crate::parser::{ParseOutcome, ParseResult, Parser};

    /// Parse a Python snippet for checker tests; panics on invalid fixtures.
    pub fn parse_fixture(code: &str) -> ParseResult {
        let parser = Parser::new();
        let file = SourceFile::from_content("fixture.py", code.as_bytes().to_vec());
        match parser.parse_source(&file) {
            ParseOutcome::Parsed(result) => result,
            ParseOutcome::Failed { reason, .. } => panic!("fixture failed to parse: {reason}"),
        }
    }
}
