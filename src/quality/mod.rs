//! Per-file quality analysis.
//!
//! Wraps the checker list for single-file use: the `file` CLI operation
//! returns an outline of function and class records with their metrics and
//! the issue descriptions that fall inside each definition's line span.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::checkers::{default_checkers, run_checkers, Checker, IssueSink, QualityIssue};
use crate::config::Config;
use crate::core::{Error, Result, SourceFile};
use crate::extract::extract_facts;
use crate::parser::{ParseOutcome, ParseResult, Parser};

/// Classes with more methods than this get a size note.
const LARGE_CLASS_METHODS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionReport {
    pub name: String,
    pub line: u32,
    pub lines: u32,
    pub params: usize,
    pub cyclomatic: u32,
    pub cognitive: u32,
    pub code_smells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassReport {
    pub name: String,
    pub line: u32,
    pub lines: u32,
    pub method_count: usize,
    pub code_smells: Vec<String>,
}

/// The per-file record set returned by `analyze_file`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileOutline {
    pub file: String,
    pub functions: Vec<FunctionReport>,
    pub classes: Vec<ClassReport>,
}

/// Owns the checker list for per-file analysis.
pub struct QualityAnalyzer {
    config: Config,
    checkers: Vec<Box<dyn Checker>>,
}

impl QualityAnalyzer {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            checkers: default_checkers(config),
        }
    }

    /// Run every checker over one parsed file.
    pub fn check_file(&self, parse: &ParseResult) -> Vec<QualityIssue> {
        let mut sink = IssueSink::new();
        run_checkers(&self.checkers, parse, &mut sink);
        sink.into_issues()
    }

    /// Analyze a single file into its outline. Unlike directory analysis,
    /// an unreadable or unparsable file is a hard error here: the caller
    /// named the file explicitly.
    pub fn analyze_file(&self, path: impl AsRef<Path>) -> Result<FileOutline> {
        let path = path.as_ref();
        let source = SourceFile::load(path)?;
        let parser = Parser::new();
        let parse = match parser.parse_source(&source) {
            ParseOutcome::Parsed(parse) => parse,
            ParseOutcome::Failed { path, reason, .. } => {
                return Err(Error::Parse {
                    path,
                    message: reason,
                })
            }
        };

        let module = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let facts = extract_facts(&parse, &module);
        let issues = self.check_file(&parse);

        let smells_in = |start: u32, end: u32| -> Vec<String> {
            issues
                .iter()
                .filter(|i| i.line.is_some_and(|l| l >= start && l <= end))
                .map(|i| i.description.clone())
                .collect()
        };

        let functions = facts
            .functions
            .iter()
            .map(|f| {
                let mut code_smells = smells_in(f.line, f.end_line);
                let lines = f.lines();
                if lines > self.config.max_function_lines {
                    code_smells.push(format!(
                        "Function is {lines} lines long (over {})",
                        self.config.max_function_lines
                    ));
                }
                FunctionReport {
                    name: f.name.clone(),
                    line: f.line,
                    lines,
                    params: f.params,
                    cyclomatic: f.cyclomatic,
                    cognitive: f.cognitive,
                    code_smells,
                }
            })
            .collect();

        let classes = facts
            .classes
            .iter()
            .map(|c| {
                let mut code_smells = smells_in(c.line, c.end_line);
                if c.methods.len() > LARGE_CLASS_METHODS {
                    code_smells.push(format!("Class has {} methods", c.methods.len()));
                }
                ClassReport {
                    name: c.name.clone(),
                    line: c.line,
                    lines: c.lines(),
                    method_count: c.methods.len(),
                    code_smells,
                }
            })
            .collect();

        Ok(FileOutline {
            file: path.to_string_lossy().into_owned(),
            functions,
            classes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn outline(code: &str) -> FileOutline {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sample.py");
        fs::write(&path, code).unwrap();
        QualityAnalyzer::new(&Config::default())
            .analyze_file(&path)
            .unwrap()
    }

    #[test]
    fn test_function_metrics_in_outline() {
        let out = outline("def f(a, b):\n    if a:\n        return b\n    return 0\n");
        assert_eq!(out.functions.len(), 1);
        let f = &out.functions[0];
        assert_eq!(f.name, "f");
        assert_eq!(f.params, 2);
        assert_eq!(f.cyclomatic, 2);
        assert_eq!(f.lines, 4);
        assert!(f.code_smells.is_empty());
    }

    #[test]
    fn test_issue_lands_on_enclosing_function() {
        let out = outline("def f():\n    return foo(42)\n\ndef g():\n    return 0\n");
        assert!(out.functions[0]
            .code_smells
            .iter()
            .any(|s| s.contains("Magic number 42")));
        assert!(out.functions[1].code_smells.is_empty());
    }

    #[test]
    fn test_long_function_noted() {
        let mut code = String::from("def long_one():\n");
        for _ in 0..31 {
            code.push_str("    pass\n");
        }
        let out = outline(&code);
        assert!(out.functions[0]
            .code_smells
            .iter()
            .any(|s| s.contains("lines long (over 30)")));
    }

    #[test]
    fn test_class_report() {
        let out = outline("class Widget:\n    def a(self):\n        pass\n    def b(self):\n        pass\n");
        assert_eq!(out.classes.len(), 1);
        assert_eq!(out.classes[0].method_count, 2);
        assert!(out.classes[0].code_smells.is_empty());
    }

    #[test]
    fn test_large_class_noted() {
        let mut code = String::from("class Big:\n");
        for i in 0..11 {
            code.push_str(&format!("    def m{i}(self):\n        pass\n"));
        }
        let out = outline(&code);
        assert!(out.classes[0]
            .code_smells
            .iter()
            .any(|s| s.contains("11 methods")));
    }

    #[test]
    fn test_missing_file_is_hard_error() {
        let analyzer = QualityAnalyzer::new(&Config::default());
        assert!(analyzer.analyze_file("/nonexistent/sample.py").is_err());
    }

    #[test]
    fn test_invalid_syntax_is_hard_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.py");
        fs::write(&path, "def broken(:\n").unwrap();
        let analyzer = QualityAnalyzer::new(&Config::default());
        assert!(matches!(
            analyzer.analyze_file(&path),
            Err(Error::Parse { .. })
        ));
    }
}
