//! Style checks: file length and line length.

use crate::config::Config;
use crate::parser::ParseResult;

use super::{Checker, IssueCategory, IssueSink};

pub struct StyleChecker {
    max_line_length: usize,
    max_file_lines: usize,
}

impl StyleChecker {
    pub fn new(config: &Config) -> Self {
        Self {
            max_line_length: config.max_line_length,
            max_file_lines: config.max_file_lines,
        }
    }
}

impl Checker for StyleChecker {
    fn name(&self) -> &'static str {
        "style"
    }

    fn check(&self, parse: &ParseResult, sink: &mut IssueSink) -> crate::core::Result<()> {
        let source = String::from_utf8_lossy(&parse.source);
        let mut line_count = 0usize;

        for (i, line) in source.lines().enumerate() {
            line_count += 1;
            let width = line.trim_end().chars().count();
            if width > self.max_line_length {
                sink.push(
                    IssueCategory::Style,
                    format!(
                        "Line exceeds {} characters ({width})",
                        self.max_line_length
                    ),
                    &parse.path,
                    Some(i as u32 + 1),
                );
            }
        }

        if line_count > self.max_file_lines {
            sink.push(
                IssueCategory::Style,
                format!(
                    "File has {line_count} lines (over {})",
                    self.max_file_lines
                ),
                &parse.path,
                None,
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::test_support::parse_fixture;

    fn style_issues(code: &str) -> Vec<super::super::QualityIssue> {
        let parse = parse_fixture(code);
        let mut sink = IssueSink::new();
        StyleChecker::new(&Config::default())
            .check(&parse, &mut sink)
            .unwrap();
        sink.into_issues()
    }

    #[test]
    fn test_short_file_is_clean() {
        assert!(style_issues("x = 1\ny = 2\n").is_empty());
    }

    #[test]
    fn test_long_line_flagged_with_line_number() {
        let code = format!("x = 1\ns = \"{}\"\n", "a".repeat(100));
        let issues = style_issues(&code);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].line, Some(2));
        assert!(issues[0].description.contains("exceeds 80 characters"));
    }

    #[test]
    fn test_trailing_whitespace_not_counted() {
        let code = format!("x = 1{}\n", " ".repeat(100));
        assert!(style_issues(&code).is_empty());
    }

    #[test]
    fn test_oversized_file_flagged_without_line() {
        let code = "x = 1\n".repeat(501);
        let issues = style_issues(&code);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].line, None);
        assert!(issues[0].description.contains("501 lines"));
    }
}
