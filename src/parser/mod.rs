//! Tree-sitter based Python parser.
//!
//! Parsing never raises past this boundary: unreadable files and invalid
//! syntax both degrade to a [`ParseOutcome::Failed`] variant that callers
//! consume by pattern matching.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tree_sitter::{Parser as TsParser, Tree};

use crate::core::SourceFile;

/// Thread-safe Python parser.
pub struct Parser {
    inner: Mutex<TsParser>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Create a new parser.
    pub fn new() -> Self {
        let mut parser = TsParser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .expect("Python grammar should be valid");
        Self {
            inner: Mutex::new(parser),
        }
    }

    /// Parse a file from disk.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> ParseOutcome {
        let path = path.as_ref();
        let file = match SourceFile::load(path) {
            Ok(file) => file,
            Err(e) => {
                return ParseOutcome::Failed {
                    path: path.to_path_buf(),
                    kind: FailureKind::Unreadable,
                    reason: e.to_string(),
                }
            }
        };
        self.parse_source(&file)
    }

    /// Parse an in-memory source file.
    pub fn parse_source(&self, file: &SourceFile) -> ParseOutcome {
        let tree = {
            let mut parser = self.inner.lock();
            parser.parse(&file.content, None)
        };

        let tree = match tree {
            Some(tree) => tree,
            None => {
                return ParseOutcome::Failed {
                    path: file.path.clone(),
                    kind: FailureKind::Syntax,
                    reason: "parser produced no tree".to_string(),
                }
            }
        };

        // Tree-sitter is error tolerant; a tree containing error nodes means
        // the source is not valid Python and is excluded from extraction.
        if tree.root_node().has_error() {
            return ParseOutcome::Failed {
                path: file.path.clone(),
                kind: FailureKind::Syntax,
                reason: "invalid syntax".to_string(),
            };
        }

        ParseOutcome::Parsed(ParseResult {
            tree: Arc::new(tree),
            source: file.content.clone(),
            path: file.path.clone(),
        })
    }
}

/// Why a file could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The file could not be read (missing, permissions, not Python).
    Unreadable,
    /// The file was read but is not valid Python.
    Syntax,
}

/// Outcome of parsing a source file.
pub enum ParseOutcome {
    /// A usable syntax tree.
    Parsed(ParseResult),
    /// The file is excluded from structural extraction; the run continues.
    Failed {
        path: PathBuf,
        kind: FailureKind,
        reason: String,
    },
}

/// Result of successfully parsing a source file.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// The parsed syntax tree.
    pub tree: Arc<Tree>,
    /// Original source content.
    pub source: Vec<u8>,
    /// File path.
    pub path: PathBuf,
}

impl ParseResult {
    /// Get the root node of the tree.
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Get text for a node.
    pub fn node_text(&self, node: &tree_sitter::Node<'_>) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }

    /// 1-based line of a node's start position.
    pub fn line_of(&self, node: &tree_sitter::Node<'_>) -> u32 {
        node.start_position().row as u32 + 1
    }
}

/// Visit every node in a subtree, pre-order.
///
/// Iterative cursor traversal; the cursor cannot move above `root`, so this
/// is safe to call on any node.
pub fn walk_tree<'a>(root: tree_sitter::Node<'a>, f: &mut impl FnMut(tree_sitter::Node<'a>)) {
    let mut cursor = root.walk();
    loop {
        f(cursor.node());

        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(code: &str) -> ParseOutcome {
        let parser = Parser::new();
        let file = SourceFile::from_content("test.py", code.as_bytes().to_vec());
        parser.parse_source(&file)
    }

    #[test]
    fn test_parse_valid_python() {
        match parse("def hello():\n    print('hi')\n") {
            ParseOutcome::Parsed(result) => {
                assert_eq!(result.root_node().kind(), "module");
            }
            ParseOutcome::Failed { reason, .. } => panic!("unexpected failure: {reason}"),
        }
    }

    #[test]
    fn test_parse_invalid_python_degrades() {
        match parse("def broken(:\n") {
            ParseOutcome::Failed { kind, .. } => assert_eq!(kind, FailureKind::Syntax),
            ParseOutcome::Parsed(_) => panic!("expected syntax failure"),
        }
    }

    #[test]
    fn test_parse_missing_file_degrades() {
        let parser = Parser::new();
        match parser.parse_file("/nonexistent/mod.py") {
            ParseOutcome::Failed { kind, .. } => assert_eq!(kind, FailureKind::Unreadable),
            ParseOutcome::Parsed(_) => panic!("expected unreadable failure"),
        }
    }

    #[test]
    fn test_node_text() {
        match parse("x = 1\n") {
            ParseOutcome::Parsed(result) => {
                let root = result.root_node();
                assert_eq!(result.node_text(&root).trim(), "x = 1");
                assert_eq!(result.line_of(&root), 1);
            }
            ParseOutcome::Failed { .. } => panic!("expected parse"),
        }
    }
}
