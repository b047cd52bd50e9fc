//! Security checks: risky call patterns, hardcoded secrets, SQL string
//! concatenation.
//!
//! Call rules resolve receivers through the file's import bindings, so
//! `import subprocess as sp; sp.run(...)` is caught while an unrelated
//! local `run()` is not.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tree_sitter::Node;

use crate::parser::{walk_tree, ParseResult};

use super::{Checker, IssueCategory, IssueSink};

/// A risky call pattern. `modules: None` matches any receiver.
struct CallRule {
    label: &'static str,
    calls: &'static [&'static str],
    modules: Option<&'static [&'static str]>,
}

const CALL_RULES: &[CallRule] = &[
    CallRule {
        label: "sql_injection",
        calls: &["execute", "executemany", "executescript"],
        modules: None,
    },
    CallRule {
        label: "command_injection",
        calls: &["system", "popen"],
        modules: Some(&["os"]),
    },
    CallRule {
        label: "command_injection",
        calls: &["call", "run", "Popen", "check_output"],
        modules: Some(&["subprocess"]),
    },
    CallRule {
        label: "deserialization",
        calls: &["load", "loads"],
        modules: Some(&["pickle", "marshal", "yaml"]),
    },
    CallRule {
        label: "file_operations",
        calls: &["remove", "unlink", "rmtree", "chmod"],
        modules: Some(&["os", "shutil"]),
    },
];

/// Variable-name fragments that indicate a credential.
const SECRET_MARKERS: &[&str] = &["password", "secret", "key", "token", "api"];

static SQL_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(select|insert|update|delete|exec|eval)\b")
        .unwrap_or_else(|e| unreachable!("static regex: {e}"))
});

#[derive(Default)]
pub struct SecurityChecker;

impl SecurityChecker {
    pub fn new() -> Self {
        Self
    }

    fn check_call(
        &self,
        node: Node<'_>,
        parse: &ParseResult,
        bindings: &HashMap<String, String>,
        sink: &mut IssueSink,
    ) {
        let Some(func) = node.child_by_field_name("function") else {
            return;
        };
        let line = parse.line_of(&node);

        match func.kind() {
            "identifier" => {
                let name = parse.node_text(&func);
                if name == "eval" || name == "exec" {
                    sink.push(
                        IssueCategory::Security,
                        format!("command_injection: call to {name}()"),
                        &parse.path,
                        Some(line),
                    );
                    return;
                }
                // `from os import system` style: the binding carries the
                // defining module.
                let Some(origin) = bindings.get(name) else {
                    return;
                };
                let Some((module, attr)) = origin.rsplit_once('.') else {
                    return;
                };
                for rule in CALL_RULES {
                    let module_ok = rule.modules.is_some_and(|mods| mods.contains(&module));
                    if module_ok && rule.calls.contains(&attr) {
                        sink.push(
                            IssueCategory::Security,
                            format!("{}: call to {name}()", rule.label),
                            &parse.path,
                            Some(line),
                        );
                        return;
                    }
                }
            }
            "attribute" => {
                let Some(attr_node) = func.child_by_field_name("attribute") else {
                    return;
                };
                let attr = parse.node_text(&attr_node);
                let receiver = func
                    .child_by_field_name("object")
                    .filter(|o| o.kind() == "identifier")
                    .map(|o| parse.node_text(&o).to_string());

                for rule in CALL_RULES {
                    if !rule.calls.contains(&attr) {
                        continue;
                    }
                    let matched = match rule.modules {
                        // Cursor-style methods are risky on any receiver.
                        None => true,
                        Some(mods) => receiver
                            .as_deref()
                            .and_then(|r| bindings.get(r))
                            .map(|origin| top_module(origin))
                            .is_some_and(|m| mods.contains(&m)),
                    };
                    if matched {
                        let recv = receiver.as_deref().unwrap_or("?");
                        sink.push(
                            IssueCategory::Security,
                            format!("{}: call to {recv}.{attr}()", rule.label),
                            &parse.path,
                            Some(line),
                        );
                        return;
                    }
                }
            }
            _ => {}
        }
    }

    fn check_assignment(&self, node: Node<'_>, parse: &ParseResult, sink: &mut IssueSink) {
        let Some(left) = node.child_by_field_name("left") else {
            return;
        };
        let Some(right) = node.child_by_field_name("right") else {
            return;
        };
        if left.kind() != "identifier" || right.kind() != "string" {
            return;
        }
        let name = parse.node_text(&left);
        let lowered = name.to_lowercase();
        if SECRET_MARKERS.iter().any(|m| lowered.contains(m)) {
            sink.push(
                IssueCategory::Security,
                format!("hardcoded_secret: variable '{name}' assigned a string literal"),
                &parse.path,
                Some(parse.line_of(&node)),
            );
        }
    }

    fn check_concat(&self, node: Node<'_>, parse: &ParseResult, sink: &mut IssueSink) {
        let is_plus = node
            .child_by_field_name("operator")
            .is_some_and(|op| op.kind() == "+");
        if !is_plus {
            return;
        }
        let has_sql_string = [
            node.child_by_field_name("left"),
            node.child_by_field_name("right"),
        ]
        .into_iter()
        .flatten()
        .any(|side| side.kind() == "string" && SQL_KEYWORD.is_match(parse.node_text(&side)));

        if has_sql_string {
            sink.push(
                IssueCategory::Security,
                "sql_injection: SQL keyword in string concatenation".to_string(),
                &parse.path,
                Some(parse.line_of(&node)),
            );
        }
    }
}

fn top_module(origin: &str) -> &str {
    origin.split('.').next().unwrap_or(origin)
}

impl Checker for SecurityChecker {
    fn name(&self) -> &'static str {
        "security"
    }

    fn check(&self, parse: &ParseResult, sink: &mut IssueSink) -> crate::core::Result<()> {
        let bindings = crate::extract::import_bindings(parse);
        walk_tree(parse.root_node(), &mut |node| match node.kind() {
            "call" => self.check_call(node, parse, &bindings, sink),
            "assignment" => self.check_assignment(node, parse, sink),
            "binary_operator" => self.check_concat(node, parse, sink),
            _ => {}
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::test_support::parse_fixture;

    fn security_issues(code: &str) -> Vec<super::super::QualityIssue> {
        let parse = parse_fixture(code);
        let mut sink = IssueSink::new();
        SecurityChecker::new().check(&parse, &mut sink).unwrap();
        sink.into_issues()
    }

    #[test]
    fn test_hardcoded_secret_single_issue() {
        let issues = security_issues("password = \"abc123\"\n");
        assert_eq!(issues.len(), 1);
        assert!(issues[0].description.contains("hardcoded_secret"));
        assert!(issues[0].description.contains("'password'"));
    }

    #[test]
    fn test_secret_requires_string_rhs() {
        assert!(security_issues("password = get_password()\n").is_empty());
    }

    #[test]
    fn test_cursor_execute_flagged_without_import() {
        let issues = security_issues("cursor.execute(query)\n");
        assert_eq!(issues.len(), 1);
        assert!(issues[0].description.contains("sql_injection"));
    }

    #[test]
    fn test_subprocess_alias_resolved() {
        let issues = security_issues("import subprocess as sp\nsp.run(cmd)\n");
        assert_eq!(issues.len(), 1);
        assert!(issues[0].description.contains("command_injection"));
    }

    #[test]
    fn test_unrelated_run_not_flagged() {
        assert!(security_issues("runner.run(task)\n").is_empty());
    }

    #[test]
    fn test_from_import_resolved() {
        let issues = security_issues("from os import system\nsystem(cmd)\n");
        assert_eq!(issues.len(), 1);
        assert!(issues[0].description.contains("command_injection"));
    }

    #[test]
    fn test_bare_eval_flagged() {
        let issues = security_issues("eval(data)\n");
        assert_eq!(issues.len(), 1);
        assert!(issues[0].description.contains("eval()"));
    }

    #[test]
    fn test_pickle_load_flagged() {
        let issues = security_issues("import pickle\nobj = pickle.loads(blob)\n");
        assert_eq!(issues.len(), 1);
        assert!(issues[0].description.contains("deserialization"));
    }

    #[test]
    fn test_sql_concat_flagged() {
        let issues =
            security_issues("q = \"SELECT * FROM users WHERE id = \" + user_id\n");
        assert_eq!(issues.len(), 1);
        assert!(issues[0].description.contains("sql_injection"));
        assert_eq!(issues[0].line, Some(1));
    }

    #[test]
    fn test_plain_concat_not_flagged() {
        assert!(security_issues("greeting = \"hello \" + name\n").is_empty());
    }
}
