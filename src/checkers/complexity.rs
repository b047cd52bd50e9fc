//! Cyclomatic and cognitive complexity.
//!
//! Cyclomatic complexity counts linearly independent paths: 1 plus one per
//! branch/loop/handler node plus one per boolean operator. Cognitive
//! complexity weights nested control flow by its nesting depth, scores a
//! boolean chain once per operator in its outermost same-operator run, and
//! has no +1 base.

use tree_sitter::Node;

use crate::config::Config;
use crate::parser::{walk_tree, ParseResult};

use super::{Checker, IssueCategory, IssueSink};

/// Node kinds that add a decision point.
const DECISION_KINDS: &[&str] = &[
    "if_statement",
    "elif_clause",
    "while_statement",
    "for_statement",
    "except_clause",
];

/// Node kinds that increase nesting for cognitive complexity.
const NESTING_KINDS: &[&str] = &[
    "if_statement",
    "elif_clause",
    "while_statement",
    "for_statement",
];

/// Cyclomatic complexity of a function or class node (whole subtree).
pub fn cyclomatic_complexity(node: Node<'_>) -> u32 {
    let mut complexity = 1;
    walk_tree(node, &mut |n| {
        let kind = n.kind();
        if DECISION_KINDS.contains(&kind) || kind == "boolean_operator" {
            complexity += 1;
        }
    });
    complexity
}

/// Cognitive complexity of a function or class node.
pub fn cognitive_complexity(node: Node<'_>) -> u32 {
    cognitive_walk(node, 0)
}

fn cognitive_walk(node: Node<'_>, nesting: u32) -> u32 {
    let mut total = 0;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        total += match child.kind() {
            kind if NESTING_KINDS.contains(&kind) => {
                1 + nesting + cognitive_walk(child, nesting + 1)
            }
            "boolean_operator" => boolean_chain_weight(child),
            _ => cognitive_walk(child, nesting),
        };
    }
    total
}

/// Weight of a boolean expression: one per operator in the outermost
/// same-operator run. `a and b and c` weighs 2; once the operator flips,
/// the nested chain is part of an operand and adds nothing, so
/// `a and b or c` weighs 1.
fn boolean_chain_weight(node: Node<'_>) -> u32 {
    let operator = node.child_by_field_name("operator").map(|n| n.kind());
    let mut weight = 1;
    for field in ["left", "right"] {
        if let Some(operand) = node.child_by_field_name(field) {
            if operand.kind() == "boolean_operator"
                && operand.child_by_field_name("operator").map(|n| n.kind()) == operator
            {
                weight += boolean_chain_weight(operand);
            }
        }
    }
    weight
}

/// Complexity checker: flags functions and classes over either threshold.
pub struct ComplexityChecker {
    max_cyclomatic: u32,
    max_cognitive: u32,
}

impl ComplexityChecker {
    pub fn new(config: &Config) -> Self {
        Self {
            max_cyclomatic: config.max_cyclomatic_complexity,
            max_cognitive: config.max_cognitive_complexity,
        }
    }
}

impl Checker for ComplexityChecker {
    fn name(&self) -> &'static str {
        "complexity"
    }

    fn check(&self, parse: &ParseResult, sink: &mut IssueSink) -> crate::core::Result<()> {
        walk_tree(parse.root_node(), &mut |node| {
            if node.kind() != "function_definition" && node.kind() != "class_definition" {
                return;
            }
            let name = node
                .child_by_field_name("name")
                .map(|n| parse.node_text(&n).to_string())
                .unwrap_or_default();
            let line = parse.line_of(&node);

            let cyclomatic = cyclomatic_complexity(node);
            if cyclomatic > self.max_cyclomatic {
                sink.push(
                    IssueCategory::Complexity,
                    format!(
                        "High cyclomatic complexity in '{name}' ({cyclomatic} > {})",
                        self.max_cyclomatic
                    ),
                    &parse.path,
                    Some(line),
                );
            }

            let cognitive = cognitive_complexity(node);
            if cognitive > self.max_cognitive {
                sink.push(
                    IssueCategory::Complexity,
                    format!(
                        "High cognitive complexity in '{name}' ({cognitive} > {})",
                        self.max_cognitive
                    ),
                    &parse.path,
                    Some(line),
                );
            }
        });
        Ok(())
    }
}
