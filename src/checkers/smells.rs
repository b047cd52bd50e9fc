//! Code smell checks: magic numbers and long parameter lists.

use tree_sitter::Node;

use crate::config::Config;
use crate::parser::{walk_tree, ParseResult};

use super::{Checker, IssueCategory, IssueSink};

/// Parameter kinds counted as positional parameters.
const PARAM_KINDS: &[&str] = &[
    "identifier",
    "typed_parameter",
    "default_parameter",
    "typed_default_parameter",
];

pub struct CodeSmellChecker {
    max_params: usize,
}

impl CodeSmellChecker {
    pub fn new(config: &Config) -> Self {
        Self {
            max_params: config.max_params,
        }
    }

    fn check_magic_number(&self, node: Node<'_>, parse: &ParseResult, sink: &mut IssueSink) {
        let text = parse.node_text(&node);
        if let Some(value) = parse_numeric(text) {
            // 0 and 1 are never magic; -1 is covered because its literal is 1.
            if value == 0.0 || value == 1.0 {
                return;
            }
        }
        if is_simple_assignment_rhs(node) {
            return;
        }
        sink.push(
            IssueCategory::CodeSmells,
            format!("Magic number {text}"),
            &parse.path,
            Some(parse.line_of(&node)),
        );
    }

    fn check_parameter_count(&self, node: Node<'_>, parse: &ParseResult, sink: &mut IssueSink) {
        let count = positional_param_count(node);
        if count > self.max_params {
            let name = node
                .child_by_field_name("name")
                .map(|n| parse.node_text(&n).to_string())
                .unwrap_or_default();
            sink.push(
                IssueCategory::CodeSmells,
                format!(
                    "Function '{name}' has too many parameters ({count} > {})",
                    self.max_params
                ),
                &parse.path,
                Some(parse.line_of(&node)),
            );
        }
    }
}

impl Checker for CodeSmellChecker {
    fn name(&self) -> &'static str {
        "code_smells"
    }

    fn check(&self, parse: &ParseResult, sink: &mut IssueSink) -> crate::core::Result<()> {
        walk_tree(parse.root_node(), &mut |node| match node.kind() {
            "integer" | "float" => self.check_magic_number(node, parse, sink),
            "function_definition" => self.check_parameter_count(node, parse, sink),
            _ => {}
        });
        Ok(())
    }
}

/// Count positional parameters of a `function_definition` node.
pub fn positional_param_count(func: Node<'_>) -> usize {
    let Some(params) = func.child_by_field_name("parameters") else {
        return 0;
    };
    let mut cursor = params.walk();
    params
        .named_children(&mut cursor)
        .filter(|c| PARAM_KINDS.contains(&c.kind()))
        .count()
}

/// Whether a numeric literal (or its enclosing unary minus) is the sole
/// right-hand side of a single-target `name = value` assignment.
fn is_simple_assignment_rhs(node: Node<'_>) -> bool {
    let mut target = node;
    if let Some(parent) = target.parent() {
        if parent.kind() == "unary_operator" {
            target = parent;
        }
    }

    let Some(parent) = target.parent() else {
        return false;
    };
    if parent.kind() != "assignment" {
        return false;
    }
    let rhs_is_target = parent
        .child_by_field_name("right")
        .is_some_and(|rhs| rhs.id() == target.id());
    let lhs_is_name = parent
        .child_by_field_name("left")
        .is_some_and(|lhs| lhs.kind() == "identifier");
    rhs_is_target && lhs_is_name
}

fn parse_numeric(text: &str) -> Option<f64> {
    let cleaned = text.replace('_', "");
    if let Some(hex) = cleaned.strip_prefix("0x").or_else(|| cleaned.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16).ok().map(|v| v as f64);
    }
    if let Some(oct) = cleaned.strip_prefix("0o").or_else(|| cleaned.strip_prefix("0O")) {
        return i64::from_str_radix(oct, 8).ok().map(|v| v as f64);
    }
    if let Some(bin) = cleaned.strip_prefix("0b").or_else(|| cleaned.strip_prefix("0B")) {
        return i64::from_str_radix(bin, 2).ok().map(|v| v as f64);
    }
    cleaned.parse::<f64>().ok()
}
