//! Structural fact extraction from parsed files.
//!
//! Extraction pulls out what the dependency graph and quality reports need:
//! imports, module-level functions and classes, their metrics, and the bare
//! function calls inside them. Call recording is deliberately best-effort:
//! only `name(...)` calls are kept, so method and attribute calls never
//! produce edges.

use std::collections::HashMap;
use std::path::PathBuf;

use tree_sitter::Node;

use crate::checkers::complexity::{cognitive_complexity, cyclomatic_complexity};
use crate::checkers::smells::positional_param_count;
use crate::parser::{walk_tree, ParseResult};

/// A bare-name call site inside a function body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub callee: String,
    pub line: u32,
}

/// A module-level function.
#[derive(Debug, Clone)]
pub struct FunctionFacts {
    pub name: String,
    pub line: u32,
    pub end_line: u32,
    pub params: usize,
    pub cyclomatic: u32,
    pub cognitive: u32,
    pub calls: Vec<CallSite>,
}

impl FunctionFacts {
    /// Number of source lines the definition spans.
    pub fn lines(&self) -> u32 {
        self.end_line.saturating_sub(self.line) + 1
    }
}

/// A method inside a class body.
#[derive(Debug, Clone)]
pub struct MethodFacts {
    pub name: String,
    pub line: u32,
    pub calls: Vec<CallSite>,
}

/// A module-level class.
#[derive(Debug, Clone)]
pub struct ClassFacts {
    pub name: String,
    pub line: u32,
    pub end_line: u32,
    pub cyclomatic: u32,
    pub methods: Vec<MethodFacts>,
}

impl ClassFacts {
    pub fn lines(&self) -> u32 {
        self.end_line.saturating_sub(self.line) + 1
    }
}

/// Everything extracted from one parsed file.
#[derive(Debug, Clone)]
pub struct FileFacts {
    pub module: String,
    pub path: PathBuf,
    pub imports: Vec<String>,
    pub functions: Vec<FunctionFacts>,
    pub classes: Vec<ClassFacts>,
}

impl FileFacts {
    /// Summed cyclomatic complexity of every module-level definition.
    pub fn total_complexity(&self) -> u32 {
        self.functions.iter().map(|f| f.cyclomatic).sum::<u32>()
            + self.classes.iter().map(|c| c.cyclomatic).sum::<u32>()
    }
}

/// Extract structural facts for a file, attributed to `module`.
pub fn extract_facts(parse: &ParseResult, module: &str) -> FileFacts {
    let root = parse.root_node();
    let mut facts = FileFacts {
        module: module.to_string(),
        path: parse.path.clone(),
        imports: collect_imports(parse),
        functions: Vec::new(),
        classes: Vec::new(),
    };

    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        // Decorated definitions wrap the real node.
        let node = if child.kind() == "decorated_definition" {
            match child.child_by_field_name("definition") {
                Some(def) => def,
                None => continue,
            }
        } else {
            child
        };

        match node.kind() {
            "function_definition" => facts.functions.push(function_facts(node, parse)),
            "class_definition" => facts.classes.push(class_facts(node, parse)),
            _ => {}
        }
    }
    facts
}

/// Imported module names, in source order.
pub fn collect_imports(parse: &ParseResult) -> Vec<String> {
    let mut imports = Vec::new();
    walk_tree(parse.root_node(), &mut |node| match node.kind() {
        "import_statement" => {
            let mut cursor = node.walk();
            for name in node.children_by_field_name("name", &mut cursor) {
                let target = match name.kind() {
                    "aliased_import" => name.child_by_field_name("name"),
                    _ => Some(name),
                };
                if let Some(target) = target {
                    imports.push(parse.node_text(&target).to_string());
                }
            }
        }
        "import_from_statement" => {
            if let Some(module) = node.child_by_field_name("module_name") {
                let text = parse.node_text(&module).trim_start_matches('.');
                if !text.is_empty() {
                    imports.push(text.to_string());
                }
            }
        }
        _ => {}
    });
    imports
}

/// Map of local binding name to the dotted path it was imported from.
///
/// `import os` binds `os` to `os`; `import subprocess as sp` binds `sp` to
/// `subprocess`; `from os import system as run` binds `run` to `os.system`.
pub fn import_bindings(parse: &ParseResult) -> HashMap<String, String> {
    let mut bindings = HashMap::new();
    walk_tree(parse.root_node(), &mut |node| match node.kind() {
        "import_statement" => {
            let mut cursor = node.walk();
            for name in node.children_by_field_name("name", &mut cursor) {
                match name.kind() {
                    "aliased_import" => {
                        if let (Some(target), Some(alias)) = (
                            name.child_by_field_name("name"),
                            name.child_by_field_name("alias"),
                        ) {
                            bindings.insert(
                                parse.node_text(&alias).to_string(),
                                parse.node_text(&target).to_string(),
                            );
                        }
                    }
                    _ => {
                        // `import a.b` binds the top-level name `a`.
                        let text = parse.node_text(&name);
                        let top = text.split('.').next().unwrap_or(text);
                        bindings.insert(top.to_string(), top.to_string());
                    }
                }
            }
        }
        "import_from_statement" => {
            let Some(module) = node.child_by_field_name("module_name") else {
                return;
            };
            let module = parse.node_text(&module).trim_start_matches('.').to_string();
            let mut cursor = node.walk();
            for name in node.children_by_field_name("name", &mut cursor) {
                if name.kind() == "wildcard_import" {
                    continue;
                }
                let (target, local) = match name.kind() {
                    "aliased_import" => (
                        name.child_by_field_name("name"),
                        name.child_by_field_name("alias"),
                    ),
                    _ => (Some(name), Some(name)),
                };
                if let (Some(target), Some(local)) = (target, local) {
                    let origin = if module.is_empty() {
                        parse.node_text(&target).to_string()
                    } else {
                        format!("{module}.{}", parse.node_text(&target))
                    };
                    bindings.insert(parse.node_text(&local).to_string(), origin);
                }
            }
        }
        _ => {}
    });
    bindings
}

fn function_facts(node: Node<'_>, parse: &ParseResult) -> FunctionFacts {
    FunctionFacts {
        name: node_name(node, parse),
        line: parse.line_of(&node),
        end_line: node.end_position().row as u32 + 1,
        params: positional_param_count(node),
        cyclomatic: cyclomatic_complexity(node),
        cognitive: cognitive_complexity(node),
        calls: collect_calls(node, parse),
    }
}

fn class_facts(node: Node<'_>, parse: &ParseResult) -> ClassFacts {
    let mut methods = Vec::new();
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for child in body.named_children(&mut cursor) {
            let def = if child.kind() == "decorated_definition" {
                match child.child_by_field_name("definition") {
                    Some(def) => def,
                    None => continue,
                }
            } else {
                child
            };
            if def.kind() == "function_definition" {
                methods.push(MethodFacts {
                    name: node_name(def, parse),
                    line: parse.line_of(&def),
                    calls: collect_calls(def, parse),
                });
            }
        }
    }
    ClassFacts {
        name: node_name(node, parse),
        line: parse.line_of(&node),
        end_line: node.end_position().row as u32 + 1,
        cyclomatic: cyclomatic_complexity(node),
        methods,
    }
}

fn node_name(node: Node<'_>, parse: &ParseResult) -> String {
    node.child_by_field_name("name")
        .map(|n| parse.node_text(&n).to_string())
        .unwrap_or_default()
}

/// Bare `name(...)` call sites in a definition body.
fn collect_calls(node: Node<'_>, parse: &ParseResult) -> Vec<CallSite> {
    let mut calls = Vec::new();
    walk_tree(node, &mut |n| {
        if n.kind() != "call" {
            return;
        }
        if let Some(func) = n.child_by_field_name("function") {
            if func.kind() == "identifier" {
                calls.push(CallSite {
                    callee: parse.node_text(&func).to_string(),
                    line: parse.line_of(&n),
                });
            }
        }
    });
    calls
}
