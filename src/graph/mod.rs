//! Module dependency graph builder.
//!
//! Owns all aggregate state for one analysis run: module import sets,
//! function locations, class records, call edges, hotspots, and issues.
//! Per-file work fans out over a bounded rayon pool; the fold into the
//! aggregate maps is single-threaded over reports sorted by module name,
//! so repeated runs over an unchanged tree produce identical aggregates.

pub mod insights;
pub mod model;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cache::{self, CacheEntry, CacheStore};
use crate::checkers::{
    default_checkers, run_checkers, Checker, DuplicationScanner, IssueCategory, IssueSink,
    QualityIssue,
};
use crate::config::Config;
use crate::core::{Error, FileSet, Result, SourceFile};
use crate::extract::{extract_facts, FileFacts};
use crate::parser::{FailureKind, ParseOutcome, Parser};

pub use insights::{CommonFlow, CoreComponent, Insights};
pub use model::{GraphData, Link, LinkType, Node, NodeMetrics, NodeType};

/// Aggregate metrics for one module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMetrics {
    pub functions: usize,
    pub classes: usize,
    pub complexity: u32,
}

/// Where a module-level function is defined.
///
/// Keyed by bare function name; collisions across modules resolve
/// last-writer-wins in module-name order. Best-effort by design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionLocation {
    pub module: String,
    pub file: PathBuf,
    pub line: u32,
}

/// A method recorded inside a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub line: u32,
    pub calls: Vec<String>,
}

/// A class definition and its methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub module: String,
    pub file: PathBuf,
    pub line: u32,
    pub methods: BTreeMap<String, MethodInfo>,
}

/// One call site of a known callee. Multiplicity is meaningful: edges are
/// never deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEdge {
    pub from_module: String,
    pub from_function: String,
    pub line: u32,
}

/// A function over the cyclomatic threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexFunction {
    pub module: String,
    pub name: String,
    pub complexity: u32,
    pub line: u32,
}

/// The serializable result of one full analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisBundle {
    pub root: String,
    pub graph: GraphData,
    pub module_metrics: BTreeMap<String, ModuleMetrics>,
    pub insights: Insights,
    pub complex_functions: Vec<ComplexFunction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<QualityIssue>>,
}

/// Per-file result returned by a worker. Workers never touch the aggregate
/// maps; the fold consumes these after all workers finish.
struct FileReport {
    module: String,
    path: PathBuf,
    content: String,
    facts: Option<FileFacts>,
    issues: Vec<QualityIssue>,
}

/// Aggregated dependency and quality state for one directory tree.
#[derive(Debug)]
pub struct DependencyGraph {
    root: PathBuf,
    config: Config,
    pub module_imports: BTreeMap<String, BTreeSet<String>>,
    pub module_metrics: BTreeMap<String, ModuleMetrics>,
    pub module_files: BTreeMap<String, PathBuf>,
    /// Module-level functions per module, with definition lines.
    pub module_functions: BTreeMap<String, Vec<(String, u32)>>,
    pub function_locations: BTreeMap<String, FunctionLocation>,
    pub function_calls: BTreeMap<String, Vec<CallEdge>>,
    pub classes: BTreeMap<(String, String), ClassRecord>,
    pub complex_functions: Vec<ComplexFunction>,
    pub issues: Vec<QualityIssue>,
}

impl DependencyGraph {
    fn new(root: PathBuf, config: Config) -> Self {
        Self {
            root,
            config,
            module_imports: BTreeMap::new(),
            module_metrics: BTreeMap::new(),
            module_files: BTreeMap::new(),
            module_functions: BTreeMap::new(),
            function_locations: BTreeMap::new(),
            function_calls: BTreeMap::new(),
            classes: BTreeMap::new(),
            complex_functions: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Analyze every Python file under `root`. A missing root is the one
    /// hard failure; everything else degrades to issues.
    pub fn analyze_directory(root: impl AsRef<Path>, config: &Config) -> Result<Self> {
        let files = FileSet::from_path(root)?;
        Self::analyze_files(files, config, &HashMap::new())
    }

    pub(crate) fn analyze_files(
        files: FileSet,
        config: &Config,
        reuse: &HashMap<String, Vec<QualityIssue>>,
    ) -> Result<Self> {
        let checkers = default_checkers(config);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .build()
            .map_err(|e| Error::analysis(format!("could not build worker pool: {e}")))?;

        let mut reports: Vec<FileReport> = pool.install(|| {
            files
                .files()
                .par_iter()
                .map(|path| analyze_one(path, &files, &checkers, reuse))
                .collect()
        });
        reports.sort_by(|a, b| a.module.cmp(&b.module));

        let mut graph = Self::new(files.root().to_path_buf(), config.clone());
        for report in &reports {
            graph.fold(report);
        }

        // Duplication spans files and is always recomputed in full.
        let sources: Vec<(PathBuf, String)> = reports
            .into_iter()
            .filter(|r| !r.content.is_empty())
            .map(|r| (r.path, r.content))
            .collect();
        graph
            .issues
            .extend(DuplicationScanner::new(config).scan(&sources));

        tracing::info!(
            root = %graph.root.display(),
            modules = graph.module_metrics.len(),
            issues = graph.issues.len(),
            "analysis complete"
        );
        Ok(graph)
    }

    fn fold(&mut self, report: &FileReport) {
        let module = report.module.clone();
        self.module_files.insert(module.clone(), report.path.clone());
        self.module_imports.entry(module.clone()).or_default();
        self.module_metrics.entry(module.clone()).or_default();
        self.issues.extend(report.issues.iter().cloned());

        let Some(facts) = &report.facts else {
            return;
        };

        {
            let imports = self.module_imports.entry(module.clone()).or_default();
            for import in &facts.imports {
                imports.insert(import.clone());
            }
        }
        {
            let metrics = self.module_metrics.entry(module.clone()).or_default();
            metrics.functions += facts.functions.len();
            metrics.classes += facts.classes.len();
            metrics.complexity += facts.total_complexity();
        }

        for function in &facts.functions {
            self.module_functions
                .entry(module.clone())
                .or_default()
                .push((function.name.clone(), function.line));
            self.function_locations.insert(
                function.name.clone(),
                FunctionLocation {
                    module: module.clone(),
                    file: report.path.clone(),
                    line: function.line,
                },
            );
            for call in &function.calls {
                self.function_calls
                    .entry(call.callee.clone())
                    .or_default()
                    .push(CallEdge {
                        from_module: module.clone(),
                        from_function: function.name.clone(),
                        line: call.line,
                    });
            }
            if function.cyclomatic > self.config.max_cyclomatic_complexity {
                self.complex_functions.push(ComplexFunction {
                    module: module.clone(),
                    name: function.name.clone(),
                    complexity: function.cyclomatic,
                    line: function.line,
                });
            }
        }

        for class in &facts.classes {
            let mut methods = BTreeMap::new();
            for method in &class.methods {
                methods.insert(
                    method.name.clone(),
                    MethodInfo {
                        line: method.line,
                        calls: method.calls.iter().map(|c| c.callee.clone()).collect(),
                    },
                );
                for call in &method.calls {
                    self.function_calls
                        .entry(call.callee.clone())
                        .or_default()
                        .push(CallEdge {
                            from_module: module.clone(),
                            from_function: format!("{}.{}", class.name, method.name),
                            line: call.line,
                        });
                }
            }
            self.classes.insert(
                (module.clone(), class.name.clone()),
                ClassRecord {
                    module: module.clone(),
                    file: report.path.clone(),
                    line: class.line,
                    methods,
                },
            );
        }
    }

    /// Materialize the render-facing node/link bundle. All nodes are created
    /// before any link, so every link endpoint resolves to an existing id.
    pub fn graph_data(&self) -> GraphData {
        let mut data = GraphData::default();
        let mut index: HashMap<String, u32> = HashMap::new();
        let mut next_id = 0u32;

        for (module, metrics) in &self.module_metrics {
            next_id += 1;
            index.insert(module.clone(), next_id);
            data.nodes.push(Node {
                id: next_id,
                name: module.clone(),
                kind: NodeType::Module,
                metrics: NodeMetrics {
                    functions: Some(metrics.functions),
                    classes: Some(metrics.classes),
                    complexity: Some(metrics.complexity),
                    ..NodeMetrics::default()
                },
                code_smells: Vec::new(),
            });
        }

        for ((module, class), record) in &self.classes {
            let class_name = format!("{module}.{class}");
            next_id += 1;
            index.insert(class_name.clone(), next_id);
            data.nodes.push(Node {
                id: next_id,
                name: class_name.clone(),
                kind: NodeType::Class,
                metrics: NodeMetrics {
                    methods: Some(record.methods.len()),
                    line: Some(record.line),
                    ..NodeMetrics::default()
                },
                code_smells: Vec::new(),
            });
            for (method, info) in &record.methods {
                next_id += 1;
                let method_name = format!("{class_name}.{method}");
                index.insert(method_name.clone(), next_id);
                data.nodes.push(Node {
                    id: next_id,
                    name: method_name,
                    kind: NodeType::Method,
                    metrics: NodeMetrics {
                        line: Some(info.line),
                        ..NodeMetrics::default()
                    },
                    code_smells: Vec::new(),
                });
            }
        }

        for (module, functions) in &self.module_functions {
            for (name, line) in functions {
                next_id += 1;
                let qualified = format!("{module}.{name}");
                index.insert(qualified.clone(), next_id);
                data.nodes.push(Node {
                    id: next_id,
                    name: qualified,
                    kind: NodeType::Function,
                    metrics: NodeMetrics {
                        line: Some(*line),
                        ..NodeMetrics::default()
                    },
                    code_smells: Vec::new(),
                });
            }
        }

        // Imports resolve only to modules that were analyzed.
        for (module, imports) in &self.module_imports {
            let Some(&source) = index.get(module) else {
                continue;
            };
            for target in imports {
                if let Some(&target) = index.get(target) {
                    data.links.push(Link {
                        source,
                        target,
                        kind: LinkType::Imports,
                    });
                }
            }
        }

        for ((module, class), record) in &self.classes {
            let class_name = format!("{module}.{class}");
            if let (Some(&m), Some(&c)) = (index.get(module), index.get(&class_name)) {
                data.links.push(Link {
                    source: m,
                    target: c,
                    kind: LinkType::Contains,
                });
                for method in record.methods.keys() {
                    if let Some(&target) = index.get(&format!("{class_name}.{method}")) {
                        data.links.push(Link {
                            source: c,
                            target,
                            kind: LinkType::Contains,
                        });
                    }
                }
            }
        }

        for (module, functions) in &self.module_functions {
            let Some(&source) = index.get(module) else {
                continue;
            };
            for (name, _) in functions {
                if let Some(&target) = index.get(&format!("{module}.{name}")) {
                    data.links.push(Link {
                        source,
                        target,
                        kind: LinkType::Contains,
                    });
                }
            }
        }

        for (callee, edges) in &self.function_calls {
            let Some(location) = self.function_locations.get(callee) else {
                continue;
            };
            let Some(&target) = index.get(&format!("{}.{callee}", location.module)) else {
                continue;
            };
            for edge in edges {
                let caller = format!("{}.{}", edge.from_module, edge.from_function);
                if let Some(&source) = index.get(&caller) {
                    data.links.push(Link {
                        source,
                        target,
                        kind: LinkType::Calls,
                    });
                }
            }
        }

        data
    }

    /// [`Self::graph_data`] plus quality issues attached to their nodes:
    /// the nearest definition at or before the issue line when one is close
    /// enough, otherwise the owning module node.
    pub fn graph_data_with_quality(&self) -> GraphData {
        let mut data = self.graph_data();
        for issue in &self.issues {
            let Some(module) = self.attribute_module(&issue.file) else {
                continue;
            };
            let name = self
                .nearest_definition(&module, issue.line)
                .unwrap_or_else(|| module.clone());
            if let Some(node) = data.nodes.iter_mut().find(|n| n.name == name) {
                node.code_smells.push(issue.description.clone());
            }
        }
        data
    }

    /// Map an issue's file path onto an analyzed module: exact path first,
    /// then basename, then substring/suffix.
    fn attribute_module(&self, file: &str) -> Option<String> {
        for (module, path) in &self.module_files {
            if path.to_string_lossy() == file {
                return Some(module.clone());
            }
        }
        let basename = Path::new(file).file_name();
        for (module, path) in &self.module_files {
            if path.file_name() == basename && basename.is_some() {
                return Some(module.clone());
            }
        }
        for (module, path) in &self.module_files {
            let candidate = path.to_string_lossy();
            if candidate.ends_with(file) || file.ends_with(candidate.as_ref()) {
                return Some(module.clone());
            }
        }
        None
    }

    /// Qualified name of the closest definition in `module` at or before
    /// `line`, no farther back than `issue_attach_window` lines.
    fn nearest_definition(&self, module: &str, line: Option<u32>) -> Option<String> {
        let line = line?;
        let window = self.config.issue_attach_window;
        let mut best: Option<(u32, String)> = None;
        let mut consider = |def_line: u32, name: String| {
            if def_line <= line && line - def_line <= window {
                if best.as_ref().map_or(true, |(l, _)| def_line > *l) {
                    best = Some((def_line, name));
                }
            }
        };

        if let Some(functions) = self.module_functions.get(module) {
            for (name, def_line) in functions {
                consider(*def_line, format!("{module}.{name}"));
            }
        }
        for ((m, class), record) in &self.classes {
            if m != module {
                continue;
            }
            consider(record.line, format!("{module}.{class}"));
            for (method, info) in &record.methods {
                consider(info.line, format!("{module}.{class}.{method}"));
            }
        }
        best.map(|(_, name)| name)
    }

    /// Consume the graph into its serializable bundle.
    pub fn into_bundle(self, with_quality: bool) -> AnalysisBundle {
        let graph = if with_quality {
            self.graph_data_with_quality()
        } else {
            self.graph_data()
        };
        let insights = Insights::derive(&self);
        let mut complex_functions = self.complex_functions.clone();
        complex_functions.sort_by(|a, b| {
            b.complexity
                .cmp(&a.complexity)
                .then_with(|| a.module.cmp(&b.module))
                .then_with(|| a.name.cmp(&b.name))
        });
        AnalysisBundle {
            root: self.root.to_string_lossy().into_owned(),
            graph,
            module_metrics: self.module_metrics,
            insights,
            complex_functions,
            issues: with_quality.then_some(self.issues),
        }
    }
}

/// Analyze a directory with cache reuse: unchanged files skip the metric
/// checkers, and a fully unchanged tree returns the stored bundle as-is.
pub fn analyze(root: impl AsRef<Path>, config: &Config, with_quality: bool) -> Result<AnalysisBundle> {
    if !config.cache_enabled {
        let graph = DependencyGraph::analyze_directory(root, config)?;
        return Ok(graph.into_bundle(with_quality));
    }

    let files = FileSet::from_path(root)?;
    let hashes = cache::hash_files(&files);
    let mut store = CacheStore::load(files.root());
    let key = cache::directory_key(files.root());

    let mut reuse: HashMap<String, Vec<QualityIssue>> = HashMap::new();
    if let Some(entry) = store.entry(&key) {
        if entry.hashes == hashes {
            if let Some(bundle) = &entry.bundle {
                if bundle.issues.is_some() == with_quality {
                    tracing::debug!(key = %key, "tree unchanged; serving cached bundle");
                    return Ok(bundle.clone());
                }
            }
        }
        for (file, hash) in &hashes {
            if entry.hashes.get(file) == Some(hash) {
                reuse.insert(file.clone(), Vec::new());
            }
        }
        for issue in &entry.issues {
            // Duplication depends on every file, so it never carries over.
            if issue.category == IssueCategory::Duplication {
                continue;
            }
            if let Some(cached) = reuse.get_mut(&issue.file) {
                cached.push(issue.clone());
            }
        }
    }

    let graph = DependencyGraph::analyze_files(files, config, &reuse)?;
    let issues = graph.issues.clone();
    let bundle = graph.into_bundle(with_quality);
    store.insert(
        key,
        CacheEntry {
            hashes,
            issues,
            bundle: Some(bundle.clone()),
        },
    );
    if let Err(e) = store.save() {
        tracing::warn!("could not write cache file: {e}");
    }
    Ok(bundle)
}

fn analyze_one(
    path: &Path,
    files: &FileSet,
    checkers: &[Box<dyn Checker>],
    reuse: &HashMap<String, Vec<QualityIssue>>,
) -> FileReport {
    let module = files.module_name(path);
    let source = match SourceFile::load(path) {
        Ok(source) => source,
        Err(e) => {
            tracing::warn!(file = %path.display(), "could not read file: {e}");
            let mut sink = IssueSink::new();
            sink.push(
                IssueCategory::File,
                format!("Could not read file: {e}"),
                path,
                None,
            );
            return FileReport {
                module,
                path: path.to_path_buf(),
                content: String::new(),
                facts: None,
                issues: sink.into_issues(),
            };
        }
    };
    let content = String::from_utf8_lossy(&source.content).into_owned();

    let parser = Parser::new();
    match parser.parse_source(&source) {
        ParseOutcome::Parsed(parse) => {
            let facts = extract_facts(&parse, &module);
            let issues = match reuse.get(parse.path.to_string_lossy().as_ref()) {
                Some(cached) => cached.clone(),
                None => {
                    let mut sink = IssueSink::new();
                    run_checkers(checkers, &parse, &mut sink);
                    sink.into_issues()
                }
            };
            FileReport {
                module,
                path: parse.path.clone(),
                content,
                facts: Some(facts),
                issues,
            }
        }
        ParseOutcome::Failed { path, kind, reason } => {
            tracing::warn!(file = %path.display(), "could not parse file: {reason}");
            let category = match kind {
                FailureKind::Unreadable => IssueCategory::File,
                FailureKind::Syntax => IssueCategory::Parsing,
            };
            let mut sink = IssueSink::new();
            sink.push(
                category,
                format!("Could not parse file: {reason}"),
                &path,
                None,
            );
            FileReport {
                module,
                path,
                content,
                facts: None,
                issues: sink.into_issues(),
            }
        }
    }
}
