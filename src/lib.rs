//! Treeline - dependency graph and code quality analysis for Python codebases.
//!
//! Treeline walks a directory of Python sources, parses each file with
//! tree-sitter, extracts imports, functions, classes, and call sites, runs a
//! set of quality checkers (complexity, code smells, style, security,
//! duplication), and aggregates everything into a render-ready node/link
//! graph with derived insights (entry points, core components, common call
//! flows).
//!
//! # Example
//!
//! ```no_run
//! use treeline::config::Config;
//! use treeline::graph::DependencyGraph;
//!
//! let config = Config::default();
//! let graph = DependencyGraph::analyze_directory("./src", &config).unwrap();
//! let data = graph.graph_data();
//! println!("{} nodes, {} links", data.nodes.len(), data.links.len());
//! ```

pub mod cache;
pub mod checkers;
pub mod cli;
pub mod config;
pub mod core;
pub mod extract;
pub mod graph;
pub mod output;
pub mod parser;
pub mod quality;

pub use config::Config;
pub use core::{Error, Result};
pub use graph::{AnalysisBundle, DependencyGraph};
