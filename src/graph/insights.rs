//! Derived insights over the aggregated dependency graph: entry points,
//! core components, and common call flows.

use std::collections::HashMap;

use petgraph::graph::DiGraph;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use super::DependencyGraph;

/// A module with both high incoming and high outgoing import degree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreComponent {
    pub module: String,
    pub incoming: usize,
    pub outgoing: usize,
}

/// A function called from many distinct call sites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonFlow {
    pub function: String,
    pub call_count: usize,
}

/// Insight summary attached to an analysis bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub entry_points: Vec<String>,
    pub core_components: Vec<CoreComponent>,
    pub common_flows: Vec<CommonFlow>,
}

impl Insights {
    pub fn derive(graph: &DependencyGraph) -> Self {
        Self {
            entry_points: graph.entry_points(),
            core_components: graph.core_components(),
            common_flows: graph.common_flows(),
        }
    }
}

impl DependencyGraph {
    /// Modules never imported by any other analyzed module.
    pub fn entry_points(&self) -> Vec<String> {
        self.module_imports
            .keys()
            .filter(|module| {
                !self
                    .module_imports
                    .iter()
                    .any(|(other, imports)| other != *module && imports.contains(*module))
            })
            .cloned()
            .collect()
    }

    /// Modules whose importer count and import-set size both exceed the
    /// configured degree, sorted by combined degree descending.
    pub fn core_components(&self) -> Vec<CoreComponent> {
        let threshold = self.config.min_core_degree;

        let mut dag: DiGraph<&str, ()> = DiGraph::new();
        let indices: HashMap<&str, _> = self
            .module_imports
            .keys()
            .map(|m| (m.as_str(), dag.add_node(m.as_str())))
            .collect();
        for (module, imports) in &self.module_imports {
            for target in imports {
                if let (Some(&from), Some(&to)) =
                    (indices.get(module.as_str()), indices.get(target.as_str()))
                {
                    dag.add_edge(from, to, ());
                }
            }
        }

        let mut components: Vec<CoreComponent> = self
            .module_imports
            .iter()
            .filter_map(|(module, imports)| {
                let idx = indices.get(module.as_str())?;
                let incoming = dag.neighbors_directed(*idx, Direction::Incoming).count();
                // Outgoing degree counts the whole import set, including
                // stdlib and third-party modules outside the analyzed tree.
                let outgoing = imports.len();
                (incoming > threshold && outgoing > threshold).then(|| CoreComponent {
                    module: module.clone(),
                    incoming,
                    outgoing,
                })
            })
            .collect();

        components.sort_by(|a, b| {
            (b.incoming + b.outgoing)
                .cmp(&(a.incoming + a.outgoing))
                .then_with(|| a.module.cmp(&b.module))
        });
        components
    }

    /// Functions called from more than the configured number of call sites,
    /// sorted by call-site count descending.
    pub fn common_flows(&self) -> Vec<CommonFlow> {
        let mut flows: Vec<CommonFlow> = self
            .function_calls
            .iter()
            .filter(|(_, edges)| edges.len() > self.config.min_flow_calls)
            .map(|(function, edges)| CommonFlow {
                function: function.clone(),
                call_count: edges.len(),
            })
            .collect();
        flows.sort_by(|a, b| {
            b.call_count
                .cmp(&a.call_count)
                .then_with(|| a.function.cmp(&b.function))
        });
        flows
    }
}
