//! Render-facing graph model.
//!
//! Nodes and links are derived once per run after all extraction completes
//! and are handed to callers as immutable snapshots; downstream consumers
//! serialize them to JSON as-is.

use serde::{Deserialize, Serialize};

/// Kind of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Module,
    Class,
    Method,
    Function,
}

/// Kind of a graph link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    Imports,
    Contains,
    Calls,
}

/// Metrics embedded in a node. Module nodes carry aggregate counts, the
/// definition-level nodes carry their source line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functions: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methods: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// One node in the derived graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeType,
    pub metrics: NodeMetrics,
    pub code_smells: Vec<String>,
}

/// One link in the derived graph. Endpoints always reference node ids that
/// exist, since links are emitted only after the full node set is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub source: u32,
    pub target: u32,
    #[serde(rename = "type")]
    pub kind: LinkType,
}

/// The full node/link bundle consumed by report collaborators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

impl GraphData {
    /// Look up a node id by display name.
    pub fn node_id(&self, name: &str) -> Option<u32> {
        self.nodes.iter().find(|n| n.name == name).map(|n| n.id)
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_serialization_shape() {
        let node = Node {
            id: 1,
            name: "app".to_string(),
            kind: NodeType::Module,
            metrics: NodeMetrics {
                functions: Some(2),
                classes: Some(0),
                complexity: Some(3),
                ..NodeMetrics::default()
            },
            code_smells: vec![],
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "module");
        assert_eq!(json["metrics"]["functions"], 2);
        assert!(json["metrics"].get("line").is_none());
    }

    #[test]
    fn test_link_serialization_shape() {
        let link = Link {
            source: 1,
            target: 2,
            kind: LinkType::Imports,
        };
        let json = serde_json::to_value(link).unwrap();
        assert_eq!(json["type"], "imports");
    }
}
