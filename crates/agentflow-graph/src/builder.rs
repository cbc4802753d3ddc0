//! Fluent builder for workflow graphs
//!
//! Provides a fluent API for constructing graphs programmatically.

use crate::adapter::{make_edge, make_node, EdgeOptions};
use crate::types::{Edge, Node, NodeDataPatch, NodeType, Position, Viewport, WorkflowData};

/// Fluent builder for constructing `WorkflowData`
///
/// # Example
///
/// ```ignore
/// let data = WorkflowBuilder::new()
///     .add_node("start", NodeType::Trigger, (0.0, 0.0))
///     .with_label("On webhook")
///     .add_node("notify", NodeType::Action, (0.0, 150.0))
///     .add_edge("start", "notify")
///     .build();
/// ```
#[derive(Default)]
pub struct WorkflowBuilder {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    edge_counter: usize,
}

impl WorkflowBuilder {
    /// Create a new workflow builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the graph
    pub fn add_node(
        mut self,
        id: impl Into<String>,
        node_type: NodeType,
        position: impl Into<Position>,
    ) -> Self {
        self.nodes
            .push(make_node(id, node_type, position, NodeDataPatch::default()));
        self
    }

    /// Set the label on the most recently added node
    ///
    /// Must be called immediately after `add_node`.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        if let Some(node) = self.nodes.last_mut() {
            node.data.label = label.into();
        }
        self
    }

    /// Set config on the most recently added node
    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        if let (Some(node), serde_json::Value::Object(map)) = (self.nodes.last_mut(), config) {
            node.data.config = map;
        }
        self
    }

    /// Add an edge between two nodes (auto-generates edge ID)
    pub fn add_edge(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.edge_counter += 1;
        let id = format!("edge-{}", self.edge_counter);
        self.edges
            .push(make_edge(id, source, target, EdgeOptions::default()));
        self
    }

    /// Add an edge between two named handles (auto-generates edge ID)
    pub fn add_edge_between(
        mut self,
        source: impl Into<String>,
        source_handle: impl Into<String>,
        target: impl Into<String>,
        target_handle: impl Into<String>,
    ) -> Self {
        self.edge_counter += 1;
        let id = format!("edge-{}", self.edge_counter);
        self.edges.push(make_edge(
            id,
            source,
            target,
            EdgeOptions::handles(source_handle, target_handle),
        ));
        self
    }

    /// Add an edge with an explicit ID
    pub fn add_edge_with_id(
        mut self,
        edge_id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.edges
            .push(make_edge(edge_id, source, target, EdgeOptions::default()));
        self
    }

    /// Build the graph without validation
    pub fn build(self) -> WorkflowData {
        WorkflowData {
            nodes: self.nodes,
            edges: self.edges,
            viewport: Viewport::default(),
        }
    }
}
