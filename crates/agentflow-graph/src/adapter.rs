//! Conversion between the editor's graph shapes and `WorkflowData`
//!
//! The editor keys node renderers by a type string such as `agentNode`,
//! and carries incidental UI state (selection, drag, measured size) that
//! has no place in the persisted graph. Everything here is pure: inputs
//! are borrowed, outputs are fresh values.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GraphError;
use crate::types::{
    Edge, Node, NodeData, NodeDataPatch, NodeId, NodeType, Position, Viewport, WorkflowData,
    DEFAULT_EDGE_TYPE,
};

/// Suffix appended to a node category to form the editor type
pub const EDITOR_TYPE_SUFFIX: &str = "Node";

/// Node type as the editor names it (`agent` <-> `agentNode`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EditorNodeType(pub NodeType);

impl EditorNodeType {
    pub fn node_type(&self) -> NodeType {
        self.0
    }
}

impl TryFrom<String> for EditorNodeType {
    type Error = GraphError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let category = value
            .strip_suffix(EDITOR_TYPE_SUFFIX)
            .ok_or_else(|| GraphError::InvalidEditorType(value.clone()))?;
        Ok(Self(category.parse()?))
    }
}

impl From<EditorNodeType> for String {
    fn from(value: EditorNodeType) -> Self {
        format!("{}{}", value.0.as_str(), EDITOR_TYPE_SUFFIX)
    }
}

/// A node as the rendering layer holds it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: EditorNodeType,
    pub position: Position,
    pub data: NodeData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub dragging: bool,
}

/// An edge as the rendering layer holds it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorEdge {
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub edge_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<serde_json::Value>,
    #[serde(default)]
    pub selected: bool,
}

/// The full editor-side graph
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EditorGraph {
    pub nodes: Vec<EditorNode>,
    pub edges: Vec<EditorEdge>,
    #[serde(default)]
    pub viewport: Viewport,
}

/// Optional fields for `make_edge`
#[derive(Debug, Clone, Default)]
pub struct EdgeOptions {
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
    pub edge_type: Option<String>,
    pub animated: Option<bool>,
    pub style: Option<serde_json::Value>,
}

impl EdgeOptions {
    pub fn handles(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source_handle: Some(source.into()),
            target_handle: Some(target.into()),
            ..Self::default()
        }
    }
}

/// Stroke applied to interactively created edges
pub fn default_edge_style() -> serde_json::Value {
    serde_json::json!({ "stroke": "#64748b", "strokeWidth": 2 })
}

pub fn to_workflow_node(node: &EditorNode) -> Node {
    Node {
        id: node.id.clone(),
        node_type: node.node_type.node_type(),
        position: node.position,
        data: node.data.clone(),
    }
}

pub fn to_editor_node(node: &Node) -> EditorNode {
    EditorNode {
        id: node.id.clone(),
        node_type: EditorNodeType(node.node_type),
        position: node.position,
        data: node.data.clone(),
        width: None,
        height: None,
        selected: false,
        dragging: false,
    }
}

pub fn to_workflow_edge(edge: &EditorEdge) -> Edge {
    Edge {
        id: edge.id.clone(),
        source: edge.source.clone(),
        target: edge.target.clone(),
        source_handle: edge.source_handle.clone(),
        target_handle: edge.target_handle.clone(),
        edge_type: edge
            .edge_type
            .clone()
            .unwrap_or_else(|| DEFAULT_EDGE_TYPE.to_string()),
        animated: edge.animated.unwrap_or(true),
        style: edge.style.clone().unwrap_or(serde_json::Value::Null),
    }
}

pub fn to_editor_edge(edge: &Edge) -> EditorEdge {
    EditorEdge {
        id: edge.id.clone(),
        source: edge.source.clone(),
        target: edge.target.clone(),
        source_handle: edge.source_handle.clone(),
        target_handle: edge.target_handle.clone(),
        edge_type: Some(edge.edge_type.clone()),
        animated: Some(edge.animated),
        style: (!edge.style.is_null()).then(|| edge.style.clone()),
        selected: false,
    }
}

/// Assemble a canonical graph from the editor's nodes, edges and viewport
pub fn graph_to_workflow_data(
    nodes: &[EditorNode],
    edges: &[EditorEdge],
    viewport: Viewport,
) -> WorkflowData {
    WorkflowData {
        nodes: nodes.iter().map(to_workflow_node).collect(),
        edges: edges.iter().map(to_workflow_edge).collect(),
        viewport,
    }
}

/// Decompose a canonical graph into the editor's shapes
pub fn workflow_data_to_graph(data: &WorkflowData) -> EditorGraph {
    EditorGraph {
        nodes: data.nodes.iter().map(to_editor_node).collect(),
        edges: data.edges.iter().map(to_editor_edge).collect(),
        viewport: data.viewport,
    }
}

/// Build a new node with default data
///
/// Defaults: empty config, idle status, and the category label when the
/// patch carries none.
pub fn make_node(
    id: impl Into<String>,
    node_type: NodeType,
    position: impl Into<Position>,
    data: NodeDataPatch,
) -> Node {
    let mut node_data = NodeData {
        label: node_type.label().to_string(),
        ..NodeData::default()
    };
    data.apply_to(&mut node_data);

    Node {
        id: id.into(),
        node_type,
        position: position.into(),
        data: node_data,
    }
}

/// Build a new edge, animated with the default stroke unless overridden
pub fn make_edge(
    id: impl Into<String>,
    source: impl Into<String>,
    target: impl Into<String>,
    options: EdgeOptions,
) -> Edge {
    Edge {
        id: id.into(),
        source: source.into(),
        target: target.into(),
        source_handle: options.source_handle,
        target_handle: options.target_handle,
        edge_type: options
            .edge_type
            .unwrap_or_else(|| DEFAULT_EDGE_TYPE.to_string()),
        animated: options.animated.unwrap_or(true),
        style: options.style.unwrap_or_else(default_edge_style),
    }
}

/// Allocate a node id that has never been used before
pub fn new_node_id(node_type: NodeType) -> String {
    format!("{}-{}", node_type.as_str(), Uuid::new_v4())
}

/// Allocate an edge id that has never been used before
pub fn new_edge_id() -> String {
    format!("edge-{}", Uuid::new_v4())
}

/// Allocate a workflow id
pub fn new_workflow_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeStatus;

    fn editor_node(id: &str, node_type: &str) -> EditorNode {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "type": node_type,
            "position": {"x": 10.0, "y": 20.0},
            "data": {
                "agentType": "researcher",
                "config": {"model": "small", "temperature": 0.2},
                "label": "Research",
                "status": "running"
            },
            "width": 180.0,
            "selected": true
        }))
        .unwrap()
    }

    #[test]
    fn test_editor_type_string() {
        let value = serde_json::to_value(EditorNodeType(NodeType::Condition)).unwrap();
        assert_eq!(value, serde_json::json!("conditionNode"));

        let parsed: EditorNodeType = serde_json::from_value(serde_json::json!("triggerNode")).unwrap();
        assert_eq!(parsed.node_type(), NodeType::Trigger);
    }

    #[test]
    fn test_editor_type_rejects_missing_suffix() {
        let result = EditorNodeType::try_from("agent".to_string());
        assert_eq!(result, Err(GraphError::InvalidEditorType("agent".to_string())));

        let result = EditorNodeType::try_from("loopNode".to_string());
        assert_eq!(result, Err(GraphError::UnknownNodeType("loop".to_string())));
    }

    #[test]
    fn test_node_round_trip_keeps_semantic_fields() {
        let original = editor_node("n1", "agentNode");
        let node = to_workflow_node(&original);

        assert_eq!(node.node_type, NodeType::Agent);
        assert_eq!(node.data.status, NodeStatus::Running);

        let back = to_editor_node(&node);
        assert_eq!(back.id, original.id);
        assert_eq!(back.node_type, original.node_type);
        assert_eq!(back.position, original.position);
        assert_eq!(back.data, original.data);
        // UI-only fields are re-synthesized
        assert!(!back.selected);
        assert!(back.width.is_none());
    }

    #[test]
    fn test_edge_defaults_applied() {
        let editor_edge: EditorEdge = serde_json::from_value(serde_json::json!({
            "id": "e1",
            "source": "a",
            "target": "b",
            "sourceHandle": "bottom"
        }))
        .unwrap();

        let edge = to_workflow_edge(&editor_edge);
        assert_eq!(edge.edge_type, DEFAULT_EDGE_TYPE);
        assert!(edge.animated);
        assert_eq!(edge.source_handle.as_deref(), Some("bottom"));
        assert!(edge.target_handle.is_none());

        let back = to_editor_edge(&edge);
        assert_eq!(back.source, "a");
        assert_eq!(back.target, "b");
        assert_eq!(back.source_handle, editor_edge.source_handle);
        assert!(back.style.is_none());
    }

    #[test]
    fn test_graph_round_trip() {
        let nodes = vec![editor_node("a", "triggerNode"), editor_node("b", "actionNode")];
        let edges = vec![EditorEdge {
            id: "e1".to_string(),
            source: "a".to_string(),
            target: "b".to_string(),
            source_handle: Some("bottom".to_string()),
            target_handle: Some("top".to_string()),
            edge_type: Some("default".to_string()),
            animated: Some(false),
            style: Some(serde_json::json!({"stroke": "red"})),
            selected: false,
        }];
        let viewport = Viewport {
            x: 5.0,
            y: -3.0,
            zoom: 1.5,
        };

        let data = graph_to_workflow_data(&nodes, &edges, viewport);
        assert_eq!(data.nodes.len(), 2);
        assert_eq!(data.viewport, viewport);

        let graph = workflow_data_to_graph(&data);
        assert_eq!(graph.edges, edges);
        assert_eq!(graph.viewport, viewport);
        assert_eq!(graph_to_workflow_data(&graph.nodes, &graph.edges, graph.viewport), data);
    }

    #[test]
    fn test_make_node_defaults() {
        let node = make_node("n1", NodeType::Condition, (1.0, 2.0), NodeDataPatch::default());

        assert_eq!(node.data.label, "Condition");
        assert!(node.data.config.is_empty());
        assert_eq!(node.data.status, NodeStatus::Idle);
        assert_eq!(node.position, Position::new(1.0, 2.0));
    }

    #[test]
    fn test_make_edge_defaults() {
        let edge = make_edge("e1", "a", "b", EdgeOptions::default());

        assert!(edge.animated);
        assert_eq!(edge.edge_type, DEFAULT_EDGE_TYPE);
        assert_eq!(edge.style, default_edge_style());

        let edge = make_edge(
            "e2",
            "a",
            "b",
            EdgeOptions {
                animated: Some(false),
                ..EdgeOptions::handles("right", "left")
            },
        );
        assert!(!edge.animated);
        assert_eq!(edge.target_handle.as_deref(), Some("left"));
    }

    #[test]
    fn test_new_ids_are_unique() {
        let a = new_node_id(NodeType::Agent);
        let b = new_node_id(NodeType::Agent);
        assert_ne!(a, b);
        assert!(a.starts_with("agent-"));
        assert_ne!(new_edge_id(), new_edge_id());
    }
}
