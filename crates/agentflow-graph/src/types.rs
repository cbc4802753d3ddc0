//! Core types for workflow graphs
//!
//! These types define a workflow and the graph it carries: nodes,
//! edges, viewport and execution settings. They are plain data. Every
//! mutation goes through the store, which replaces values instead of
//! patching shared ones, so an `Arc` comparison is enough to tell
//! whether a graph changed.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Unique identifier for a node
pub type NodeId = String;

/// Unique identifier for an edge
pub type EdgeId = String;

/// Unique identifier for a workflow
pub type WorkflowId = String;

/// A connection port on the side of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handle {
    Top,
    Bottom,
    Left,
    Right,
}

impl Handle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Handle::Top => "top",
            Handle::Bottom => "bottom",
            Handle::Left => "left",
            Handle::Right => "right",
        }
    }
}

impl FromStr for Handle {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Handle::Top),
            "bottom" => Ok(Handle::Bottom),
            "left" => Ok(Handle::Left),
            "right" => Ok(Handle::Right),
            other => Err(GraphError::UnknownHandle(other.to_string())),
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a node
///
/// The category decides which handles a node exposes in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// Runs an agent (LLM, tool user, etc.)
    Agent,
    /// Branches the flow
    Condition,
    /// Starts a workflow (schedule, webhook, manual)
    Trigger,
    /// Performs a side effect (HTTP call, notification, etc.)
    Action,
}

impl NodeType {
    /// All categories, in palette order
    pub const ALL: [NodeType; 4] = [
        NodeType::Trigger,
        NodeType::Agent,
        NodeType::Condition,
        NodeType::Action,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Agent => "agent",
            NodeType::Condition => "condition",
            NodeType::Trigger => "trigger",
            NodeType::Action => "action",
        }
    }

    /// Get a human-readable label for this node type.
    pub fn label(&self) -> &'static str {
        match self {
            NodeType::Agent => "Agent",
            NodeType::Condition => "Condition",
            NodeType::Trigger => "Trigger",
            NodeType::Action => "Action",
        }
    }

    /// Handles that accept incoming edges.
    pub fn target_handles(&self) -> &'static [Handle] {
        match self {
            NodeType::Trigger => &[],
            NodeType::Agent => &[Handle::Top, Handle::Left],
            NodeType::Condition => &[Handle::Top],
            NodeType::Action => &[Handle::Top, Handle::Left],
        }
    }

    /// Handles that start outgoing edges.
    pub fn source_handles(&self) -> &'static [Handle] {
        match self {
            NodeType::Trigger => &[Handle::Bottom, Handle::Right],
            NodeType::Agent => &[Handle::Bottom, Handle::Right],
            NodeType::Condition => &[Handle::Left, Handle::Right, Handle::Bottom],
            NodeType::Action => &[Handle::Bottom],
        }
    }
}

impl FromStr for NodeType {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "agent" => Ok(NodeType::Agent),
            "condition" => Ok(NodeType::Condition),
            "trigger" => Ok(NodeType::Trigger),
            "action" => Ok(NodeType::Action),
            other => Err(GraphError::UnknownNodeType(other.to_string())),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Execution state shown on a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Error,
}

/// Summary of the most recent run of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastExecution {
    /// Wall-clock duration in milliseconds
    pub duration: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-instance data carried by a node
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    /// Semantic sub-kind (e.g. "researcher", "http-request")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<String>,
    /// Opaque node configuration
    #[serde(default)]
    pub config: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub status: NodeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_execution: Option<LastExecution>,
}

/// A partial update to `NodeData`
///
/// Fields that are `Some` replace the corresponding field; the rest are
/// left alone. Deserializes from a partial JSON object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeDataPatch {
    pub agent_type: Option<String>,
    pub config: Option<serde_json::Map<String, serde_json::Value>>,
    pub label: Option<String>,
    pub status: Option<NodeStatus>,
    pub last_execution: Option<LastExecution>,
}

impl NodeDataPatch {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn status(status: NodeStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Shallow-merge this patch into `data`
    pub fn apply_to(self, data: &mut NodeData) {
        if let Some(agent_type) = self.agent_type {
            data.agent_type = Some(agent_type);
        }
        if let Some(config) = self.config {
            data.config = config;
        }
        if let Some(label) = self.label {
            data.label = label;
        }
        if let Some(status) = self.status {
            data.status = status;
        }
        if let Some(last_execution) = self.last_execution {
            data.last_execution = Some(last_execution);
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A node instance in a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique identifier for this node instance
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub position: Position,
    pub data: NodeData,
}

/// An edge connecting two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Unique identifier for this edge
    pub id: EdgeId,
    /// Source node ID
    pub source: NodeId,
    /// Target node ID
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    /// Rendering hint for the editor
    #[serde(rename = "type", default = "default_edge_type")]
    pub edge_type: String,
    #[serde(default = "default_animated")]
    pub animated: bool,
    /// Opaque style record
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub style: serde_json::Value,
}

/// Edge type used when none is given
pub const DEFAULT_EDGE_TYPE: &str = "smoothstep";

fn default_edge_type() -> String {
    DEFAULT_EDGE_TYPE.to_string()
}

fn default_animated() -> bool {
    true
}

impl Edge {
    /// Check whether this edge starts or ends at the given node
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// Viewport state for the workflow editor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

/// A complete workflow graph
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkflowData {
    /// Nodes in display order
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Edges connecting nodes
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub viewport: Viewport,
}

impl WorkflowData {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Find a node by ID
    pub fn find_node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Find a node by ID (mutable)
    pub fn find_node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Find an edge by ID
    pub fn find_edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Get edges coming into a node
    pub fn incoming_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.target == node_id)
    }

    /// Get edges going out of a node
    pub fn outgoing_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.source == node_id)
    }

    /// Get every edge incident to a node
    pub fn edges_touching<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.touches(node_id))
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Runtime settings used when a workflow is executed
///
/// Opaque to the graph engine; carried and persisted as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    pub timeout_ms: u64,
    pub retry_count: u32,
    pub parallel: bool,
    #[serde(default)]
    pub variables: serde_json::Map<String, serde_json::Value>,
}

impl ExecutionConfig {
    pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
    pub const DEFAULT_RETRY_COUNT: u32 = 3;
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
            retry_count: Self::DEFAULT_RETRY_COUNT,
            parallel: false,
            variables: serde_json::Map::new(),
        }
    }
}

/// Lifecycle state of a workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    #[default]
    Draft,
    Active,
    Paused,
    Archived,
}

/// A named, versioned container for one graph plus execution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Incremented by exactly one on every successful save
    pub version: u64,
    #[serde(default)]
    pub status: WorkflowStatus,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Shared with the undo history until the next edit
    #[serde(default)]
    pub workflow_data: Arc<WorkflowData>,
    #[serde(default)]
    pub execution_config: ExecutionConfig,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    /// Create a draft workflow at version 1 with an empty graph
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            name: name.into(),
            description: String::new(),
            version: 1,
            status: WorkflowStatus::Draft,
            is_public: false,
            tags: BTreeSet::new(),
            workflow_data: Arc::new(WorkflowData::default()),
            execution_config: ExecutionConfig::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Mutable access to the graph, cloning it first if a snapshot shares it
    pub fn data_mut(&mut self) -> &mut WorkflowData {
        Arc::make_mut(&mut self.workflow_data)
    }
}
