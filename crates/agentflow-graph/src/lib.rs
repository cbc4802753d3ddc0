//! Agentflow Graph - the workflow graph model behind the Agentflow editor
//!
//! This crate holds everything about a workflow graph that does not need
//! I/O:
//!
//! - Entity model: `Workflow`, `WorkflowData`, `Node`, `Edge`
//! - Editor adapter: lossless conversion to and from the rendering layer's shapes
//! - Structural validation: orphans, cycles, dangling edges, handle checks
//! - `UndoStack`: bounded undo/redo over shared graph snapshots
//! - `EventSink`: change notifications for whoever renders the graph
//!
//! # Example
//!
//! ```ignore
//! use agentflow_graph::{validate, NodeType, WorkflowBuilder};
//!
//! let data = WorkflowBuilder::new()
//!     .add_node("start", NodeType::Trigger, (0.0, 0.0))
//!     .add_node("research", NodeType::Agent, (0.0, 150.0))
//!     .add_edge("start", "research")
//!     .build();
//!
//! assert!(validate(&data).is_valid);
//! ```

pub mod adapter;
pub mod builder;
pub mod error;
pub mod events;
pub mod types;
pub mod undo;
pub mod validation;

// Re-export key types
pub use adapter::{
    graph_to_workflow_data, make_edge, make_node, new_edge_id, new_node_id, new_workflow_id,
    to_editor_edge, to_editor_node, to_workflow_edge, to_workflow_node, workflow_data_to_graph,
    EdgeOptions, EditorEdge, EditorGraph, EditorNode, EditorNodeType,
};
pub use builder::WorkflowBuilder;
pub use error::{GraphError, Result};
pub use events::{EventError, EventSink, NullEventSink, StoreEvent, VecEventSink};
pub use types::{
    Edge, EdgeId, ExecutionConfig, Handle, LastExecution, Node, NodeData, NodeDataPatch, NodeId,
    NodeStatus, NodeType, Position, Viewport, Workflow, WorkflowData, WorkflowId, WorkflowStatus,
};
pub use undo::UndoStack;
pub use validation::{validate, validate_workflow, ValidationError, ValidationResult};
