//! Change notifications published by the workflow store
//!
//! The rendering layer subscribes through an `EventSink` and re-reads
//! store state when an event arrives.

use serde::{Deserialize, Serialize};

use crate::types::{NodeStatus, WorkflowId};

/// Trait for sending store events
///
/// This abstracts over the transport mechanism (UI channel, mpsc, etc.)
/// so the store can be embedded in different hosts.
pub trait EventSink: Send + Sync {
    /// Send an event
    ///
    /// Returns an error if the event could not be sent (e.g., channel closed)
    fn send(&self, event: StoreEvent) -> Result<(), EventError>;
}

/// Error when sending events fails
#[derive(Debug, Clone)]
pub struct EventError {
    pub message: String,
}

impl std::fmt::Display for EventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Event error: {}", self.message)
    }
}

impl std::error::Error for EventError {}

impl EventError {
    pub fn channel_closed() -> Self {
        Self {
            message: "Channel closed".to_string(),
        }
    }
}

/// Events emitted after a store transition completes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StoreEvent {
    #[serde(rename_all = "camelCase")]
    WorkflowCreated { workflow_id: WorkflowId },

    #[serde(rename_all = "camelCase")]
    WorkflowLoaded { workflow_id: WorkflowId },

    /// The active workflow was closed
    WorkflowClosed,

    /// Nodes or edges of the active workflow changed
    #[serde(rename_all = "camelCase")]
    GraphChanged {
        workflow_id: WorkflowId,
        node_count: usize,
        edge_count: usize,
    },

    /// Name, description, tags, status or execution settings changed
    #[serde(rename_all = "camelCase")]
    DetailsChanged { workflow_id: WorkflowId },

    #[serde(rename_all = "camelCase")]
    HistoryChanged {
        index: usize,
        can_undo: bool,
        can_redo: bool,
    },

    #[serde(rename_all = "camelCase")]
    WorkflowSaved { workflow_id: WorkflowId, version: u64 },

    #[serde(rename_all = "camelCase")]
    WorkflowDeleted { workflow_id: WorkflowId },

    #[serde(rename_all = "camelCase")]
    WorkflowDuplicated {
        source_id: WorkflowId,
        workflow_id: WorkflowId,
    },

    #[serde(rename_all = "camelCase")]
    WorkflowImported { workflow_id: WorkflowId },

    /// The known-workflows collection was replaced wholesale
    #[serde(rename_all = "camelCase")]
    WorkflowsRefreshed { count: usize },

    #[serde(rename_all = "camelCase")]
    SelectionChanged { node_ids: Vec<String> },

    #[serde(rename_all = "camelCase")]
    NodeStatusChanged { node_id: String, status: NodeStatus },

    #[serde(rename_all = "camelCase")]
    ExecutionLogChanged { len: usize },

    #[serde(rename_all = "camelCase")]
    SidebarToggled { open: bool },
}

/// A no-op event sink that discards all events
///
/// Useful for testing or when events aren't needed.
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn send(&self, _event: StoreEvent) -> Result<(), EventError> {
        Ok(())
    }
}

/// A vector-based event sink that collects events
///
/// Useful for testing to verify events were emitted correctly.
pub struct VecEventSink {
    events: parking_lot::Mutex<Vec<StoreEvent>>,
}

impl VecEventSink {
    pub fn new() -> Self {
        Self {
            events: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Get all collected events
    pub fn events(&self) -> Vec<StoreEvent> {
        self.events.lock().clone()
    }

    /// Clear all collected events
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Default for VecEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for VecEventSink {
    fn send(&self, event: StoreEvent) -> Result<(), EventError> {
        self.events.lock().push(event);
        Ok(())
    }
}
