//! Shared fixtures for store tests

use std::sync::Arc;

use agentflow_graph::{
    make_node, EventError, EventSink, NodeDataPatch, NodeType, StoreEvent, VecEventSink, Workflow,
    WorkflowBuilder, WorkflowData,
};
use async_trait::async_trait;

use super::WorkflowStore;
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::repository::{InMemoryRepository, WorkflowRepository};

/// start (trigger) -> agent -> end (action)
pub(crate) fn linear_graph() -> WorkflowData {
    WorkflowBuilder::new()
        .add_node("start", NodeType::Trigger, (0.0, 0.0))
        .add_node("agent", NodeType::Agent, (0.0, 150.0))
        .with_label("Researcher")
        .add_node("end", NodeType::Action, (0.0, 300.0))
        .add_edge("start", "agent")
        .add_edge("agent", "end")
        .build()
}

/// In-memory store whose events are collected
pub(crate) fn store_with_sink() -> (WorkflowStore, Arc<VecEventSink>) {
    let sink = Arc::new(VecEventSink::new());
    let store = WorkflowStore::in_memory().with_event_sink(sink.clone());
    (store, sink)
}

/// Event sink whose receiver has gone away
pub(crate) struct ClosedEventSink;

impl EventSink for ClosedEventSink {
    fn send(&self, _event: StoreEvent) -> std::result::Result<(), EventError> {
        Err(EventError::channel_closed())
    }
}

/// Store over the given repository
pub(crate) fn store_with_repository(repository: Arc<dyn WorkflowRepository>) -> WorkflowStore {
    WorkflowStore::new(StoreConfig::default(), repository)
}

pub(crate) fn memory_repository() -> Arc<InMemoryRepository> {
    Arc::new(InMemoryRepository::new())
}

/// Node the annotating repository adds to every saved graph
pub(crate) const ANNOTATION_NODE_ID: &str = "server-note";

/// Repository that hands back a different graph than it was given
pub(crate) struct AnnotatingRepository;

#[async_trait]
impl WorkflowRepository for AnnotatingRepository {
    async fn save(&self, workflow: &Workflow) -> Result<Workflow> {
        let mut stored = workflow.clone();
        stored.data_mut().nodes.push(make_node(
            ANNOTATION_NODE_ID,
            NodeType::Action,
            (0.0, 450.0),
            NodeDataPatch::label("Note"),
        ));
        Ok(stored)
    }

    async fn fetch(&self, _id: &str) -> Result<Option<Workflow>> {
        Ok(None)
    }

    async fn delete(&self, _id: &str) -> Result<()> {
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Workflow>> {
        Ok(Vec::new())
    }
}

/// Repository that rejects every request
pub(crate) struct FailingRepository;

#[async_trait]
impl WorkflowRepository for FailingRepository {
    async fn save(&self, _workflow: &Workflow) -> Result<Workflow> {
        Err(StoreError::persistence("service unavailable"))
    }

    async fn fetch(&self, _id: &str) -> Result<Option<Workflow>> {
        Err(StoreError::persistence("service unavailable"))
    }

    async fn delete(&self, _id: &str) -> Result<()> {
        Err(StoreError::persistence("service unavailable"))
    }

    async fn list(&self) -> Result<Vec<Workflow>> {
        Err(StoreError::persistence("service unavailable"))
    }
}
