//! The workflow store.
//!
//! `WorkflowStore` owns the active workflow, the collection of known
//! workflows, undo history, selection, execution logs and UI flags. Each
//! public operation is one state transition: the new state is computed,
//! put in place, and then announced through the `EventSink`.
//!
//! Operations that need an active workflow degrade to no-ops (returning
//! `false` or `None`) when there is none. Validation is advisory and
//! never blocks an edit.
//!
//! History invariant: while a workflow is active, the snapshot under the
//! history cursor is the same allocation as the active workflow's graph.

mod graph;
mod lifecycle;
#[cfg(test)]
mod test_support;

pub use lifecycle::WorkflowDetails;

use std::collections::VecDeque;
use std::sync::Arc;

use agentflow_graph::{
    validate, workflow_data_to_graph, EditorGraph, EventSink, NodeId, NullEventSink, StoreEvent,
    UndoStack, ValidationResult, Workflow, WorkflowData,
};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::config::StoreConfig;
use crate::execution_log::ExecutionLogEntry;
use crate::repository::{InMemoryRepository, WorkflowRepository};

/// A store shared between async tasks of one host.
///
/// Concurrent writers are serialized by the lock; the last one wins.
pub type SharedWorkflowStore = Arc<RwLock<WorkflowStore>>;

/// How a graph change is folded into history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    /// New undo step; flags unsaved changes
    Edit,
    /// Replaces the current snapshot; flags unsaved changes
    View,
    /// Replaces the current snapshot; leaves the unsaved flag alone
    Feedback,
}

pub struct WorkflowStore {
    config: StoreConfig,
    repository: Arc<dyn WorkflowRepository>,
    events: Arc<dyn EventSink>,
    /// Known workflows in creation/load order
    workflows: Vec<Workflow>,
    /// The workflow being edited
    current: Option<Workflow>,
    history: UndoStack,
    /// Selected node ids, in selection order
    selected_nodes: Vec<NodeId>,
    execution_logs: VecDeque<ExecutionLogEntry>,
    sidebar_open: bool,
    has_unsaved_changes: bool,
    last_saved: Option<DateTime<Utc>>,
}

impl WorkflowStore {
    pub fn new(config: StoreConfig, repository: Arc<dyn WorkflowRepository>) -> Self {
        let history = UndoStack::new(config.history_limit);
        Self {
            config,
            repository,
            events: Arc::new(NullEventSink),
            workflows: Vec::new(),
            current: None,
            history,
            selected_nodes: Vec::new(),
            execution_logs: VecDeque::new(),
            sidebar_open: true,
            has_unsaved_changes: false,
            last_saved: None,
        }
    }

    /// Create a store backed by an in-memory repository and default config
    pub fn in_memory() -> Self {
        Self::new(StoreConfig::default(), Arc::new(InMemoryRepository::new()))
    }

    /// Publish change notifications to `sink`
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = sink;
        self
    }

    pub fn into_shared(self) -> SharedWorkflowStore {
        Arc::new(RwLock::new(self))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn current_workflow(&self) -> Option<&Workflow> {
        self.current.as_ref()
    }

    /// The active workflow's graph
    pub fn current_data(&self) -> Option<&Arc<WorkflowData>> {
        self.current.as_ref().map(|w| &w.workflow_data)
    }

    /// The active graph in the shapes the rendering layer uses
    pub fn editor_graph(&self) -> Option<EditorGraph> {
        self.current_data().map(|data| workflow_data_to_graph(data))
    }

    pub fn workflows(&self) -> &[Workflow] {
        &self.workflows
    }

    pub fn get_workflow(&self, id: &str) -> Option<&Workflow> {
        self.workflows.iter().find(|w| w.id == id)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.has_unsaved_changes
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    pub fn selected_nodes(&self) -> &[NodeId] {
        &self.selected_nodes
    }

    pub fn execution_logs(&self) -> &VecDeque<ExecutionLogEntry> {
        &self.execution_logs
    }

    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    // =========================================================================
    // History
    // =========================================================================

    pub fn can_undo(&self) -> bool {
        self.current.is_some() && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.current.is_some() && self.history.can_redo()
    }

    pub fn history_index(&self) -> usize {
        self.history.index()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Record the active graph as a new undo step
    ///
    /// Graph edits record themselves, so this only adds an entry when the
    /// active graph is not already the snapshot under the cursor.
    pub fn save_to_history(&mut self) -> bool {
        let Some(current) = self.current.as_ref() else {
            return false;
        };
        if self.history.is_current(&current.workflow_data) {
            return false;
        }

        self.history.push(Arc::clone(&current.workflow_data));
        self.emit_history();
        true
    }

    /// Step back one snapshot. Counts as an unsaved edit.
    pub fn undo(&mut self) -> bool {
        if self.current.is_none() {
            return false;
        }
        match self.history.undo() {
            Some(data) => {
                self.restore_snapshot(data);
                true
            }
            None => false,
        }
    }

    /// Step forward one snapshot. Counts as an unsaved edit.
    pub fn redo(&mut self) -> bool {
        if self.current.is_none() {
            return false;
        }
        match self.history.redo() {
            Some(data) => {
                self.restore_snapshot(data);
                true
            }
            None => false,
        }
    }

    fn restore_snapshot(&mut self, data: Arc<WorkflowData>) {
        let Some(current) = self.current.as_mut() else {
            return;
        };
        current.workflow_data = data;
        self.has_unsaved_changes = true;

        self.emit_graph_changed();
        self.emit_history();
        self.prune_selection();
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Check the active graph; fails with a single message when nothing is active
    pub fn validate_workflow(&self) -> ValidationResult {
        match self.current_data() {
            Some(data) => validate(data),
            None => ValidationResult::failure("No workflow loaded"),
        }
    }

    // =========================================================================
    // UI state and execution logs
    // =========================================================================

    /// Flip sidebar visibility, returning the new state
    pub fn toggle_sidebar(&mut self) -> bool {
        self.set_sidebar_open(!self.sidebar_open);
        self.sidebar_open
    }

    pub fn set_sidebar_open(&mut self, open: bool) {
        if self.sidebar_open != open {
            self.sidebar_open = open;
            self.emit(StoreEvent::SidebarToggled { open });
        }
    }

    /// Append a log entry, dropping the oldest beyond the configured limit
    pub fn add_execution_log(&mut self, entry: ExecutionLogEntry) {
        self.execution_logs.push_back(entry);
        while self.execution_logs.len() > self.config.max_execution_logs.max(1) {
            self.execution_logs.pop_front();
        }
        self.emit(StoreEvent::ExecutionLogChanged {
            len: self.execution_logs.len(),
        });
    }

    pub fn clear_execution_logs(&mut self) {
        if !self.execution_logs.is_empty() {
            self.execution_logs.clear();
            self.emit(StoreEvent::ExecutionLogChanged { len: 0 });
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn emit(&self, event: StoreEvent) {
        if let Err(e) = self.events.send(event) {
            log::warn!("Failed to publish store event: {}", e);
        }
    }

    fn emit_history(&self) {
        self.emit(StoreEvent::HistoryChanged {
            index: self.history.index(),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }

    fn emit_graph_changed(&self) {
        if let Some(current) = self.current.as_ref() {
            self.emit(StoreEvent::GraphChanged {
                workflow_id: current.id.clone(),
                node_count: current.workflow_data.nodes.len(),
                edge_count: current.workflow_data.edges.len(),
            });
        }
    }

    /// Apply `edit` to a copy of the active graph and publish the result
    ///
    /// `edit` returns whether it changed anything; when it does not, the
    /// active graph keeps its previous allocation and nothing is recorded.
    fn change_graph<F>(&mut self, change: Change, edit: F) -> bool
    where
        F: FnOnce(&mut WorkflowData) -> bool,
    {
        let Some(current) = self.current.as_mut() else {
            return false;
        };

        let previous = Arc::clone(&current.workflow_data);
        if !edit(current.data_mut()) {
            current.workflow_data = previous;
            return false;
        }

        let snapshot = Arc::clone(&current.workflow_data);
        match change {
            Change::Edit => {
                self.history.push(snapshot);
                self.has_unsaved_changes = true;
            }
            Change::View => {
                self.history.replace_current(snapshot);
                self.has_unsaved_changes = true;
            }
            Change::Feedback => self.history.replace_current(snapshot),
        }

        self.emit_graph_changed();
        if change == Change::Edit {
            self.emit_history();
        }
        self.prune_selection();
        true
    }

    /// Make the history a single entry holding the active graph
    fn seed_history(&mut self) {
        match self.current.as_ref() {
            Some(current) => self.history.seed(Arc::clone(&current.workflow_data)),
            None => self.history.clear(),
        }
        self.emit_history();
    }

    /// Drop selected ids that no longer name a node in the active graph
    fn prune_selection(&mut self) {
        let before = self.selected_nodes.len();
        match self.current.as_ref() {
            Some(current) => {
                let data = &current.workflow_data;
                self.selected_nodes.retain(|id| data.find_node(id).is_some());
            }
            None => self.selected_nodes.clear(),
        }
        if self.selected_nodes.len() != before {
            self.emit_selection();
        }
    }

    fn emit_selection(&self) {
        self.emit(StoreEvent::SelectionChanged {
            node_ids: self.selected_nodes.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{linear_graph, store_with_sink, ClosedEventSink};
    use super::*;
    use agentflow_graph::{NodeType, WorkflowBuilder};
    use crate::execution_log::LogLevel;

    #[test]
    fn test_history_starts_seeded_on_create() {
        let (mut store, _) = store_with_sink();
        store.create_workflow("Flow", None);

        assert_eq!(store.history_len(), 1);
        assert_eq!(store.history_index(), 0);
        assert!(!store.can_undo());
        assert!(!store.can_redo());
    }

    #[test]
    fn test_undo_redo_restore_graphs() {
        let (mut store, _) = store_with_sink();
        store.create_workflow("Flow", None);
        let empty = Arc::clone(store.current_data().unwrap());

        store.update_nodes(linear_graph().nodes);
        let with_nodes = Arc::clone(store.current_data().unwrap());

        assert!(store.undo());
        assert!(Arc::ptr_eq(store.current_data().unwrap(), &empty));
        assert!(store.can_redo());

        assert!(store.redo());
        assert!(Arc::ptr_eq(store.current_data().unwrap(), &with_nodes));
        assert!(!store.can_redo());
    }

    #[test]
    fn test_undo_redo_at_bounds_are_noops() {
        let (mut store, _) = store_with_sink();
        store.create_workflow("Flow", None);
        let before = Arc::clone(store.current_data().unwrap());

        assert!(!store.undo());
        assert!(!store.redo());
        assert!(Arc::ptr_eq(store.current_data().unwrap(), &before));
        assert!(!store.has_unsaved_changes());
    }

    #[test]
    fn test_undo_marks_unsaved() {
        let (mut store, _) = store_with_sink();
        store.create_workflow("Flow", None);
        store.update_nodes(linear_graph().nodes);
        store.has_unsaved_changes = false;

        store.undo();
        assert!(store.has_unsaved_changes());
    }

    #[test]
    fn test_history_cursor_tracks_active_graph() {
        let (mut store, _) = store_with_sink();
        store.create_workflow("Flow", None);

        let graph = linear_graph();
        store.update_nodes(graph.nodes.clone());
        store.update_edges(graph.edges.clone());
        store.undo();

        let cursor = store.history.current().unwrap();
        assert!(Arc::ptr_eq(&cursor, store.current_data().unwrap()));
        assert!(store.current_data().unwrap().edges.is_empty());
    }

    #[test]
    fn test_new_edit_discards_redo_branch() {
        let (mut store, _) = store_with_sink();
        store.create_workflow("Flow", None);
        let graph = linear_graph();

        store.update_nodes(graph.nodes.clone());
        store.update_edges(graph.edges.clone());
        store.undo();
        assert!(store.can_redo());

        store.update_nodes(Vec::new());
        assert!(!store.can_redo());
        assert_eq!(store.history_index(), store.history_len() - 1);
    }

    #[test]
    fn test_save_to_history_skips_when_already_recorded() {
        let (mut store, _) = store_with_sink();
        assert!(!store.save_to_history());

        store.create_workflow("Flow", None);
        assert!(!store.save_to_history());
        assert_eq!(store.history_len(), 1);
    }

    #[test]
    fn test_history_respects_configured_limit() {
        let mut store = WorkflowStore::new(
            StoreConfig::default().with_history_limit(3),
            Arc::new(InMemoryRepository::new()),
        );
        store.create_workflow("Flow", None);

        for i in 0..5 {
            let data = WorkflowBuilder::new()
                .add_node(format!("n{}", i), NodeType::Agent, (0.0, 0.0))
                .build();
            store.update_nodes(data.nodes);
        }

        assert_eq!(store.history_len(), 3);
        assert_eq!(store.history_index(), 2);
    }

    #[test]
    fn test_closed_event_sink_does_not_abort_transitions() {
        let mut store = WorkflowStore::in_memory().with_event_sink(Arc::new(ClosedEventSink));
        store.create_workflow("Flow", None);

        assert!(store.update_nodes(linear_graph().nodes));
        assert!(store.undo());
        assert!(store.current_data().unwrap().is_empty());
        assert!(store.has_unsaved_changes());
    }

    #[test]
    fn test_validate_without_workflow() {
        let store = WorkflowStore::in_memory();
        let result = store.validate_workflow();

        assert!(!result.is_valid);
        assert_eq!(result.errors, vec!["No workflow loaded"]);
    }

    #[test]
    fn test_validate_delegates_to_validator() {
        let (mut store, _) = store_with_sink();
        store.create_workflow("Flow", None);
        assert_eq!(
            store.validate_workflow().errors,
            vec!["Workflow must have at least one node"]
        );

        let graph = linear_graph();
        store.update_nodes(graph.nodes);
        store.update_edges(graph.edges);
        assert!(store.validate_workflow().is_valid);
    }

    #[test]
    fn test_sidebar_toggle_emits_once_per_change() {
        let (mut store, sink) = store_with_sink();
        assert!(store.sidebar_open());

        assert!(!store.toggle_sidebar());
        store.set_sidebar_open(false);

        let toggles = sink
            .events()
            .into_iter()
            .filter(|e| matches!(e, StoreEvent::SidebarToggled { .. }))
            .count();
        assert_eq!(toggles, 1);
    }

    #[test]
    fn test_execution_log_is_bounded() {
        let mut config = StoreConfig::default();
        config.max_execution_logs = 2;
        let mut store = WorkflowStore::new(config, Arc::new(InMemoryRepository::new()));

        store.add_execution_log(ExecutionLogEntry::info("one"));
        store.add_execution_log(ExecutionLogEntry::info("two"));
        store.add_execution_log(ExecutionLogEntry::error("three").for_node("n1"));

        let messages: Vec<&str> = store
            .execution_logs()
            .iter()
            .map(|e| e.message.as_str())
            .collect();
        assert_eq!(messages, vec!["two", "three"]);
        assert_eq!(store.execution_logs()[1].level, LogLevel::Error);

        store.clear_execution_logs();
        assert!(store.execution_logs().is_empty());
    }

    #[tokio::test]
    async fn test_shared_store() {
        let shared = WorkflowStore::in_memory().into_shared();

        let id = shared.write().await.create_workflow("Shared", None);

        let store = shared.read().await;
        assert_eq!(store.current_workflow().map(|w| w.id.as_str()), Some(id.as_str()));
    }
}
