//! Graph mutations on the active workflow
//!
//! Structural edits record an undo step. Viewport changes and execution
//! feedback replace the current snapshot instead.

use agentflow_graph::{
    graph_to_workflow_data, make_edge, new_edge_id, Edge, EdgeOptions, EditorEdge, EditorNode,
    LastExecution, Node, NodeDataPatch, NodeStatus, Position, StoreEvent, Viewport,
};

use super::{Change, WorkflowStore};

impl WorkflowStore {
    /// Replace every node of the active graph
    pub fn update_nodes(&mut self, nodes: Vec<Node>) -> bool {
        self.change_graph(Change::Edit, move |data| {
            if data.nodes == nodes {
                return false;
            }
            data.nodes = nodes;
            true
        })
    }

    /// Replace every edge of the active graph
    pub fn update_edges(&mut self, edges: Vec<Edge>) -> bool {
        self.change_graph(Change::Edit, move |data| {
            if data.edges == edges {
                return false;
            }
            data.edges = edges;
            true
        })
    }

    /// Take the editor's nodes and edges as the new graph, as one undo step
    ///
    /// The viewport is kept. Editor-only fields (size, selection, drag
    /// state) are dropped.
    pub fn apply_editor_graph(&mut self, nodes: &[EditorNode], edges: &[EditorEdge]) -> bool {
        self.change_graph(Change::Edit, |data| {
            let incoming = graph_to_workflow_data(nodes, edges, data.viewport);
            if incoming == *data {
                return false;
            }
            *data = incoming;
            true
        })
    }

    /// Append a node. A node whose id is already in the graph is rejected.
    pub fn add_node(&mut self, node: Node) -> bool {
        self.change_graph(Change::Edit, move |data| {
            if data.find_node(&node.id).is_some() {
                log::warn!("Node '{}' already exists; ignoring add", node.id);
                return false;
            }
            data.nodes.push(node);
            true
        })
    }

    /// Remove a node together with every edge that touches it
    pub fn remove_node(&mut self, node_id: &str) -> bool {
        self.change_graph(Change::Edit, |data| {
            let before = data.nodes.len();
            data.nodes.retain(|n| n.id != node_id);
            if data.nodes.len() == before {
                return false;
            }
            data.edges.retain(|e| !e.touches(node_id));
            true
        })
    }

    /// Append an edge. An edge whose id is already in the graph is rejected.
    ///
    /// Endpoints are not checked here; dangling edges show up in validation.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        self.change_graph(Change::Edit, move |data| {
            if data.find_edge(&edge.id).is_some() {
                log::warn!("Edge '{}' already exists; ignoring add", edge.id);
                return false;
            }
            data.edges.push(edge);
            true
        })
    }

    pub fn remove_edge(&mut self, edge_id: &str) -> bool {
        self.change_graph(Change::Edit, |data| {
            let before = data.edges.len();
            data.edges.retain(|e| e.id != edge_id);
            data.edges.len() != before
        })
    }

    /// Connect two nodes with a freshly built edge, returning its id
    pub fn connect_nodes(
        &mut self,
        source: &str,
        target: &str,
        source_handle: Option<&str>,
        target_handle: Option<&str>,
    ) -> Option<String> {
        let options = EdgeOptions {
            source_handle: source_handle.map(str::to_string),
            target_handle: target_handle.map(str::to_string),
            ..EdgeOptions::default()
        };
        let edge = make_edge(new_edge_id(), source, target, options);
        let edge_id = edge.id.clone();

        self.add_edge(edge).then_some(edge_id)
    }

    /// Move a node to a new canvas position
    pub fn move_node(&mut self, node_id: &str, position: Position) -> bool {
        self.change_graph(Change::Edit, |data| match data.find_node_mut(node_id) {
            Some(node) if node.position != position => {
                node.position = position;
                true
            }
            _ => false,
        })
    }

    /// Shallow-merge `patch` into one node's data
    pub fn update_node_data(&mut self, node_id: &str, patch: NodeDataPatch) -> bool {
        if patch.is_empty() {
            return false;
        }
        self.change_graph(Change::Edit, |data| {
            let Some(node) = data.find_node_mut(node_id) else {
                return false;
            };
            let before = node.data.clone();
            patch.apply_to(&mut node.data);
            node.data != before
        })
    }

    /// Replace the viewport without adding an undo step
    pub fn update_viewport(&mut self, viewport: Viewport) -> bool {
        self.change_graph(Change::View, |data| {
            if data.viewport == viewport {
                return false;
            }
            data.viewport = viewport;
            true
        })
    }

    // =========================================================================
    // Execution feedback
    // =========================================================================

    /// Show an execution status on a node
    ///
    /// Display-only: no undo step, no unsaved changes.
    pub fn set_node_status(&mut self, node_id: &str, status: NodeStatus) -> bool {
        let changed = self.change_graph(Change::Feedback, |data| match data.find_node_mut(node_id) {
            Some(node) if node.data.status != status => {
                node.data.status = status;
                true
            }
            _ => false,
        });
        if changed {
            self.emit(StoreEvent::NodeStatusChanged {
                node_id: node_id.to_string(),
                status,
            });
        }
        changed
    }

    /// Record the outcome of a node run and set its status to match
    pub fn record_node_execution(&mut self, node_id: &str, execution: LastExecution) -> bool {
        let status = if execution.error.is_some() {
            NodeStatus::Error
        } else {
            NodeStatus::Completed
        };
        let changed = self.change_graph(Change::Feedback, |data| {
            let Some(node) = data.find_node_mut(node_id) else {
                return false;
            };
            node.data.status = status;
            node.data.last_execution = Some(execution);
            true
        });
        if changed {
            self.emit(StoreEvent::NodeStatusChanged {
                node_id: node_id.to_string(),
                status,
            });
        }
        changed
    }

    /// Put every node back to idle
    pub fn reset_node_statuses(&mut self) -> bool {
        self.change_graph(Change::Feedback, |data| {
            let mut changed = false;
            for node in data.nodes.iter_mut() {
                if node.data.status != NodeStatus::Idle {
                    node.data.status = NodeStatus::Idle;
                    changed = true;
                }
            }
            changed
        })
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Select a node; without `additive` the previous selection is replaced
    pub fn select_node(&mut self, node_id: &str, additive: bool) -> bool {
        let exists = self
            .current_data()
            .is_some_and(|data| data.find_node(node_id).is_some());
        if !exists {
            return false;
        }

        let already = self.selected_nodes.iter().any(|id| id == node_id);
        if additive {
            if already {
                return false;
            }
        } else {
            if already && self.selected_nodes.len() == 1 {
                return false;
            }
            self.selected_nodes.clear();
        }
        self.selected_nodes.push(node_id.to_string());
        self.emit_selection();
        true
    }

    pub fn deselect_node(&mut self, node_id: &str) -> bool {
        let before = self.selected_nodes.len();
        self.selected_nodes.retain(|id| id != node_id);
        if self.selected_nodes.len() == before {
            return false;
        }
        self.emit_selection();
        true
    }

    pub fn clear_selection(&mut self) {
        if !self.selected_nodes.is_empty() {
            self.selected_nodes.clear();
            self.emit_selection();
        }
    }

    /// Whether a node is in the selection
    pub fn is_selected(&self, node_id: &str) -> bool {
        self.selected_nodes.iter().any(|id| id == node_id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use agentflow_graph::{
        make_node, workflow_data_to_graph, NodeType, StoreEvent, WorkflowBuilder,
    };
    use chrono::Utc;

    use super::super::test_support::{linear_graph, store_with_sink};
    use super::*;

    fn agent(id: &str) -> Node {
        make_node(id, NodeType::Agent, (0.0, 0.0), NodeDataPatch::default())
    }

    #[test]
    fn test_mutations_without_workflow_are_noops() {
        let (mut store, sink) = store_with_sink();

        assert!(!store.add_node(agent("a")));
        assert!(!store.remove_node("a"));
        assert!(!store.update_nodes(vec![agent("a")]));
        assert!(!store.update_edges(Vec::new()));
        assert!(store.connect_nodes("a", "b", None, None).is_none());
        assert!(!store.update_viewport(Viewport {
            x: 1.0,
            y: 1.0,
            zoom: 2.0
        }));
        assert!(!store.has_unsaved_changes());
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_remove_node_cascades_edges_and_selection() {
        let (mut store, _) = store_with_sink();
        store.create_workflow("Flow", None);

        let graph = WorkflowBuilder::new()
            .add_node("A", NodeType::Trigger, (0.0, 0.0))
            .add_node("B", NodeType::Agent, (0.0, 100.0))
            .add_node("C", NodeType::Action, (0.0, 200.0))
            .add_edge("A", "B")
            .add_edge("B", "C")
            .build();
        store.update_nodes(graph.nodes);
        store.update_edges(graph.edges);
        store.select_node("B", false);

        assert!(store.remove_node("B"));

        let data = store.current_data().unwrap();
        let ids: Vec<&str> = data.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "C"]);
        assert!(data.edges.is_empty());
        assert!(store.selected_nodes().is_empty());
    }

    #[test]
    fn test_remove_node_then_undo_restores_edges() {
        let (mut store, _) = store_with_sink();
        store.create_workflow("Flow", None);
        let graph = linear_graph();
        store.update_nodes(graph.nodes);
        store.update_edges(graph.edges);

        store.remove_node("agent");
        store.undo();

        let data = store.current_data().unwrap();
        assert_eq!(data.nodes.len(), 3);
        assert_eq!(data.edges.len(), 2);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let (mut store, _) = store_with_sink();
        store.create_workflow("Flow", None);

        assert!(store.add_node(agent("a")));
        assert!(!store.add_node(agent("a")));

        let edge = make_edge("e1", "a", "a", EdgeOptions::default());
        assert!(store.add_edge(edge.clone()));
        assert!(!store.add_edge(edge));

        let data = store.current_data().unwrap();
        assert_eq!(data.nodes.len(), 1);
        assert_eq!(data.edges.len(), 1);
    }

    #[test]
    fn test_each_structural_edit_is_one_undo_step() {
        let (mut store, _) = store_with_sink();
        store.create_workflow("Flow", None);

        store.add_node(agent("a"));
        store.add_node(agent("b"));
        store.connect_nodes("a", "b", Some("bottom"), Some("top"));
        store.move_node("b", Position::new(50.0, 50.0));

        assert_eq!(store.history_len(), 5);
        assert!(store.has_unsaved_changes());
    }

    #[test]
    fn test_connect_nodes_uses_edge_defaults() {
        let (mut store, _) = store_with_sink();
        store.create_workflow("Flow", None);
        store.add_node(agent("a"));
        store.add_node(agent("b"));

        let edge_id = store
            .connect_nodes("a", "b", Some("right"), Some("left"))
            .unwrap();

        let data = store.current_data().unwrap();
        let edge = data.find_edge(&edge_id).unwrap();
        assert!(edge_id.starts_with("edge-"));
        assert!(edge.animated);
        assert_eq!(edge.source_handle.as_deref(), Some("right"));
        assert_eq!(edge.style["stroke"], "#64748b");
        assert!(store.validate_workflow().is_valid);
    }

    #[test]
    fn test_update_node_data_merges_fields() {
        let (mut store, _) = store_with_sink();
        store.create_workflow("Flow", None);
        store.add_node(agent("a"));
        store.add_node(agent("b"));

        assert!(store.update_node_data("a", NodeDataPatch::label("Researcher")));
        assert!(!store.update_node_data("missing", NodeDataPatch::label("x")));
        assert!(!store.update_node_data("a", NodeDataPatch::default()));

        let data = store.current_data().unwrap();
        let a = data.find_node("a").unwrap();
        assert_eq!(a.data.label, "Researcher");
        assert_eq!(a.data.status, NodeStatus::Idle);
        assert_eq!(data.find_node("b").unwrap().data.label, "Agent");
    }

    #[test]
    fn test_unchanged_update_records_nothing() {
        let (mut store, _) = store_with_sink();
        store.create_workflow("Flow", None);
        store.add_node(agent("a"));
        let before = Arc::clone(store.current_data().unwrap());
        let len = store.history_len();

        let nodes = before.nodes.clone();
        assert!(!store.update_nodes(nodes));
        assert!(!store.move_node("a", Position::default()));

        assert_eq!(store.history_len(), len);
        assert!(Arc::ptr_eq(store.current_data().unwrap(), &before));
    }

    #[test]
    fn test_apply_editor_graph() {
        let (mut store, _) = store_with_sink();
        store.create_workflow("Flow", None);
        store.update_viewport(Viewport {
            x: 10.0,
            y: 20.0,
            zoom: 1.5,
        });

        let mut editor = workflow_data_to_graph(&linear_graph());
        editor.nodes[0].selected = true;
        editor.nodes[0].width = Some(180.0);

        assert!(store.apply_editor_graph(&editor.nodes, &editor.edges));
        assert!(!store.apply_editor_graph(&editor.nodes, &editor.edges));

        let data = store.current_data().unwrap();
        assert_eq!(data.nodes, linear_graph().nodes);
        assert_eq!(data.viewport.zoom, 1.5);
    }

    #[test]
    fn test_viewport_does_not_add_history() {
        let (mut store, _) = store_with_sink();
        store.create_workflow("Flow", None);
        store.add_node(agent("a"));
        let len = store.history_len();

        let viewport = Viewport {
            x: 5.0,
            y: 5.0,
            zoom: 0.5,
        };
        assert!(store.update_viewport(viewport));

        assert_eq!(store.history_len(), len);
        assert!(store.has_unsaved_changes());
        let cursor = store.history.current().unwrap();
        assert!(Arc::ptr_eq(&cursor, store.current_data().unwrap()));
        assert_eq!(cursor.viewport, viewport);
    }

    #[test]
    fn test_execution_feedback_is_not_an_edit() {
        let (mut store, sink) = store_with_sink();
        store.create_workflow("Flow", None);
        store.add_node(agent("a"));
        store.has_unsaved_changes = false;
        let len = store.history_len();

        assert!(store.set_node_status("a", NodeStatus::Running));
        assert!(!store.set_node_status("a", NodeStatus::Running));
        assert!(store.record_node_execution(
            "a",
            LastExecution {
                duration: 1200,
                timestamp: Utc::now(),
                error: Some("timeout".to_string()),
            },
        ));

        assert_eq!(store.history_len(), len);
        assert!(!store.has_unsaved_changes());

        let node = store.current_data().unwrap().find_node("a").unwrap().clone();
        assert_eq!(node.data.status, NodeStatus::Error);
        assert_eq!(node.data.last_execution.unwrap().duration, 1200);

        let statuses: Vec<NodeStatus> = sink
            .events()
            .into_iter()
            .filter_map(|e| match e {
                StoreEvent::NodeStatusChanged { status, .. } => Some(status),
                _ => None,
            })
            .collect();
        assert_eq!(statuses, vec![NodeStatus::Running, NodeStatus::Error]);

        assert!(store.reset_node_statuses());
        assert_eq!(
            store.current_data().unwrap().nodes[0].data.status,
            NodeStatus::Idle
        );
    }

    #[test]
    fn test_selection() {
        let (mut store, _) = store_with_sink();
        store.create_workflow("Flow", None);
        store.add_node(agent("a"));
        store.add_node(agent("b"));

        assert!(store.select_node("a", false));
        assert!(store.select_node("b", true));
        assert!(!store.select_node("ghost", true));
        assert_eq!(store.selected_nodes(), ["a".to_string(), "b".to_string()]);

        assert!(store.select_node("b", false));
        assert_eq!(store.selected_nodes(), ["b".to_string()]);
        assert!(store.is_selected("b"));

        assert!(store.deselect_node("b"));
        assert!(!store.deselect_node("b"));
        store.select_node("a", false);
        store.clear_selection();
        assert!(store.selected_nodes().is_empty());
    }

    #[test]
    fn test_undo_prunes_selection() {
        let (mut store, _) = store_with_sink();
        store.create_workflow("Flow", None);
        store.add_node(agent("a"));
        store.select_node("a", false);

        store.undo();
        assert!(store.selected_nodes().is_empty());
    }
}
