//! Structural validation for workflow graphs
//!
//! Checks run in a fixed order: emptiness, orphaned nodes, cycles,
//! dangling edges, then handle availability. Validation is advisory;
//! nothing here blocks a mutation.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::types::{Handle, WorkflowData};

/// Validation error with location context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The graph has no nodes
    EmptyWorkflow,
    /// Nodes with no incident edges, in node order
    OrphanedNodes { node_ids: Vec<String> },
    /// At least one cycle exists
    CycleDetected,
    /// An edge references a non-existent node
    UnknownNode { edge_id: String, node_id: String },
    /// An edge uses a handle the node's category does not provide
    UnavailableHandle {
        edge_id: String,
        node_id: String,
        handle: String,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyWorkflow => write!(f, "Workflow must have at least one node"),
            Self::OrphanedNodes { node_ids } => {
                write!(f, "Orphaned nodes found: {}", node_ids.join(", "))
            }
            Self::CycleDetected => write!(f, "Workflow contains cycles"),
            Self::UnknownNode { edge_id, node_id } => {
                write!(f, "Edge '{}' references unknown node '{}'", edge_id, node_id)
            }
            Self::UnavailableHandle {
                edge_id,
                node_id,
                handle,
            } => write!(
                f,
                "Edge '{}' uses handle '{}' not available on node '{}'",
                edge_id, handle, node_id
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Outcome of validating a graph, as reported to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn from_errors(errors: &[ValidationError]) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors: errors.iter().map(ToString::to_string).collect(),
        }
    }

    /// A failed result carrying a single message
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            errors: vec![message.into()],
        }
    }
}

/// Validate a graph and render the errors as messages
pub fn validate(data: &WorkflowData) -> ValidationResult {
    ValidationResult::from_errors(&validate_workflow(data))
}

/// Validate a workflow graph
///
/// Returns all validation errors found (not just the first).
pub fn validate_workflow(data: &WorkflowData) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if data.nodes.is_empty() {
        errors.push(ValidationError::EmptyWorkflow);
    }
    detect_orphans(data, &mut errors);
    if has_cycle(data) {
        errors.push(ValidationError::CycleDetected);
    }
    validate_edge_references(data, &mut errors);
    validate_handles(data, &mut errors);

    errors
}

/// Report every node no edge touches, when there is more than one node
fn detect_orphans(data: &WorkflowData, errors: &mut Vec<ValidationError>) {
    if data.nodes.len() <= 1 {
        return;
    }

    let connected: HashSet<&str> = data
        .edges
        .iter()
        .flat_map(|e| [e.source.as_str(), e.target.as_str()])
        .collect();

    let node_ids: Vec<String> = data
        .nodes
        .iter()
        .filter(|n| !connected.contains(n.id.as_str()))
        .map(|n| n.id.clone())
        .collect();

    if !node_ids.is_empty() {
        errors.push(ValidationError::OrphanedNodes { node_ids });
    }
}

/// Depth-first search from each node in order, tracking the nodes on the
/// current path. Stops at the first back edge.
///
/// Iterative so deep graphs cannot overflow the call stack.
fn has_cycle(data: &WorkflowData) -> bool {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in &data.edges {
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut on_stack: HashSet<&str> = HashSet::new();

    for node in &data.nodes {
        let start = node.id.as_str();
        if !visited.insert(start) {
            continue;
        }
        on_stack.insert(start);

        // (node, index of the next child to explore)
        let mut stack: Vec<(&str, usize)> = vec![(start, 0)];
        while let Some(&(current, child_index)) = stack.last() {
            let children = adjacency.get(current).map(Vec::as_slice).unwrap_or(&[]);
            match children.get(child_index) {
                Some(&next) => {
                    if let Some(top) = stack.last_mut() {
                        top.1 += 1;
                    }
                    if on_stack.contains(next) {
                        return true;
                    }
                    if visited.insert(next) {
                        on_stack.insert(next);
                        stack.push((next, 0));
                    }
                }
                None => {
                    on_stack.remove(current);
                    stack.pop();
                }
            }
        }
    }

    false
}

/// Check that all edge source/target nodes exist
fn validate_edge_references(data: &WorkflowData, errors: &mut Vec<ValidationError>) {
    let node_ids: HashSet<&str> = data.nodes.iter().map(|n| n.id.as_str()).collect();

    for edge in &data.edges {
        for endpoint in [&edge.source, &edge.target] {
            if !node_ids.contains(endpoint.as_str()) {
                errors.push(ValidationError::UnknownNode {
                    edge_id: edge.id.clone(),
                    node_id: endpoint.clone(),
                });
            }
        }
    }
}

/// Check that named handles exist on the node's category
///
/// Handle names outside top/bottom/left/right are left to the editor.
fn validate_handles(data: &WorkflowData, errors: &mut Vec<ValidationError>) {
    for edge in &data.edges {
        if let (Some(handle), Some(node)) = (&edge.source_handle, data.find_node(&edge.source)) {
            if let Ok(parsed) = handle.parse::<Handle>() {
                if !node.node_type.source_handles().contains(&parsed) {
                    errors.push(ValidationError::UnavailableHandle {
                        edge_id: edge.id.clone(),
                        node_id: node.id.clone(),
                        handle: handle.clone(),
                    });
                }
            }
        }
        if let (Some(handle), Some(node)) = (&edge.target_handle, data.find_node(&edge.target)) {
            if let Ok(parsed) = handle.parse::<Handle>() {
                if !node.node_type.target_handles().contains(&parsed) {
                    errors.push(ValidationError::UnavailableHandle {
                        edge_id: edge.id.clone(),
                        node_id: node.id.clone(),
                        handle: handle.clone(),
                    });
                }
            }
        }
    }
}
