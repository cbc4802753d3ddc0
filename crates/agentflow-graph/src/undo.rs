//! Undo/redo system using shared snapshots
//!
//! Each entry is an immutable `Arc<WorkflowData>`. The active workflow
//! and the entry under the cursor point at the same allocation, so a
//! snapshot costs one reference count until the next edit clones the
//! graph (see `Workflow::data_mut`).
//!
//! A new push discards everything after the cursor: redo is only
//! possible until the next forward edit.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::types::WorkflowData;

/// Default number of snapshots kept
pub const DEFAULT_MAX_SNAPSHOTS: usize = 100;

/// Undo/redo stack of graph snapshots
#[derive(Debug, Clone)]
pub struct UndoStack {
    snapshots: VecDeque<Arc<WorkflowData>>,
    /// Current position in the stack
    current: usize,
    /// Maximum number of snapshots to keep
    max_snapshots: usize,
}

impl UndoStack {
    /// Create a new undo stack with the specified maximum size
    pub fn new(max_snapshots: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            current: 0,
            max_snapshots: max_snapshots.max(1), // At least 1 snapshot
        }
    }

    /// Reset the stack to a single snapshot
    pub fn seed(&mut self, data: Arc<WorkflowData>) {
        self.snapshots.clear();
        self.snapshots.push_back(data);
        self.current = 0;
    }

    /// Push a new snapshot onto the stack
    ///
    /// This truncates any redo history (snapshots after current position).
    pub fn push(&mut self, data: Arc<WorkflowData>) {
        self.snapshots.truncate(self.current + 1);
        self.snapshots.push_back(data);
        self.current = self.snapshots.len() - 1;

        // Trim old snapshots if over limit
        while self.snapshots.len() > self.max_snapshots {
            self.snapshots.pop_front();
            self.current = self.current.saturating_sub(1);
        }
    }

    /// Replace the snapshot under the cursor without moving it
    pub fn replace_current(&mut self, data: Arc<WorkflowData>) {
        match self.snapshots.get_mut(self.current) {
            Some(slot) => *slot = data,
            None => self.seed(data),
        }
    }

    /// Undo: move back one snapshot
    ///
    /// Returns the previous graph state, or None if at the beginning.
    pub fn undo(&mut self) -> Option<Arc<WorkflowData>> {
        if self.can_undo() {
            self.current -= 1;
            log::debug!("Undo to snapshot {}/{}", self.current, self.snapshots.len());
            self.current()
        } else {
            None
        }
    }

    /// Redo: move forward one snapshot
    ///
    /// Returns the next graph state, or None if at the end.
    pub fn redo(&mut self) -> Option<Arc<WorkflowData>> {
        if self.can_redo() {
            self.current += 1;
            log::debug!("Redo to snapshot {}/{}", self.current, self.snapshots.len());
            self.current()
        } else {
            None
        }
    }

    /// Get the snapshot under the cursor without modifying the stack
    pub fn current(&self) -> Option<Arc<WorkflowData>> {
        self.snapshots.get(self.current).cloned()
    }

    /// Check whether `data` is the very allocation under the cursor
    pub fn is_current(&self, data: &Arc<WorkflowData>) -> bool {
        self.snapshots
            .get(self.current)
            .is_some_and(|top| Arc::ptr_eq(top, data))
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.current + 1 < self.snapshots.len()
    }

    /// Cursor position
    pub fn index(&self) -> usize {
        self.current
    }

    /// Get the number of snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Check if the stack is empty
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Clear all snapshots
    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.current = 0;
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SNAPSHOTS)
    }
}
