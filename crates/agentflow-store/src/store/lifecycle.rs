//! Workflow lifecycle: create, load, save, delete, duplicate, import/export
//! and the persisted local session.

use std::collections::BTreeSet;
use std::sync::Arc;

use agentflow_graph::{
    new_workflow_id, ExecutionConfig, StoreEvent, Workflow, WorkflowId, WorkflowStatus,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::WorkflowStore;
use crate::constants::naming::COPY_SUFFIX;
use crate::error::{Result, StoreError};
use crate::export::WorkflowExport;
use crate::session::SessionSnapshot;

/// Metadata edits for the active workflow; `None` fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkflowDetails {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<BTreeSet<String>>,
    pub status: Option<WorkflowStatus>,
    pub is_public: Option<bool>,
}

impl WorkflowStore {
    /// Create an empty workflow, make it active and return its id
    pub fn create_workflow(
        &mut self,
        name: impl Into<String>,
        description: Option<&str>,
    ) -> WorkflowId {
        let mut workflow = Workflow::new(
            new_workflow_id(),
            self.config.user_id.clone(),
            name,
            Utc::now(),
        );
        if let Some(description) = description {
            workflow.description = description.to_string();
        }
        workflow.execution_config = self.config.default_execution_config.clone();

        let workflow_id = workflow.id.clone();
        log::info!("Created workflow '{}' ({})", workflow.name, workflow_id);

        self.workflows.push(workflow.clone());
        self.activate(workflow);
        self.has_unsaved_changes = false;
        self.last_saved = None;

        self.emit(StoreEvent::WorkflowCreated {
            workflow_id: workflow_id.clone(),
        });
        workflow_id
    }

    /// Make a known workflow active, discarding the previous undo history
    pub fn load_workflow(&mut self, id: &str) -> bool {
        let Some(workflow) = self.get_workflow(id).cloned() else {
            log::warn!("Workflow '{}' not found", id);
            return false;
        };

        self.last_saved = Some(workflow.updated_at);
        self.activate(workflow);
        self.has_unsaved_changes = false;

        self.emit(StoreEvent::WorkflowLoaded {
            workflow_id: id.to_string(),
        });
        true
    }

    /// Drop the active workflow along with its history and selection
    pub fn close_workflow(&mut self) -> bool {
        if self.current.take().is_none() {
            return false;
        }
        self.has_unsaved_changes = false;
        self.last_saved = None;
        self.seed_history();
        self.prune_selection();

        self.emit(StoreEvent::WorkflowClosed);
        true
    }

    pub fn update_workflow_details(&mut self, details: WorkflowDetails) -> bool {
        let Some(current) = self.current.as_mut() else {
            return false;
        };

        let mut changed = false;
        if let Some(name) = details.name.filter(|n| *n != current.name) {
            current.name = name;
            changed = true;
        }
        if let Some(description) = details.description.filter(|d| *d != current.description) {
            current.description = description;
            changed = true;
        }
        if let Some(tags) = details.tags.filter(|t| *t != current.tags) {
            current.tags = tags;
            changed = true;
        }
        if let Some(status) = details.status.filter(|s| *s != current.status) {
            current.status = status;
            changed = true;
        }
        if let Some(is_public) = details.is_public.filter(|p| *p != current.is_public) {
            current.is_public = is_public;
            changed = true;
        }

        if changed {
            let workflow_id = current.id.clone();
            self.has_unsaved_changes = true;
            self.emit(StoreEvent::DetailsChanged { workflow_id });
        }
        changed
    }

    pub fn update_execution_config(&mut self, config: ExecutionConfig) -> bool {
        let Some(current) = self.current.as_mut() else {
            return false;
        };
        if current.execution_config == config {
            return false;
        }

        current.execution_config = config;
        let workflow_id = current.id.clone();
        self.has_unsaved_changes = true;
        self.emit(StoreEvent::DetailsChanged { workflow_id });
        true
    }

    /// Persist the active workflow as the next version
    ///
    /// Returns the saved version, or `None` when nothing is active. On a
    /// persistence failure the store is left exactly as it was.
    pub async fn save_workflow(&mut self) -> Result<Option<u64>> {
        let Some(current) = self.current.as_ref() else {
            return Ok(None);
        };

        let now = Utc::now();
        let mut candidate = current.clone();
        candidate.version += 1;
        candidate.updated_at = now.max(current.updated_at);

        let mut saved = self.repository.save(&candidate).await.map_err(|e| {
            log::error!("Failed to save workflow '{}': {}", candidate.id, e);
            match e {
                StoreError::Persistence(_) => e,
                other => StoreError::persistence(other.to_string()),
            }
        })?;

        // Keep sharing the snapshot under the history cursor when the
        // repository handed back the same graph.
        if saved.workflow_data == candidate.workflow_data {
            saved.workflow_data = Arc::clone(&candidate.workflow_data);
        } else {
            self.history
                .replace_current(Arc::clone(&saved.workflow_data));
        }

        let version = saved.version;
        match self.workflows.iter_mut().find(|w| w.id == saved.id) {
            Some(entry) => *entry = saved.clone(),
            None => self.workflows.push(saved.clone()),
        }
        log::info!("Saved workflow '{}' at version {}", saved.id, version);

        let workflow_id = saved.id.clone();
        self.current = Some(saved);
        self.has_unsaved_changes = false;
        self.last_saved = Some(now);

        self.emit(StoreEvent::WorkflowSaved {
            workflow_id,
            version,
        });
        Ok(Some(version))
    }

    /// Forget a workflow locally; deleting the active one closes it
    pub fn delete_workflow(&mut self, id: &str) -> bool {
        let before = self.workflows.len();
        self.workflows.retain(|w| w.id != id);
        let mut removed = self.workflows.len() != before;

        if self.current.as_ref().is_some_and(|w| w.id == id) {
            self.close_workflow();
            removed = true;
        }

        if removed {
            self.emit(StoreEvent::WorkflowDeleted {
                workflow_id: id.to_string(),
            });
        }
        removed
    }

    /// Delete from the repository first, then locally
    pub async fn delete_workflow_remote(&mut self, id: &str) -> Result<bool> {
        self.repository.delete(id).await?;
        Ok(self.delete_workflow(id))
    }

    /// Copy a known workflow under a fresh id; the active workflow is unaffected
    pub fn duplicate_workflow(&mut self, id: &str) -> Option<WorkflowId> {
        let source = self.get_workflow(id)?;

        let now = Utc::now();
        let mut copy = source.clone();
        copy.id = new_workflow_id();
        copy.name = format!("{}{}", source.name, COPY_SUFFIX);
        copy.version = 1;
        copy.created_at = now;
        copy.updated_at = now;

        let workflow_id = copy.id.clone();
        self.workflows.push(copy);

        self.emit(StoreEvent::WorkflowDuplicated {
            source_id: id.to_string(),
            workflow_id: workflow_id.clone(),
        });
        Some(workflow_id)
    }

    /// Serialize the active workflow as an export document
    ///
    /// Empty when nothing is active.
    pub fn export_workflow(&self) -> String {
        let Some(current) = self.current.as_ref() else {
            return String::new();
        };

        match WorkflowExport::new(current.clone(), Utc::now()).to_json() {
            Ok(json) => json,
            Err(e) => {
                log::error!("Failed to export workflow '{}': {}", current.id, e);
                String::new()
            }
        }
    }

    /// Import an export document as a new active workflow
    ///
    /// Malformed input is reported and ignored.
    pub fn import_workflow(&mut self, input: &str) -> Option<WorkflowId> {
        let export = match WorkflowExport::from_json(input) {
            Ok(export) => export,
            Err(e) => {
                log::warn!("Ignoring workflow import: {}", e);
                return None;
            }
        };

        let now = Utc::now();
        let mut workflow = export.workflow;
        workflow.id = new_workflow_id();
        workflow.user_id = self.config.user_id.clone();
        workflow.created_at = now;
        workflow.updated_at = now;

        let workflow_id = workflow.id.clone();
        log::info!("Imported workflow '{}' as {}", workflow.name, workflow_id);

        self.workflows.push(workflow.clone());
        self.activate(workflow);
        self.has_unsaved_changes = true;
        self.last_saved = None;

        self.emit(StoreEvent::WorkflowImported {
            workflow_id: workflow_id.clone(),
        });
        Some(workflow_id)
    }

    /// Replace the known workflows with the repository's list
    pub async fn refresh_workflows(&mut self) -> Result<usize> {
        let workflows = self.repository.list().await?;
        let count = workflows.len();
        self.workflows = workflows;

        self.emit(StoreEvent::WorkflowsRefreshed { count });
        Ok(count)
    }

    // =========================================================================
    // Local session
    // =========================================================================

    pub fn session_snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_workflow: self.current.clone(),
            workflows: self.workflows.clone(),
            sidebar_open: self.sidebar_open,
            has_unsaved_changes: self.has_unsaved_changes,
            last_saved: self.last_saved,
        }
    }

    /// Restore a session; history starts over from the restored workflow
    pub fn restore_session(&mut self, snapshot: SessionSnapshot) {
        let count = snapshot.workflows.len();
        self.workflows = snapshot.workflows;
        self.current = snapshot.current_workflow;
        self.sidebar_open = snapshot.sidebar_open;
        self.has_unsaved_changes = snapshot.has_unsaved_changes;
        self.last_saved = snapshot.last_saved;

        self.selected_nodes.clear();
        self.execution_logs.clear();
        self.seed_history();

        self.emit(StoreEvent::WorkflowsRefreshed { count });
        if let Some(current) = self.current.as_ref() {
            self.emit(StoreEvent::WorkflowLoaded {
                workflow_id: current.id.clone(),
            });
        }
    }

    /// Write the session to the configured session file
    ///
    /// Returns `false` when no session file is configured.
    pub async fn persist_session(&self) -> Result<bool> {
        let Some(path) = self.config.session_path.as_deref() else {
            return Ok(false);
        };
        self.session_snapshot().save(path).await?;
        Ok(true)
    }

    /// Restore the session from the configured session file, if there is one
    pub async fn restore_persisted_session(&mut self) -> Result<bool> {
        let Some(path) = self.config.session_path.clone() else {
            return Ok(false);
        };
        match SessionSnapshot::load(&path).await? {
            Some(snapshot) => {
                self.restore_session(snapshot);
                log::info!("Restored session from {:?}", path);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn activate(&mut self, workflow: Workflow) {
        self.current = Some(workflow);
        self.clear_selection();
        self.seed_history();
    }
}
