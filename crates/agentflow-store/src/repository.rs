//! Persistence collaborators for workflows.
//!
//! The store only needs a round trip that preserves every field of a
//! `Workflow`. The wire format belongs to the implementation: the
//! in-memory repository keeps values as-is, the file repository writes
//! one JSON document per workflow.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use agentflow_graph::Workflow;
use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::fs;

use crate::error::{Result, StoreError};

/// The external service that stores workflows
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    /// Create or update a workflow, returning the stored copy
    ///
    /// The returned workflow is authoritative and may carry
    /// fields assigned by the repository.
    async fn save(&self, workflow: &Workflow) -> Result<Workflow>;

    /// Fetch a workflow by id
    async fn fetch(&self, id: &str) -> Result<Option<Workflow>>;

    /// Delete a workflow by id. Deleting a missing workflow is not an error.
    async fn delete(&self, id: &str) -> Result<()>;

    /// List all stored workflows, oldest first
    async fn list(&self) -> Result<Vec<Workflow>>;
}

/// Repository that keeps workflows in memory.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    workflows: RwLock<HashMap<String, Workflow>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.workflows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.read().is_empty()
    }
}

#[async_trait]
impl WorkflowRepository for InMemoryRepository {
    async fn save(&self, workflow: &Workflow) -> Result<Workflow> {
        self.workflows
            .write()
            .insert(workflow.id.clone(), workflow.clone());
        Ok(workflow.clone())
    }

    async fn fetch(&self, id: &str) -> Result<Option<Workflow>> {
        Ok(self.workflows.read().get(id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.workflows.write().remove(id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Workflow>> {
        let mut workflows: Vec<Workflow> = self.workflows.read().values().cloned().collect();
        sort_oldest_first(&mut workflows);
        Ok(workflows)
    }
}

/// Repository that persists each workflow as `<dir>/<id>.json`.
///
/// The directory is created on first save.
#[derive(Debug, Clone)]
pub struct FileRepository {
    dir: PathBuf,
}

impl FileRepository {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn file_path(&self, id: &str) -> Result<PathBuf> {
        let usable = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !usable {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", id)))
    }
}

#[async_trait]
impl WorkflowRepository for FileRepository {
    async fn save(&self, workflow: &Workflow) -> Result<Workflow> {
        let file_path = self.file_path(&workflow.id)?;
        fs::create_dir_all(&self.dir).await?;

        let content = serde_json::to_string_pretty(workflow)?;
        fs::write(&file_path, content).await?;
        log::debug!("Saved workflow '{}' to {:?}", workflow.id, file_path);
        Ok(workflow.clone())
    }

    async fn fetch(&self, id: &str) -> Result<Option<Workflow>> {
        let file_path = self.file_path(id)?;
        if !fs::try_exists(&file_path).await? {
            return Ok(None);
        }

        let content = fs::read_to_string(&file_path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let file_path = self.file_path(id)?;
        if fs::try_exists(&file_path).await? {
            fs::remove_file(&file_path).await?;
            log::debug!("Deleted workflow '{}' from {:?}", id, file_path);
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Workflow>> {
        if !fs::try_exists(&self.dir).await? {
            return Ok(Vec::new());
        }

        let mut workflows = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_path = entry.path();
            if file_path.extension().map_or(true, |e| e != "json") {
                continue;
            }

            let content = match fs::read_to_string(&file_path).await {
                Ok(content) => content,
                Err(e) => {
                    log::warn!("Failed to read workflow from {:?}: {}", file_path, e);
                    continue;
                }
            };
            match serde_json::from_str::<Workflow>(&content) {
                Ok(workflow) => workflows.push(workflow),
                Err(e) => {
                    log::warn!("Failed to parse workflow from {:?}: {}", file_path, e);
                }
            }
        }

        sort_oldest_first(&mut workflows);
        Ok(workflows)
    }
}

fn sort_oldest_first(workflows: &mut [Workflow]) {
    workflows.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}
