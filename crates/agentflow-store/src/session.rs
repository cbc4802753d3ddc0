//! Local session snapshot that survives process restarts
//!
//! Holds the active workflow, the known-workflows collection, sidebar
//! visibility, the unsaved-changes flag and the last-saved timestamp.
//! Execution logs, selection and undo history are not included.

use std::path::Path;

use agentflow_graph::Workflow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    #[serde(default)]
    pub current_workflow: Option<Workflow>,
    #[serde(default)]
    pub workflows: Vec<Workflow>,
    #[serde(default = "default_sidebar_open")]
    pub sidebar_open: bool,
    #[serde(default)]
    pub has_unsaved_changes: bool,
    #[serde(default)]
    pub last_saved: Option<DateTime<Utc>>,
}

fn default_sidebar_open() -> bool {
    true
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            current_workflow: None,
            workflows: Vec::new(),
            sidebar_open: default_sidebar_open(),
            has_unsaved_changes: false,
            last_saved: None,
        }
    }
}

impl SessionSnapshot {
    /// Load a snapshot from disk; `None` when the file does not exist
    pub async fn load(path: &Path) -> Result<Option<Self>> {
        if !fs::try_exists(path).await? {
            return Ok(None);
        }

        let contents = fs::read_to_string(path).await?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Save the snapshot to disk
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let contents = serde_json::to_string(self)?;
        fs::write(path, contents).await?;
        log::debug!("Session saved to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_session_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = SessionSnapshot::load(&temp_dir.path().join("session.json"))
            .await
            .unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state").join("session.json");

        let workflow = Workflow::new("wf-1", "user-1", "Session", Utc::now());
        let snapshot = SessionSnapshot {
            current_workflow: Some(workflow.clone()),
            workflows: vec![workflow],
            sidebar_open: false,
            has_unsaved_changes: true,
            last_saved: Some(Utc::now()),
        };
        snapshot.save(&path).await.unwrap();

        let loaded = SessionSnapshot::load(&path).await.unwrap().unwrap();
        assert_eq!(loaded, snapshot);
    }
}
