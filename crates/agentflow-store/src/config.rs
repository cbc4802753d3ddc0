//! Store configuration
//!
//! Loaded from a JSON file; any field missing from the file falls back to
//! its default.

use std::path::{Path, PathBuf};

use agentflow_graph::ExecutionConfig;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::constants::defaults;
use crate::error::{Result, StoreError};

/// Configuration for a `WorkflowStore`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Owner stamped on new and imported workflows
    pub user_id: String,
    /// Maximum number of undo snapshots (at least 1)
    pub history_limit: usize,
    /// Maximum number of execution log entries kept in memory
    pub max_execution_logs: usize,
    /// Execution settings given to new workflows
    pub default_execution_config: ExecutionConfig,
    /// File holding the persisted local session, if any
    pub session_path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            user_id: defaults::USER_ID.to_string(),
            history_limit: defaults::HISTORY_LIMIT,
            max_execution_logs: defaults::MAX_EXECUTION_LOGS,
            default_execution_config: ExecutionConfig::default(),
            session_path: None,
        }
    }
}

impl StoreConfig {
    /// Load configuration from disk
    ///
    /// A missing file yields the defaults.
    pub async fn load(path: &Path) -> Result<Self> {
        if !fs::try_exists(path).await? {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).await?;
        let config = serde_json::from_str(&contents).map_err(StoreError::ConfigParse)?;
        log::debug!("Loaded store configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to disk
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents).await?;

        log::info!("Store configuration saved to {:?}", path);
        Ok(())
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_path = Some(path.into());
        self
    }
}
