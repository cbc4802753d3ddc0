//! Portable export document for a single workflow
//!
//! Shape: `{ "workflow": {...}, "exportedAt": "...", "version": "1.0" }`.

use agentflow_graph::Workflow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::export::FORMAT_VERSION;
use crate::error::Result;

/// A workflow wrapped with export metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowExport {
    pub workflow: Workflow,
    #[serde(default = "Utc::now")]
    pub exported_at: DateTime<Utc>,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    FORMAT_VERSION.to_string()
}

impl WorkflowExport {
    pub fn new(workflow: Workflow, exported_at: DateTime<Utc>) -> Self {
        Self {
            workflow,
            exported_at,
            version: default_version(),
        }
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse an export document
    ///
    /// Fails on malformed JSON and on documents without a `workflow` field.
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }
}
