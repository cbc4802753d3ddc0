//! Store-wide constants
//!
//! Single source of truth for defaults and format tags.

/// Default values for store configuration
pub mod defaults {
    /// Owner stamped on workflows created without a signed-in user
    pub const USER_ID: &str = "local-user";
    /// Snapshots kept in the undo history
    pub const HISTORY_LIMIT: usize = agentflow_graph::undo::DEFAULT_MAX_SNAPSHOTS;
    /// Execution log entries kept in memory
    pub const MAX_EXECUTION_LOGS: usize = 500;
}

/// Export document format
pub mod export {
    /// Version tag written into every export
    pub const FORMAT_VERSION: &str = "1.0";
}

/// Naming of derived workflows
pub mod naming {
    /// Appended to the name of a duplicated workflow
    pub const COPY_SUFFIX: &str = " (Copy)";
}
