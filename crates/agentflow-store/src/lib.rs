//! Agentflow Store - host-agnostic state engine for the Agentflow editor
//!
//! `WorkflowStore` owns the active workflow and turns editor intents into
//! atomic state transitions: graph edits with undo/redo, validation,
//! save/load through a `WorkflowRepository`, import/export and a local
//! session that survives restarts.
//!
//! # Example
//!
//! ```ignore
//! use agentflow_store::WorkflowStore;
//! use agentflow_graph::{make_node, NodeDataPatch, NodeType};
//!
//! let mut store = WorkflowStore::in_memory();
//! store.create_workflow("Research pipeline", None);
//! store.add_node(make_node("start", NodeType::Trigger, (0.0, 0.0), NodeDataPatch::default()));
//! store.add_node(make_node("research", NodeType::Agent, (0.0, 150.0), NodeDataPatch::default()));
//! store.connect_nodes("start", "research", Some("bottom"), Some("top"));
//!
//! assert!(store.validate_workflow().is_valid);
//! let version = store.save_workflow().await?;
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod execution_log;
pub mod export;
pub mod repository;
pub mod session;
pub mod store;

pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use execution_log::{ExecutionLogEntry, LogLevel};
pub use export::WorkflowExport;
pub use repository::{FileRepository, InMemoryRepository, WorkflowRepository};
pub use session::SessionSnapshot;
pub use store::{SharedWorkflowStore, WorkflowDetails, WorkflowStore};
