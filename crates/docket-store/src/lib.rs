//! Docket Storage Layer
//!
//! Implements the `WorkspaceStore` trait twice:
//!
//! - [`MemoryStore`]: process-scoped, for tests and embedding
//! - [`SqliteStore`]: durable, one SQL transaction per committed transition
//!
//! Both treat transitions, reasoning traces, entities and markers as
//! append-only, and both make `commit_transition` a compare-and-swap on the
//! workspace version.
//!
//! # Examples
//!
//! ```no_run
//! use docket_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for workspace operations
//! ```

#![warn(missing_docs)]

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use docket_domain::WorkspaceId;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Workspace not found
    #[error("Workspace not found: {0}")]
    NotFound(WorkspaceId),

    /// Workspace already exists
    #[error("Workspace already exists: {0}")]
    Duplicate(WorkspaceId),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A lock guarding the store was poisoned by a panicking writer
    #[error("Store lock poisoned")]
    Poisoned,
}
