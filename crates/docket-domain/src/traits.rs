//! Trait definitions for external interactions
//!
//! These traits define the boundary between the workflow logic and the
//! storage technology. Implementations live in `docket-store`.

use crate::{
    Entity, EntityStore, EvidenceMarker, ReasoningTrace, Transition, Workspace, WorkspaceId,
};

/// Outcome of an optimistic transition commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Workspace row, transition and trace were written together
    Committed,

    /// Nothing was written: the stored version no longer matched
    Conflict {
        /// Version currently stored
        actual_version: u64,
    },
}

/// Trait for storing workspaces, their evidence and their logs
///
/// Methods take `&self`: implementations provide their own interior
/// synchronization so one store can be shared by concurrent callers.
/// Transitions and traces are append-only; the trait exposes no update or
/// delete for them.
pub trait WorkspaceStore {
    /// Error type for store operations
    type Error: std::fmt::Display;

    /// Persist a freshly created workspace
    fn insert_workspace(&self, workspace: &Workspace) -> Result<(), Self::Error>;

    /// Get a workspace by id
    fn get_workspace(&self, id: WorkspaceId) -> Result<Option<Workspace>, Self::Error>;

    /// List workspace ids, oldest first
    fn list_workspaces(&self) -> Result<Vec<WorkspaceId>, Self::Error>;

    /// Append an evidence entity
    fn append_entity(&self, id: WorkspaceId, entity: &Entity) -> Result<(), Self::Error>;

    /// Append an evidence marker
    fn append_marker(&self, id: WorkspaceId, marker: EvidenceMarker) -> Result<(), Self::Error>;

    /// Load the workspace's Entity Store
    fn load_evidence(&self, id: WorkspaceId) -> Result<EntityStore, Self::Error>;

    /// Set or clear the lock flag
    fn set_locked(&self, id: WorkspaceId, locked: bool) -> Result<(), Self::Error>;

    /// Atomically write the updated workspace row, one transition and one trace
    ///
    /// The write happens only if the stored version equals `expected_version`;
    /// otherwise nothing is written and [`CommitOutcome::Conflict`] is returned.
    fn commit_transition(
        &self,
        expected_version: u64,
        workspace: &Workspace,
        transition: &Transition,
        trace: &ReasoningTrace,
    ) -> Result<CommitOutcome, Self::Error>;

    /// Append a standalone reasoning trace (not tied to a transition)
    fn append_trace(&self, trace: &ReasoningTrace) -> Result<(), Self::Error>;

    /// Transition trail, in commit order
    fn transitions(&self, id: WorkspaceId) -> Result<Vec<Transition>, Self::Error>;

    /// Reasoning traces, in write order
    fn traces(&self, id: WorkspaceId) -> Result<Vec<ReasoningTrace>, Self::Error>;
}
