//! In-memory workspace store

use crate::StoreError;
use docket_domain::{
    CommitOutcome, Entity, EntityStore, EvidenceMarker, ReasoningTrace, Transition, Workspace,
    WorkspaceId, WorkspaceStore,
};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

#[derive(Debug)]
struct Record {
    workspace: Workspace,
    evidence: EntityStore,
    transitions: Vec<Transition>,
    traces: Vec<ReasoningTrace>,
}

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<WorkspaceId, Record>,
    order: Vec<WorkspaceId>,
}

impl Inner {
    fn record(&self, id: WorkspaceId) -> Result<&Record, StoreError> {
        self.records.get(&id).ok_or(StoreError::NotFound(id))
    }

    fn record_mut(&mut self, id: WorkspaceId) -> Result<&mut Record, StoreError> {
        self.records.get_mut(&id).ok_or(StoreError::NotFound(id))
    }
}

/// Process-scoped store
///
/// Data lives as long as the value does. Create one per engine (or per
/// test) and inject it; there is no shared global instance.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner.write().map_err(|_| StoreError::Poisoned)
    }
}

/// Shared checks on a commit request, used by both stores
pub(crate) fn check_commit(
    expected_version: u64,
    workspace: &Workspace,
    transition: &Transition,
    trace: &ReasoningTrace,
) -> Result<(), StoreError> {
    if workspace.version != expected_version + 1 {
        return Err(StoreError::InvalidData(format!(
            "workspace version {} does not follow expected version {}",
            workspace.version, expected_version
        )));
    }
    if transition.sequence != workspace.version {
        return Err(StoreError::InvalidData(format!(
            "transition sequence {} does not match workspace version {}",
            transition.sequence, workspace.version
        )));
    }
    if transition.workspace_id != workspace.id || trace.workspace_id != workspace.id {
        return Err(StoreError::InvalidData(
            "transition and trace must belong to the committed workspace".to_string(),
        ));
    }
    if trace.transition != Some(transition.sequence) {
        return Err(StoreError::InvalidData(
            "reasoning trace is not paired with the committed transition".to_string(),
        ));
    }
    Ok(())
}

impl WorkspaceStore for MemoryStore {
    type Error = StoreError;

    fn insert_workspace(&self, workspace: &Workspace) -> Result<(), Self::Error> {
        let mut inner = self.write()?;
        if inner.records.contains_key(&workspace.id) {
            return Err(StoreError::Duplicate(workspace.id));
        }
        inner.records.insert(
            workspace.id,
            Record {
                workspace: workspace.clone(),
                evidence: EntityStore::new(),
                transitions: Vec::new(),
                traces: Vec::new(),
            },
        );
        inner.order.push(workspace.id);
        Ok(())
    }

    fn get_workspace(&self, id: WorkspaceId) -> Result<Option<Workspace>, Self::Error> {
        Ok(self.read()?.records.get(&id).map(|r| r.workspace.clone()))
    }

    fn list_workspaces(&self) -> Result<Vec<WorkspaceId>, Self::Error> {
        Ok(self.read()?.order.clone())
    }

    fn append_entity(&self, id: WorkspaceId, entity: &Entity) -> Result<(), Self::Error> {
        let mut inner = self.write()?;
        let record = inner.record_mut(id)?;
        if record.evidence.contains(entity.id()) {
            return Err(StoreError::InvalidData(format!(
                "entity {} already recorded",
                entity.id()
            )));
        }
        record.evidence.add(entity.clone());
        debug!(workspace = %id, kind = entity.kind().as_str(), "Appended entity");
        Ok(())
    }

    fn append_marker(&self, id: WorkspaceId, marker: EvidenceMarker) -> Result<(), Self::Error> {
        let mut inner = self.write()?;
        inner.record_mut(id)?.evidence.add_marker(marker);
        Ok(())
    }

    fn load_evidence(&self, id: WorkspaceId) -> Result<EntityStore, Self::Error> {
        Ok(self.read()?.record(id)?.evidence.clone())
    }

    fn set_locked(&self, id: WorkspaceId, locked: bool) -> Result<(), Self::Error> {
        let mut inner = self.write()?;
        inner.record_mut(id)?.workspace.locked = locked;
        Ok(())
    }

    fn commit_transition(
        &self,
        expected_version: u64,
        workspace: &Workspace,
        transition: &Transition,
        trace: &ReasoningTrace,
    ) -> Result<CommitOutcome, Self::Error> {
        check_commit(expected_version, workspace, transition, trace)?;

        let mut inner = self.write()?;
        let record = inner.record_mut(workspace.id)?;

        if record.workspace.version != expected_version {
            return Ok(CommitOutcome::Conflict {
                actual_version: record.workspace.version,
            });
        }

        // The lock flag is owned by lock/unlock, not by transitions
        let locked = record.workspace.locked;
        record.workspace = workspace.clone();
        record.workspace.locked = locked;
        record.transitions.push(transition.clone());
        record.traces.push(trace.clone());

        Ok(CommitOutcome::Committed)
    }

    fn append_trace(&self, trace: &ReasoningTrace) -> Result<(), Self::Error> {
        let mut inner = self.write()?;
        inner.record_mut(trace.workspace_id)?.traces.push(trace.clone());
        Ok(())
    }

    fn transitions(&self, id: WorkspaceId) -> Result<Vec<Transition>, Self::Error> {
        Ok(self.read()?.record(id)?.transitions.clone())
    }

    fn traces(&self, id: WorkspaceId) -> Result<Vec<ReasoningTrace>, Self::Error> {
        Ok(self.read()?.record(id)?.traces.clone())
    }
}
