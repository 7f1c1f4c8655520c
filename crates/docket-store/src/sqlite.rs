//! SQLite-backed workspace store

use crate::memory::check_commit;
use crate::StoreError;
use docket_domain::{
    Actor, CommitOutcome, Entity, EntityStore, EvidenceMarker, ReasoningTrace, StateSnapshot,
    TenantId, TraceMetadata, Transition, WorkflowState, Workspace, WorkspaceId, WorkspaceStore,
};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// SQLite-based implementation of `WorkspaceStore`
///
/// One connection guarded by a mutex, so a single store can be shared by
/// threads. Every committed transition is written in one SQL transaction
/// together with its reasoning trace and the updated workspace row.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

/// Raw `workspaces` row before decoding
struct WorkspaceRow {
    id: Vec<u8>,
    tenant_id: String,
    current_state: String,
    locked: bool,
    uncertainty_level: f64,
    reasoning_quality: f64,
    state_changed_at: i64,
    state_changed_by: Option<String>,
    created_at: i64,
    version: i64,
}

/// Raw `transitions` row before decoding
struct TransitionRow {
    workspace_id: Vec<u8>,
    sequence: i64,
    from_state: String,
    to_state: String,
    triggered_by: String,
    triggered_at: i64,
    reason: Option<String>,
    state_before: String,
    state_after: String,
}

/// Raw `reasoning_traces` row before decoding
struct TraceRow {
    workspace_id: Vec<u8>,
    transition_sequence: Option<i64>,
    step: String,
    explanation: String,
    metadata: String,
    created_by: String,
    created_at: i64,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use docket_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("docket.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        conn.execute_batch(include_str!("schema.sql"))?;
        info!(path = %path.as_ref().display(), "Opened workspace store");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn id_to_bytes(id: WorkspaceId) -> Vec<u8> {
        id.value().to_be_bytes().to_vec()
    }

    fn bytes_to_id(bytes: &[u8]) -> Result<WorkspaceId, StoreError> {
        let arr: [u8; 16] = bytes.try_into().map_err(|_| {
            StoreError::InvalidData(format!(
                "Expected 16 bytes for WorkspaceId, got {}",
                bytes.len()
            ))
        })?;
        Ok(WorkspaceId::from_value(u128::from_be_bytes(arr)))
    }

    fn parse_state(s: &str) -> Result<WorkflowState, StoreError> {
        WorkflowState::parse(s)
            .ok_or_else(|| StoreError::InvalidData(format!("Unknown workflow state: {}", s)))
    }

    fn exists(conn: &Connection, id: WorkspaceId) -> Result<bool, StoreError> {
        let found = conn
            .query_row(
                "SELECT 1 FROM workspaces WHERE id = ?1",
                params![Self::id_to_bytes(id)],
                |_| Ok(true),
            )
            .optional()?;
        Ok(found.unwrap_or(false))
    }

    fn ensure_exists(conn: &Connection, id: WorkspaceId) -> Result<(), StoreError> {
        if Self::exists(conn, id)? {
            Ok(())
        } else {
            Err(StoreError::NotFound(id))
        }
    }

    fn decode_workspace(row: WorkspaceRow) -> Result<Workspace, StoreError> {
        Ok(Workspace {
            id: Self::bytes_to_id(&row.id)?,
            tenant_id: TenantId::new(row.tenant_id).map_err(StoreError::InvalidData)?,
            current_state: Self::parse_state(&row.current_state)?,
            locked: row.locked,
            uncertainty_level: row.uncertainty_level,
            reasoning_quality: row.reasoning_quality,
            state_changed_at: row.state_changed_at as u64,
            state_changed_by: row
                .state_changed_by
                .map(|json| serde_json::from_str::<Actor>(&json))
                .transpose()?,
            created_at: row.created_at as u64,
            version: row.version as u64,
        })
    }

    fn decode_transition(row: TransitionRow) -> Result<Transition, StoreError> {
        Ok(Transition {
            sequence: row.sequence as u64,
            workspace_id: Self::bytes_to_id(&row.workspace_id)?,
            from_state: Self::parse_state(&row.from_state)?,
            to_state: Self::parse_state(&row.to_state)?,
            triggered_by: serde_json::from_str(&row.triggered_by)?,
            triggered_at: row.triggered_at as u64,
            reason: row.reason,
            state_before: serde_json::from_str::<StateSnapshot>(&row.state_before)?,
            state_after: serde_json::from_str::<StateSnapshot>(&row.state_after)?,
        })
    }

    fn decode_trace(row: TraceRow) -> Result<ReasoningTrace, StoreError> {
        Ok(ReasoningTrace {
            workspace_id: Self::bytes_to_id(&row.workspace_id)?,
            transition: row.transition_sequence.map(|s| s as u64),
            step: row.step,
            explanation: row.explanation,
            metadata: serde_json::from_str::<TraceMetadata>(&row.metadata)?,
            created_by: serde_json::from_str(&row.created_by)?,
            created_at: row.created_at as u64,
        })
    }

    fn insert_trace(conn: &Connection, trace: &ReasoningTrace) -> Result<(), StoreError> {
        conn.execute(
            "INSERT INTO reasoning_traces
             (workspace_id, transition_sequence, step, explanation, metadata,
              created_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                Self::id_to_bytes(trace.workspace_id),
                trace.transition.map(|s| s as i64),
                &trace.step,
                &trace.explanation,
                serde_json::to_string(&trace.metadata)?,
                serde_json::to_string(&trace.created_by)?,
                trace.created_at as i64,
            ],
        )?;
        Ok(())
    }
}

impl WorkspaceStore for SqliteStore {
    type Error = StoreError;

    fn insert_workspace(&self, workspace: &Workspace) -> Result<(), Self::Error> {
        let conn = self.conn()?;
        if Self::exists(&conn, workspace.id)? {
            return Err(StoreError::Duplicate(workspace.id));
        }

        let changed_by = workspace
            .state_changed_by
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        conn.execute(
            "INSERT INTO workspaces (id, tenant_id, current_state, locked, uncertainty_level,
             reasoning_quality, state_changed_at, state_changed_by, created_at, version)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                Self::id_to_bytes(workspace.id),
                workspace.tenant_id.as_str(),
                workspace.current_state.as_str(),
                workspace.locked,
                workspace.uncertainty_level,
                workspace.reasoning_quality,
                workspace.state_changed_at as i64,
                changed_by,
                workspace.created_at as i64,
                workspace.version as i64,
            ],
        )?;

        Ok(())
    }

    fn get_workspace(&self, id: WorkspaceId) -> Result<Option<Workspace>, Self::Error> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT id, tenant_id, current_state, locked, uncertainty_level, reasoning_quality,
                 state_changed_at, state_changed_by, created_at, version
                 FROM workspaces WHERE id = ?1",
                params![Self::id_to_bytes(id)],
                |row| {
                    Ok(WorkspaceRow {
                        id: row.get(0)?,
                        tenant_id: row.get(1)?,
                        current_state: row.get(2)?,
                        locked: row.get(3)?,
                        uncertainty_level: row.get(4)?,
                        reasoning_quality: row.get(5)?,
                        state_changed_at: row.get(6)?,
                        state_changed_by: row.get(7)?,
                        created_at: row.get(8)?,
                        version: row.get(9)?,
                    })
                },
            )
            .optional()?;

        row.map(Self::decode_workspace).transpose()
    }

    fn list_workspaces(&self) -> Result<Vec<WorkspaceId>, Self::Error> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id FROM workspaces ORDER BY rowid")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, Vec<u8>>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        ids.iter().map(|bytes| Self::bytes_to_id(bytes)).collect()
    }

    fn append_entity(&self, id: WorkspaceId, entity: &Entity) -> Result<(), Self::Error> {
        let conn = self.conn()?;
        Self::ensure_exists(&conn, id)?;

        conn.execute(
            "INSERT INTO entities (id, workspace_id, kind, origin, payload, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entity.id().value().to_be_bytes().to_vec(),
                Self::id_to_bytes(id),
                entity.kind().as_str(),
                entity.origin().as_str(),
                serde_json::to_string(entity)?,
                entity.created_at() as i64,
            ],
        )?;

        debug!(workspace = %id, kind = entity.kind().as_str(), "Appended entity");
        Ok(())
    }

    fn append_marker(&self, id: WorkspaceId, marker: EvidenceMarker) -> Result<(), Self::Error> {
        let conn = self.conn()?;
        Self::ensure_exists(&conn, id)?;

        conn.execute(
            "INSERT OR IGNORE INTO markers (workspace_id, marker, payload) VALUES (?1, ?2, ?3)",
            params![
                Self::id_to_bytes(id),
                marker.as_str(),
                serde_json::to_string(&marker)?,
            ],
        )?;

        Ok(())
    }

    fn load_evidence(&self, id: WorkspaceId) -> Result<EntityStore, Self::Error> {
        let conn = self.conn()?;
        Self::ensure_exists(&conn, id)?;
        let id_bytes = Self::id_to_bytes(id);

        let mut evidence = EntityStore::new();

        let mut stmt =
            conn.prepare("SELECT payload FROM entities WHERE workspace_id = ?1 ORDER BY seq")?;
        let payloads = stmt
            .query_map(params![&id_bytes], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        for payload in payloads {
            evidence.add(serde_json::from_str::<Entity>(&payload)?);
        }

        let mut stmt =
            conn.prepare("SELECT payload FROM markers WHERE workspace_id = ?1 ORDER BY seq")?;
        let payloads = stmt
            .query_map(params![&id_bytes], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        for payload in payloads {
            evidence.add_marker(serde_json::from_str::<EvidenceMarker>(&payload)?);
        }

        Ok(evidence)
    }

    fn set_locked(&self, id: WorkspaceId, locked: bool) -> Result<(), Self::Error> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE workspaces SET locked = ?1 WHERE id = ?2",
            params![locked, Self::id_to_bytes(id)],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(id));
        }
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

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let id_bytes = Self::id_to_bytes(workspace.id);

        let changed_by = workspace
            .state_changed_by
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let updated = tx.execute(
            "UPDATE workspaces SET current_state = ?1, uncertainty_level = ?2,
             reasoning_quality = ?3, state_changed_at = ?4, state_changed_by = ?5, version = ?6
             WHERE id = ?7 AND version = ?8",
            params![
                workspace.current_state.as_str(),
                workspace.uncertainty_level,
                workspace.reasoning_quality,
                workspace.state_changed_at as i64,
                changed_by,
                workspace.version as i64,
                &id_bytes,
                expected_version as i64,
            ],
        )?;

        if updated == 0 {
            let actual: Option<i64> = tx
                .query_row(
                    "SELECT version FROM workspaces WHERE id = ?1",
                    params![&id_bytes],
                    |row| row.get(0),
                )
                .optional()?;
            // Dropping the transaction rolls it back
            return match actual {
                Some(version) => Ok(CommitOutcome::Conflict {
                    actual_version: version as u64,
                }),
                None => Err(StoreError::NotFound(workspace.id)),
            };
        }

        tx.execute(
            "INSERT INTO transitions (workspace_id, sequence, from_state, to_state, triggered_by,
             triggered_at, reason, state_before, state_after)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                &id_bytes,
                transition.sequence as i64,
                transition.from_state.as_str(),
                transition.to_state.as_str(),
                serde_json::to_string(&transition.triggered_by)?,
                transition.triggered_at as i64,
                &transition.reason,
                serde_json::to_string(&transition.state_before)?,
                serde_json::to_string(&transition.state_after)?,
            ],
        )?;
        Self::insert_trace(&tx, trace)?;

        tx.commit()?;
        Ok(CommitOutcome::Committed)
    }

    fn append_trace(&self, trace: &ReasoningTrace) -> Result<(), Self::Error> {
        let conn = self.conn()?;
        Self::ensure_exists(&conn, trace.workspace_id)?;
        Self::insert_trace(&conn, trace)
    }

    fn transitions(&self, id: WorkspaceId) -> Result<Vec<Transition>, Self::Error> {
        let conn = self.conn()?;
        Self::ensure_exists(&conn, id)?;

        let mut stmt = conn.prepare(
            "SELECT workspace_id, sequence, from_state, to_state, triggered_by, triggered_at,
             reason, state_before, state_after
             FROM transitions WHERE workspace_id = ?1 ORDER BY sequence",
        )?;
        let rows = stmt
            .query_map(params![Self::id_to_bytes(id)], |row| {
                Ok(TransitionRow {
                    workspace_id: row.get(0)?,
                    sequence: row.get(1)?,
                    from_state: row.get(2)?,
                    to_state: row.get(3)?,
                    triggered_by: row.get(4)?,
                    triggered_at: row.get(5)?,
                    reason: row.get(6)?,
                    state_before: row.get(7)?,
                    state_after: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(Self::decode_transition).collect()
    }

    fn traces(&self, id: WorkspaceId) -> Result<Vec<ReasoningTrace>, Self::Error> {
        let conn = self.conn()?;
        Self::ensure_exists(&conn, id)?;

        let mut stmt = conn.prepare(
            "SELECT workspace_id, transition_sequence, step, explanation, metadata, created_by,
             created_at
             FROM reasoning_traces WHERE workspace_id = ?1 ORDER BY seq",
        )?;
        let rows = stmt
            .query_map(params![Self::id_to_bytes(id)], |row| {
                Ok(TraceRow {
                    workspace_id: row.get(0)?,
                    transition_sequence: row.get(1)?,
                    step: row.get(2)?,
                    explanation: row.get(3)?,
                    metadata: row.get(4)?,
                    created_by: row.get(5)?,
                    created_at: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(Self::decode_trace).collect()
    }
}
