//! Core workflow engine: the state machine over a workspace store

use crate::{EngineConfig, EngineError, EngineMetrics, KeyedLocks};
use docket_domain::clock::now_ms;
use docket_domain::{
    compute_metrics, Actor, CommitOutcome, ContextHypothesis, Entity, EntityId, EntityKind,
    EntityStore, EvidenceMarker, Fact, MissingElement, Obligation, ProposedAction,
    ReasoningTrace, Risk, TenantId, TraceEntry, TraceMetadata, Transition, WorkflowState,
    Workspace, WorkspaceId, WorkspaceMetrics, WorkspaceStore,
};
use docket_gatekeeper::{TransitionValidator, ValidationResult};
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Step label of a standalone fact-correction note
pub const FACT_CORRECTION_STEP: &str = "FACT CORRECTION";

/// A committed transition
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    /// The workspace after the change
    pub workspace: Workspace,

    /// Scores computed for the change
    pub metrics: WorkspaceMetrics,

    /// The audit record that was appended
    pub transition: Transition,
}

/// Optional inputs of a transition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionRequest {
    /// Why the move is requested; blank reasons fall back to the default explanation
    pub reason: Option<String>,

    /// Only commit if the workspace is still at this version
    pub expected_version: Option<u64>,

    /// Free-form annotations copied into the reasoning trace
    pub notes: BTreeMap<String, String>,
}

impl TransitionRequest {
    /// Request carrying only a reason
    pub fn with_reason(reason: Option<&str>) -> Self {
        Self {
            reason: reason.map(str::to_string),
            ..Self::default()
        }
    }

    fn reason(&self) -> Option<&str> {
        self.reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
    }
}

/// Case reasoning workflow engine
///
/// Owns the store, the validator and the per-workspace locks. Every
/// mutation of a workspace (evidence, markers, transitions, lock flag) runs
/// under that workspace's lock, so the read-validate-mutate-append sequence
/// of a transition is never interleaved with another writer of the same
/// workspace. The engine is `Sync` whenever the store is, and can be shared
/// behind an `Arc`.
///
/// # Examples
///
/// ```
/// use docket_domain::{Actor, Fact, FactSource, Origin, TenantId, WorkflowState};
/// use docket_engine::WorkflowEngine;
/// use docket_store::MemoryStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = WorkflowEngine::with_default_config(MemoryStore::new());
/// let tenant = TenantId::new("acme")?;
///
/// let ws = engine.create_workspace(&tenant)?;
/// engine.add_fact(
///     &tenant,
///     ws.id,
///     Fact::new("sender", "client@example.com", FactSource::Metadata, Origin::Ai),
/// )?;
///
/// let outcome = engine.transition(
///     &tenant,
///     ws.id,
///     WorkflowState::FactsExtracted,
///     &Actor::ai("extractor"),
///     None,
/// )?;
/// assert_eq!(outcome.workspace.current_state, WorkflowState::FactsExtracted);
/// # Ok(())
/// # }
/// ```
pub struct WorkflowEngine<S: WorkspaceStore> {
    store: S,
    config: EngineConfig,
    validator: TransitionValidator,
    locks: KeyedLocks,
    metrics: Mutex<EngineMetrics>,
}

impl<S: WorkspaceStore> WorkflowEngine<S> {
    /// Create a new engine over the given store
    pub fn new(store: S, config: EngineConfig) -> Self {
        let validator = TransitionValidator::new(config.validation.clone());
        Self {
            store,
            config,
            validator,
            locks: KeyedLocks::new(),
            metrics: Mutex::new(EngineMetrics::new()),
        }
    }

    /// Create an engine with default configuration
    pub fn with_default_config(store: S) -> Self {
        Self::new(store, EngineConfig::default())
    }

    /// The active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Snapshot of the operational counters
    pub fn engine_metrics(&self) -> EngineMetrics {
        self.metrics
            .lock()
            .map(|m| m.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn record(&self, f: impl FnOnce(&mut EngineMetrics)) {
        let mut metrics = self
            .metrics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut metrics);
    }

    fn store_err(e: S::Error) -> EngineError {
        EngineError::Store(e.to_string())
    }

    /// Load a workspace and check it belongs to `tenant`
    fn resolve(&self, tenant: &TenantId, id: WorkspaceId) -> Result<Workspace> {
        let workspace = self
            .store
            .get_workspace(id)
            .map_err(Self::store_err)?
            .ok_or(EngineError::WorkspaceNotFound(id))?;

        if !workspace.belongs_to(tenant) {
            warn!(workspace = %id, tenant = %tenant, "Cross-tenant access rejected");
            return Err(EngineError::TenantMismatch { workspace: id });
        }

        Ok(workspace)
    }

    // ----- Workspace lifecycle -----

    /// Create a workspace in `RECEIVED` for a newly arrived matter
    pub fn create_workspace(&self, tenant: &TenantId) -> Result<Workspace> {
        let workspace = Workspace::with_scoring(tenant.clone(), &self.config.scoring);
        self.store
            .insert_workspace(&workspace)
            .map_err(Self::store_err)?;

        self.record(EngineMetrics::record_workspace);
        info!(workspace = %workspace.id, tenant = %tenant, "Workspace created");
        Ok(workspace)
    }

    /// Workspaces of a tenant, oldest first
    pub fn list_workspaces(&self, tenant: &TenantId) -> Result<Vec<Workspace>> {
        let mut workspaces = Vec::new();
        for id in self.store.list_workspaces().map_err(Self::store_err)? {
            if let Some(ws) = self.store.get_workspace(id).map_err(Self::store_err)? {
                if ws.belongs_to(tenant) {
                    workspaces.push(ws);
                }
            }
        }
        Ok(workspaces)
    }

    /// Lock a workspace: every later transition fails with `WorkspaceLocked`
    pub fn lock(&self, tenant: &TenantId, id: WorkspaceId) -> Result<()> {
        self.locks.with(id, || {
            self.resolve(tenant, id)?;
            self.store.set_locked(id, true).map_err(Self::store_err)?;
            info!(workspace = %id, "Workspace locked");
            Ok(())
        })
    }

    /// Clear the lock flag (privileged; never done automatically)
    pub fn unlock(&self, tenant: &TenantId, id: WorkspaceId) -> Result<()> {
        self.locks.with(id, || {
            self.resolve(tenant, id)?;
            self.store.set_locked(id, false).map_err(Self::store_err)?;
            info!(workspace = %id, "Workspace unlocked");
            Ok(())
        })
    }

    // ----- Evidence -----

    /// Append any entity to the workspace's Entity Store
    pub fn add_entity(
        &self,
        tenant: &TenantId,
        id: WorkspaceId,
        entity: Entity,
    ) -> Result<EntityId> {
        self.locks.with(id, || {
            self.resolve(tenant, id)?;
            self.store
                .append_entity(id, &entity)
                .map_err(Self::store_err)?;

            self.record(EngineMetrics::record_entity);
            debug!(
                workspace = %id,
                kind = entity.kind().as_str(),
                entity = %entity.id(),
                "Entity added"
            );
            Ok(entity.id())
        })
    }

    /// Append a fact
    pub fn add_fact(&self, tenant: &TenantId, id: WorkspaceId, fact: Fact) -> Result<EntityId> {
        self.add_entity(tenant, id, fact.into())
    }

    /// Append a context hypothesis
    pub fn add_context(
        &self,
        tenant: &TenantId,
        id: WorkspaceId,
        context: ContextHypothesis,
    ) -> Result<EntityId> {
        self.add_entity(tenant, id, context.into())
    }

    /// Append an obligation
    pub fn add_obligation(
        &self,
        tenant: &TenantId,
        id: WorkspaceId,
        obligation: Obligation,
    ) -> Result<EntityId> {
        self.add_entity(tenant, id, obligation.into())
    }

    /// Append a missing element
    pub fn add_missing_element(
        &self,
        tenant: &TenantId,
        id: WorkspaceId,
        missing: MissingElement,
    ) -> Result<EntityId> {
        self.add_entity(tenant, id, missing.into())
    }

    /// Append a risk
    pub fn add_risk(&self, tenant: &TenantId, id: WorkspaceId, risk: Risk) -> Result<EntityId> {
        self.add_entity(tenant, id, risk.into())
    }

    /// Append a proposed action
    pub fn add_proposed_action(
        &self,
        tenant: &TenantId,
        id: WorkspaceId,
        action: ProposedAction,
    ) -> Result<EntityId> {
        self.add_entity(tenant, id, action.into())
    }

    /// Record an evidence marker
    ///
    /// A `MissingElementResolved` marker must name a missing element of this
    /// workspace.
    pub fn record_marker(
        &self,
        tenant: &TenantId,
        id: WorkspaceId,
        marker: EvidenceMarker,
    ) -> Result<()> {
        self.locks.with(id, || {
            self.resolve(tenant, id)?;

            if let EvidenceMarker::MissingElementResolved(element) = marker {
                let evidence = self.store.load_evidence(id).map_err(Self::store_err)?;
                if !evidence.missing_elements().iter().any(|m| m.id == element) {
                    return Err(EngineError::EntityNotFound(format!(
                        "missing element {}",
                        element
                    )));
                }
            }

            self.store
                .append_marker(id, marker)
                .map_err(Self::store_err)?;
            debug!(workspace = %id, marker = marker.as_str(), "Marker recorded");
            Ok(())
        })
    }

    /// Mark a missing element as provided
    pub fn resolve_missing_element(
        &self,
        tenant: &TenantId,
        id: WorkspaceId,
        element: EntityId,
    ) -> Result<()> {
        self.record_marker(tenant, id, EvidenceMarker::MissingElementResolved(element))
    }

    /// Correct a fact without editing it
    ///
    /// Appends `corrected` as a new fact pointing at `fact_id`, plus a
    /// standalone reasoning trace. The workflow state does not change.
    pub fn correct_fact(
        &self,
        tenant: &TenantId,
        id: WorkspaceId,
        fact_id: EntityId,
        corrected: Fact,
        actor: &Actor,
        note: Option<&str>,
    ) -> Result<EntityId> {
        self.locks.with(id, || {
            self.resolve(tenant, id)?;

            let evidence = self.store.load_evidence(id).map_err(Self::store_err)?;
            let original = evidence
                .fact(fact_id)
                .ok_or_else(|| EngineError::EntityNotFound(format!("fact {}", fact_id)))?;
            if let Some(newer) = evidence.correction_of(fact_id) {
                return Err(EngineError::FactSuperseded {
                    fact: fact_id,
                    replacement: newer.id,
                });
            }

            let replacement = corrected.correcting(fact_id);
            let explanation = match note {
                Some(note) => note.to_string(),
                None => format!(
                    "Fact '{}' corrected from '{}' to '{}'",
                    original.label, original.value, replacement.value
                ),
            };
            let trace = ReasoningTrace::note(
                id,
                FACT_CORRECTION_STEP,
                explanation,
                TraceMetadata::default().with_entry(TraceEntry::FactCorrection {
                    corrected: fact_id,
                    replacement: replacement.id,
                }),
                actor.clone(),
            );

            let replacement_id = replacement.id;
            self.store
                .append_entity(id, &replacement.into())
                .map_err(Self::store_err)?;
            self.store.append_trace(&trace).map_err(Self::store_err)?;

            self.record(|m| {
                m.record_entity();
                m.record_correction();
            });
            info!(
                workspace = %id,
                fact = %fact_id,
                replacement = %replacement_id,
                actor = %actor,
                "Fact corrected"
            );
            Ok(replacement_id)
        })
    }

    // ----- Transitions -----

    /// Move a workspace to `target`
    ///
    /// Checks ownership and the lock flag, scores the evidence, validates
    /// the move and commits the new state together with one `Transition`
    /// and one `ReasoningTrace`. Rejections carry the validator's reason
    /// verbatim plus the scores computed for the attempt.
    pub fn transition(
        &self,
        tenant: &TenantId,
        id: WorkspaceId,
        target: WorkflowState,
        actor: &Actor,
        reason: Option<&str>,
    ) -> Result<TransitionOutcome> {
        self.transition_with(tenant, id, target, actor, &TransitionRequest::with_reason(reason))
    }

    /// Like [`transition`](Self::transition), but only if the workspace is
    /// still at `expected_version`
    ///
    /// Fails with `VersionConflict` when another transition committed since
    /// the caller read the workspace.
    pub fn transition_expecting(
        &self,
        tenant: &TenantId,
        id: WorkspaceId,
        target: WorkflowState,
        actor: &Actor,
        reason: Option<&str>,
        expected_version: u64,
    ) -> Result<TransitionOutcome> {
        let request = TransitionRequest {
            expected_version: Some(expected_version),
            ..TransitionRequest::with_reason(reason)
        };
        self.transition_with(tenant, id, target, actor, &request)
    }

    /// Move a workspace to `target` with the reason, version guard and
    /// notes of `request`
    pub fn transition_with(
        &self,
        tenant: &TenantId,
        id: WorkspaceId,
        target: WorkflowState,
        actor: &Actor,
        request: &TransitionRequest,
    ) -> Result<TransitionOutcome> {
        self.locks
            .with(id, || self.transition_locked(tenant, id, target, actor, request))
    }

    fn transition_locked(
        &self,
        tenant: &TenantId,
        id: WorkspaceId,
        target: WorkflowState,
        actor: &Actor,
        request: &TransitionRequest,
    ) -> Result<TransitionOutcome> {
        // 1. Ownership and guard
        let workspace = self.resolve(tenant, id)?;
        if workspace.locked {
            self.record(EngineMetrics::record_locked);
            warn!(workspace = %id, target = %target, "Transition refused: workspace locked");
            return Err(EngineError::WorkspaceLocked(id));
        }
        if let Some(expected) = request.expected_version {
            if workspace.version != expected {
                self.record(EngineMetrics::record_conflict);
                return Err(EngineError::VersionConflict {
                    expected,
                    actual: workspace.version,
                });
            }
        }

        // 2. Score the evidence as it stands
        let evidence = self.store.load_evidence(id).map_err(Self::store_err)?;
        let metrics = compute_metrics(&evidence, &self.config.scoring);

        // 3. Validate
        let from = workspace.current_state;
        let validation = self.validator.validate(from, target, &evidence);
        if !validation.is_valid() {
            let reason = validation.reason().unwrap_or_default();
            self.record(|m| m.record_rejection(target));
            warn!(
                workspace = %id,
                from = %from,
                to = %target,
                reason = %reason,
                "Transition rejected"
            );
            return Err(EngineError::InvalidTransition {
                from,
                to: target,
                reason,
                metrics,
            });
        }

        // 4. Build the new row and its records
        let now = now_ms();
        let reason = request.reason();
        let mut updated = workspace.clone();
        updated.current_state = target;
        updated.set_metrics(metrics);
        updated.state_changed_at = now;
        updated.state_changed_by = Some(actor.clone());
        updated.version = workspace.version + 1;

        let transition = Transition {
            sequence: updated.version,
            workspace_id: id,
            from_state: from,
            to_state: target,
            triggered_by: actor.clone(),
            triggered_at: now,
            reason: reason.map(str::to_string),
            state_before: workspace.snapshot(),
            state_after: updated.snapshot(),
        };

        let explanation = reason.unwrap_or(&self.config.default_explanation);
        let mut metadata = trace_metadata(from, target, metrics, &evidence);
        for (key, value) in &request.notes {
            metadata = metadata.with_note(key.clone(), value.clone());
        }
        let trace = ReasoningTrace::for_transition(&transition, explanation, metadata);

        // 5. Commit atomically
        match self
            .store
            .commit_transition(workspace.version, &updated, &transition, &trace)
            .map_err(Self::store_err)?
        {
            CommitOutcome::Committed => {}
            CommitOutcome::Conflict { actual_version } => {
                self.record(EngineMetrics::record_conflict);
                warn!(
                    workspace = %id,
                    expected = workspace.version,
                    actual = actual_version,
                    "Commit lost a version race"
                );
                return Err(EngineError::VersionConflict {
                    expected: workspace.version,
                    actual: actual_version,
                });
            }
        }

        self.record(|m| m.record_commit(target));
        info!(
            workspace = %id,
            from = %from,
            to = %target,
            actor = %actor,
            uncertainty = metrics.uncertainty_level,
            quality = metrics.reasoning_quality,
            "Transition committed"
        );

        Ok(TransitionOutcome {
            workspace: updated,
            metrics,
            transition,
        })
    }

    // ----- Read-only accessors -----

    /// Workspace by id
    pub fn workspace(&self, tenant: &TenantId, id: WorkspaceId) -> Result<Workspace> {
        self.resolve(tenant, id)
    }

    /// Current workflow state
    pub fn current_state(&self, tenant: &TenantId, id: WorkspaceId) -> Result<WorkflowState> {
        Ok(self.resolve(tenant, id)?.current_state)
    }

    /// The workspace's Entity Store
    pub fn evidence(&self, tenant: &TenantId, id: WorkspaceId) -> Result<EntityStore> {
        self.resolve(tenant, id)?;
        self.store.load_evidence(id).map_err(Self::store_err)
    }

    /// Transition trail, oldest first
    pub fn transitions(&self, tenant: &TenantId, id: WorkspaceId) -> Result<Vec<Transition>> {
        self.resolve(tenant, id)?;
        self.store.transitions(id).map_err(Self::store_err)
    }

    /// Reasoning traces, oldest first
    pub fn traces(&self, tenant: &TenantId, id: WorkspaceId) -> Result<Vec<ReasoningTrace>> {
        self.resolve(tenant, id)?;
        self.store.traces(id).map_err(Self::store_err)
    }

    /// Scores the evidence would get now, without committing anything
    pub fn preview_metrics(&self, tenant: &TenantId, id: WorkspaceId) -> Result<WorkspaceMetrics> {
        let evidence = self.evidence(tenant, id)?;
        Ok(compute_metrics(&evidence, &self.config.scoring))
    }

    /// Validator dry run for moving to `target`
    ///
    /// Ignores the lock flag; a locked workspace still reports what its
    /// evidence would allow.
    pub fn preview_transition(
        &self,
        tenant: &TenantId,
        id: WorkspaceId,
        target: WorkflowState,
    ) -> Result<ValidationResult> {
        let workspace = self.resolve(tenant, id)?;
        let evidence = self.store.load_evidence(id).map_err(Self::store_err)?;
        Ok(self
            .validator
            .validate(workspace.current_state, target, &evidence))
    }
}

/// Typed metadata written with every transition trace
fn trace_metadata(
    from: WorkflowState,
    to: WorkflowState,
    metrics: WorkspaceMetrics,
    evidence: &EntityStore,
) -> TraceMetadata {
    let mut metadata = TraceMetadata::default()
        .with_entry(TraceEntry::Metrics {
            uncertainty_level: metrics.uncertainty_level,
            reasoning_quality: metrics.reasoning_quality,
        })
        .with_entry(TraceEntry::EvidenceCounts {
            facts: evidence.current_facts().count(),
            contexts: evidence.count(EntityKind::Context),
            obligations: evidence.count(EntityKind::Obligation),
            open_missing: evidence.unresolved_missing().count(),
            risks: evidence.count(EntityKind::Risk),
            proposed_actions: evidence.count(EntityKind::ProposedAction),
        });

    let skipped = from.skipped_to(to);
    if !skipped.is_empty() {
        metadata = metadata.with_entry(TraceEntry::SkippedStates { states: skipped });
    }
    metadata
}
