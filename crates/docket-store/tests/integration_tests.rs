//! Integration tests for docket-store
//!
//! The same contract checks run against both store implementations; the
//! SQLite store additionally has to survive a reopen.

use docket_domain::{
    Actor, CertaintyLevel, CommitOutcome, ContextHypothesis, ContextType, Entity, EvidenceMarker,
    Fact, FactSource, MissingElement, Origin, ReasoningTrace, TenantId, TraceEntry,
    TraceMetadata, Transition, WorkflowState, Workspace, WorkspaceStore,
};
use docket_store::{MemoryStore, SqliteStore, StoreError};
use tempfile::TempDir;

fn tenant() -> TenantId {
    TenantId::new("acme").unwrap()
}

/// Build the workspace row, transition and trace of one forward step
fn step(ws: &Workspace, to: WorkflowState) -> (Workspace, Transition, ReasoningTrace) {
    let mut next = ws.clone();
    next.current_state = to;
    next.version += 1;
    next.uncertainty_level = 40.0;
    next.reasoning_quality = 25.0;
    next.state_changed_by = Some(Actor::human("alice"));

    let transition = Transition {
        sequence: next.version,
        workspace_id: ws.id,
        from_state: ws.current_state,
        to_state: to,
        triggered_by: Actor::human("alice"),
        triggered_at: 1_700_000_000_000 + next.version,
        reason: Some("evidence complete".to_string()),
        state_before: ws.snapshot(),
        state_after: next.snapshot(),
    };
    let trace = ReasoningTrace::for_transition(
        &transition,
        "evidence complete",
        TraceMetadata::default().with_entry(TraceEntry::Metrics {
            uncertainty_level: 40.0,
            reasoning_quality: 25.0,
        }),
    );
    (next, transition, trace)
}

fn check_workspace_lifecycle<S: WorkspaceStore<Error = StoreError>>(store: &S) {
    let ws = Workspace::new(tenant());
    store.insert_workspace(&ws).unwrap();

    let loaded = store.get_workspace(ws.id).unwrap().unwrap();
    assert_eq!(loaded, ws);
    assert!(store.list_workspaces().unwrap().contains(&ws.id));

    store.set_locked(ws.id, true).unwrap();
    assert!(store.get_workspace(ws.id).unwrap().unwrap().locked);
    store.set_locked(ws.id, false).unwrap();
    assert!(!store.get_workspace(ws.id).unwrap().unwrap().locked);
}

fn check_evidence_round_trip<S: WorkspaceStore<Error = StoreError>>(store: &S) {
    let ws = Workspace::new(tenant());
    store.insert_workspace(&ws).unwrap();

    let fact = Fact::new("invoice date", "2026-09-01", FactSource::Document, Origin::Ai)
        .with_source_ref("attachment-1, p.1");
    let context = ContextHypothesis::new(
        ContextType::Contractual,
        CertaintyLevel::Probable,
        "Late payment",
        "Second reminder",
        Origin::Ai,
    );
    let missing = MissingElement::new("Signed contract", "Terms unknown", Origin::Human);
    let missing_id = missing.id;

    store.append_entity(ws.id, &Entity::from(fact.clone())).unwrap();
    store.append_entity(ws.id, &Entity::from(context.clone())).unwrap();
    store.append_entity(ws.id, &Entity::from(missing)).unwrap();
    store.append_marker(ws.id, EvidenceMarker::NoRisk).unwrap();
    store.append_marker(ws.id, EvidenceMarker::NoRisk).unwrap();
    store
        .append_marker(ws.id, EvidenceMarker::MissingElementResolved(missing_id))
        .unwrap();

    let evidence = store.load_evidence(ws.id).unwrap();
    assert_eq!(evidence.facts(), &[fact]);
    assert_eq!(evidence.contexts(), &[context]);
    assert_eq!(evidence.missing_elements().len(), 1);
    assert_eq!(
        evidence.markers(),
        &[
            EvidenceMarker::NoRisk,
            EvidenceMarker::MissingElementResolved(missing_id)
        ]
    );
    assert_eq!(evidence.unresolved_missing().count(), 0);
}

fn check_commit_and_conflict<S: WorkspaceStore<Error = StoreError>>(store: &S) {
    let ws = Workspace::new(tenant());
    store.insert_workspace(&ws).unwrap();

    let (first, transition, trace) = step(&ws, WorkflowState::FactsExtracted);
    assert_eq!(
        store.commit_transition(0, &first, &transition, &trace).unwrap(),
        CommitOutcome::Committed
    );

    // Stale writer
    let (stale, transition, trace) = step(&ws, WorkflowState::ContextIdentified);
    assert_eq!(
        store.commit_transition(0, &stale, &transition, &trace).unwrap(),
        CommitOutcome::Conflict { actual_version: 1 }
    );

    let (second, transition, trace) = step(&first, WorkflowState::ContextIdentified);
    assert_eq!(
        store.commit_transition(1, &second, &transition, &trace).unwrap(),
        CommitOutcome::Committed
    );

    let stored = store.get_workspace(ws.id).unwrap().unwrap();
    assert_eq!(stored.current_state, WorkflowState::ContextIdentified);
    assert_eq!(stored.version, 2);
    assert_eq!(stored.state_changed_by, Some(Actor::human("alice")));

    let transitions = store.transitions(ws.id).unwrap();
    assert_eq!(transitions.len(), 2);
    assert_eq!(transitions[0].to_state, transitions[1].from_state);
    assert_eq!(transitions[1].state_after.state, stored.current_state);

    let traces = store.traces(ws.id).unwrap();
    assert_eq!(traces.len(), 2);
    assert_eq!(traces[1].transition, Some(2));
    assert_eq!(traces[0].step, "RECEIVED → FACTS_EXTRACTED");
}

fn check_standalone_trace<S: WorkspaceStore<Error = StoreError>>(store: &S) {
    let ws = Workspace::new(tenant());
    store.insert_workspace(&ws).unwrap();

    let note = ReasoningTrace::note(
        ws.id,
        "note",
        "Client called, amount confirmed",
        TraceMetadata::default().with_note("channel", "phone"),
        Actor::human("bob"),
    );
    store.append_trace(&note).unwrap();

    let traces = store.traces(ws.id).unwrap();
    assert_eq!(traces, vec![note]);
    assert!(store.transitions(ws.id).unwrap().is_empty());
}

fn check_unknown_workspace<S: WorkspaceStore<Error = StoreError>>(store: &S) {
    let ghost = Workspace::new(tenant());
    assert!(store.get_workspace(ghost.id).unwrap().is_none());
    assert!(matches!(
        store.set_locked(ghost.id, true),
        Err(StoreError::NotFound(_))
    ));
    let (next, transition, trace) = step(&ghost, WorkflowState::FactsExtracted);
    assert!(matches!(
        store.commit_transition(0, &next, &transition, &trace),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn test_memory_store_contract() {
    let store = MemoryStore::new();
    check_workspace_lifecycle(&store);
    check_evidence_round_trip(&store);
    check_commit_and_conflict(&store);
    check_standalone_trace(&store);
    check_unknown_workspace(&store);
}

#[test]
fn test_sqlite_store_contract() {
    let store = SqliteStore::new(":memory:").unwrap();
    check_workspace_lifecycle(&store);
    check_evidence_round_trip(&store);
    check_commit_and_conflict(&store);
    check_standalone_trace(&store);
    check_unknown_workspace(&store);
}

#[test]
fn test_sqlite_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("docket.db");

    let ws = Workspace::new(tenant());
    {
        let store = SqliteStore::new(&path).unwrap();
        store.insert_workspace(&ws).unwrap();
        store
            .append_entity(
                ws.id,
                &Fact::new("sender", "client@example.com", FactSource::Metadata, Origin::Ai).into(),
            )
            .unwrap();
        let (next, transition, trace) = step(&ws, WorkflowState::FactsExtracted);
        store.commit_transition(0, &next, &transition, &trace).unwrap();
    }

    let store = SqliteStore::new(&path).unwrap();
    let reopened = store.get_workspace(ws.id).unwrap().unwrap();
    assert_eq!(reopened.current_state, WorkflowState::FactsExtracted);
    assert_eq!(reopened.version, 1);
    assert_eq!(store.load_evidence(ws.id).unwrap().facts().len(), 1);
    assert_eq!(store.transitions(ws.id).unwrap().len(), 1);
    assert_eq!(store.traces(ws.id).unwrap().len(), 1);
}

#[test]
fn test_sqlite_shared_between_threads() {
    use std::sync::Arc;
    use std::thread;

    let store = Arc::new(SqliteStore::new(":memory:").unwrap());
    let ws = Workspace::new(tenant());
    store.insert_workspace(&ws).unwrap();

    let handles: Vec<_> = [WorkflowState::FactsExtracted, WorkflowState::ContextIdentified]
        .into_iter()
        .map(|target| {
            let store = Arc::clone(&store);
            let ws = ws.clone();
            thread::spawn(move || {
                let (next, transition, trace) = step(&ws, target);
                store.commit_transition(0, &next, &transition, &trace).unwrap()
            })
        })
        .collect();

    let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let committed = outcomes
        .iter()
        .filter(|o| **o == CommitOutcome::Committed)
        .count();
    assert_eq!(committed, 1);
    assert_eq!(store.transitions(ws.id).unwrap().len(), 1);
}
