//! End-to-end command tests against an on-disk store.

use docket_cli::cli::{
    AddArgs, AddEntity, AdvanceArgs, CertaintyArg, ContextTypeArg, FactSourceArg, MarkArgs,
    MarkerArg, OriginArg, SeverityArg, ShowArgs, TargetArgs, WorkspaceArg,
};
use docket_cli::commands::{self, Session};
use docket_cli::{CliError, Formatter, OutputFormat};
use docket_domain::{Actor, TenantId, WorkflowState};
use docket_engine::{EngineConfig, EngineError, WorkflowEngine};
use docket_store::SqliteStore;
use tempfile::TempDir;

fn session() -> Session {
    Session::new(TenantId::new("acme").unwrap(), Actor::human("alice"))
}

fn quiet() -> Formatter {
    Formatter::new(OutputFormat::Quiet, false)
}

fn add(workspace: &str, entity: AddEntity) -> AddArgs {
    AddArgs {
        workspace: workspace.to_string(),
        origin: OriginArg::Ai,
        entity,
    }
}

fn advance(workspace: &str, target: &str) -> AdvanceArgs {
    AdvanceArgs {
        workspace: workspace.to_string(),
        target: target.to_string(),
        reason: None,
        expect_version: None,
        notes: Vec::new(),
    }
}

fn open_engine(dir: &TempDir) -> WorkflowEngine<SqliteStore> {
    let store = SqliteStore::new(dir.path().join("docket.db")).unwrap();
    WorkflowEngine::new(store, EngineConfig::default())
}

#[test]
fn test_matter_walks_to_ready_across_restarts() {
    let dir = TempDir::new().unwrap();
    let session = session();
    let f = quiet();

    let ws = {
        let engine = open_engine(&dir);
        let ws = commands::execute_open(&engine, &session, &f).unwrap();
        commands::execute_add(
            add(
                &ws,
                AddEntity::Fact {
                    label: "sender".to_string(),
                    value: "client@example.com".to_string(),
                    source: FactSourceArg::Metadata,
                    source_ref: None,
                },
            ),
            &engine,
            &session,
            &f,
        )
        .unwrap();
        commands::execute_add(
            add(
                &ws,
                AddEntity::Context {
                    description: "Unpaid invoice".to_string(),
                    context_type: ContextTypeArg::Contractual,
                    certainty: CertaintyArg::Probable,
                    reasoning: "Second reminder".to_string(),
                },
            ),
            &engine,
            &session,
            &f,
        )
        .unwrap();
        let state =
            commands::execute_advance(advance(&ws, "context-identified"), &engine, &session, &f)
                .unwrap();
        assert_eq!(state, "CONTEXT_IDENTIFIED");
        ws
    };

    // Reopen: state and evidence survive
    let engine = open_engine(&dir);
    let state = commands::execute_show(
        ShowArgs {
            workspace: Some(ws.clone()),
        },
        &engine,
        &session,
        &f,
    )
    .unwrap();
    assert_eq!(state, "CONTEXT_IDENTIFIED");

    for marker in [MarkerArg::NoObligations, MarkerArg::MissingEvaluated] {
        commands::execute_mark(
            MarkArgs {
                workspace: ws.clone(),
                marker,
            },
            &engine,
            &session,
            &f,
        )
        .unwrap();
    }
    commands::execute_add(
        add(
            &ws,
            AddEntity::Risk {
                description: "Payment deadline passed".to_string(),
                severity: SeverityArg::High,
                mitigation: None,
            },
        ),
        &engine,
        &session,
        &f,
    )
    .unwrap();
    commands::execute_add(
        add(
            &ws,
            AddEntity::Action {
                description: "Send formal notice".to_string(),
                rationale: "Deadline passed".to_string(),
                priority: Some(1),
            },
        ),
        &engine,
        &session,
        &f,
    )
    .unwrap();

    let check = commands::execute_check(
        TargetArgs {
            workspace: ws.clone(),
            target: "ready-for-human".to_string(),
        },
        &engine,
        &session,
        &f,
    )
    .unwrap();
    assert_eq!(check, "ok");

    let state = commands::execute_advance(advance(&ws, "READY_FOR_HUMAN"), &engine, &session, &f)
        .unwrap();
    assert_eq!(state, "READY_FOR_HUMAN");

    let log = commands::execute_log(WorkspaceArg { workspace: ws.clone() }, &engine, &session, &f)
        .unwrap();
    assert_eq!(log, "CONTEXT_IDENTIFIED\nREADY_FOR_HUMAN");

    let id = commands::parse_workspace_id(&ws).unwrap();
    let transitions = engine.transitions(&session.tenant, id).unwrap();
    assert_eq!(
        docket_domain::visited_states(&transitions).unwrap().last(),
        Some(&WorkflowState::ReadyForHuman)
    );
}

#[test]
fn test_locked_workspace_refuses_advance() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(&dir);
    let session = session();
    let f = quiet();

    let ws = commands::execute_open(&engine, &session, &f).unwrap();
    commands::execute_lock(WorkspaceArg { workspace: ws.clone() }, &engine, &session, &f).unwrap();

    let err = commands::execute_advance(advance(&ws, "facts-extracted"), &engine, &session, &f)
        .unwrap_err();
    assert!(matches!(
        err,
        CliError::Engine(EngineError::WorkspaceLocked(_))
    ));
    assert!(err.to_string().contains("is locked"));
}

#[test]
fn test_backward_move_is_rejected_verbatim() {
    let dir = TempDir::new().unwrap();
    let engine = open_engine(&dir);
    let session = session();
    let f = quiet();

    let ws = commands::execute_open(&engine, &session, &f).unwrap();
    commands::execute_add(
        add(
            &ws,
            AddEntity::Fact {
                label: "sender".to_string(),
                value: "client@example.com".to_string(),
                source: FactSourceArg::ExplicitMessage,
                source_ref: None,
            },
        ),
        &engine,
        &session,
        &f,
    )
    .unwrap();
    commands::execute_advance(advance(&ws, "facts-extracted"), &engine, &session, &f).unwrap();

    let err = commands::execute_advance(advance(&ws, "received"), &engine, &session, &f)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid transition from FACTS_EXTRACTED to RECEIVED: \
         cannot move from FACTS_EXTRACTED back to RECEIVED: the workflow only moves forward"
    );
}
