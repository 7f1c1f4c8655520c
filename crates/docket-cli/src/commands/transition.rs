//! Transition commands: check, advance.

use super::{parse_state, parse_workspace_id, Session};
use crate::cli::{AdvanceArgs, TargetArgs};
use crate::error::Result;
use crate::output::Formatter;
use docket_domain::WorkspaceStore;
use docket_engine::{TransitionRequest, WorkflowEngine};

/// Execute the check command (validator dry run).
pub fn execute_check<S: WorkspaceStore>(
    args: TargetArgs,
    engine: &WorkflowEngine<S>,
    session: &Session,
    formatter: &Formatter,
) -> Result<String> {
    let id = parse_workspace_id(&args.workspace)?;
    let target = parse_state(&args.target)?;
    let result = engine.preview_transition(&session.tenant, id, target)?;
    formatter.format_validation(&result)
}

/// Execute the advance command.
pub fn execute_advance<S: WorkspaceStore>(
    args: AdvanceArgs,
    engine: &WorkflowEngine<S>,
    session: &Session,
    formatter: &Formatter,
) -> Result<String> {
    let id = parse_workspace_id(&args.workspace)?;
    let target = parse_state(&args.target)?;
    let request = TransitionRequest {
        reason: args.reason,
        expected_version: args.expect_version,
        notes: args.notes.into_iter().collect(),
    };

    let outcome = engine.transition_with(&session.tenant, id, target, &session.actor, &request)?;
    formatter.format_outcome(&outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::execute_open;
    use crate::commands::test_support::{engine, quiet, session, table};
    use crate::error::CliError;
    use docket_domain::{Fact, FactSource, Origin, WorkflowState};
    use docket_engine::EngineError;

    fn advance(workspace: &str, target: &str, expect_version: Option<u64>) -> AdvanceArgs {
        AdvanceArgs {
            workspace: workspace.to_string(),
            target: target.to_string(),
            reason: None,
            expect_version,
            notes: Vec::new(),
        }
    }

    #[test]
    fn test_check_reports_missing_fact() {
        let engine = engine();
        let session = session();
        let ws = execute_open(&engine, &session, &quiet()).unwrap();

        let output = execute_check(
            TargetArgs {
                workspace: ws,
                target: "facts-extracted".to_string(),
            },
            &engine,
            &session,
            &table(),
        )
        .unwrap();
        assert!(output.contains("cannot reach FACTS_EXTRACTED: no Fact recorded"));
    }

    #[test]
    fn test_advance_after_fact() {
        let engine = engine();
        let session = session();
        let ws = execute_open(&engine, &session, &quiet()).unwrap();
        let id = parse_workspace_id(&ws).unwrap();
        engine
            .add_fact(
                &session.tenant,
                id,
                Fact::new("sender", "client@example.com", FactSource::Metadata, Origin::Ai),
            )
            .unwrap();

        let args = advance(&ws, "facts-extracted", None);
        let output = execute_advance(args, &engine, &session, &quiet()).unwrap();
        assert_eq!(output, "FACTS_EXTRACTED");
        assert_eq!(
            engine.current_state(&session.tenant, id).unwrap(),
            WorkflowState::FactsExtracted
        );
    }

    #[test]
    fn test_advance_notes_reach_trace() {
        let engine = engine();
        let session = session();
        let ws = execute_open(&engine, &session, &quiet()).unwrap();
        let id = parse_workspace_id(&ws).unwrap();
        engine
            .add_fact(
                &session.tenant,
                id,
                Fact::new("sender", "client@example.com", FactSource::Metadata, Origin::Ai),
            )
            .unwrap();

        let mut args = advance(&ws, "facts-extracted", Some(0));
        args.reason = Some("Checked by phone".to_string());
        args.notes = vec![("ticket".to_string(), "INT-42".to_string())];
        execute_advance(args, &engine, &session, &quiet()).unwrap();

        let trace = &engine.traces(&session.tenant, id).unwrap()[0];
        assert_eq!(trace.explanation, "Checked by phone");
        assert_eq!(trace.metadata.notes.get("ticket").map(String::as_str), Some("INT-42"));
    }

    #[test]
    fn test_rejection_carries_reason() {
        let engine = engine();
        let session = session();
        let ws = execute_open(&engine, &session, &quiet()).unwrap();

        let args = advance(&ws, "facts-extracted", None);
        let err = execute_advance(args, &engine, &session, &quiet()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid transition from RECEIVED to FACTS_EXTRACTED: \
             cannot reach FACTS_EXTRACTED: no Fact recorded"
        );
    }

    #[test]
    fn test_stale_expected_version() {
        let engine = engine();
        let session = session();
        let ws = execute_open(&engine, &session, &quiet()).unwrap();
        let id = parse_workspace_id(&ws).unwrap();
        engine
            .add_fact(
                &session.tenant,
                id,
                Fact::new("sender", "client@example.com", FactSource::Metadata, Origin::Ai),
            )
            .unwrap();

        let args = advance(&ws, "facts-extracted", Some(3));
        let result = execute_advance(args, &engine, &session, &quiet());
        assert!(matches!(
            result,
            Err(CliError::Engine(EngineError::VersionConflict {
                expected: 3,
                actual: 0
            }))
        ));
    }

    #[test]
    fn test_unknown_state_name() {
        let engine = engine();
        let session = session();
        let ws = execute_open(&engine, &session, &quiet()).unwrap();

        let result = execute_advance(advance(&ws, "closed", None), &engine, &session, &quiet());
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }
}
