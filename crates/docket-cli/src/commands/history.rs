//! History commands: log, trace.

use super::{parse_workspace_id, Session};
use crate::cli::WorkspaceArg;
use crate::error::Result;
use crate::output::Formatter;
use docket_domain::{visited_states, WorkspaceStore};
use docket_engine::WorkflowEngine;
use tracing::warn;

/// Execute the log command.
///
/// Prints the transition trail and warns when the chain does not link up.
pub fn execute_log<S: WorkspaceStore>(
    args: WorkspaceArg,
    engine: &WorkflowEngine<S>,
    session: &Session,
    formatter: &Formatter,
) -> Result<String> {
    let id = parse_workspace_id(&args.workspace)?;
    let transitions = engine.transitions(&session.tenant, id)?;

    let mut output = formatter.format_transitions(&transitions)?;
    if let Err(e) = visited_states(&transitions) {
        warn!(workspace = %id, error = %e, "Transition chain is broken");
        output.push('\n');
        output.push_str(&formatter.warning(&format!("Transition chain is broken: {}", e)));
    }
    Ok(output)
}

/// Execute the trace command.
pub fn execute_trace<S: WorkspaceStore>(
    args: WorkspaceArg,
    engine: &WorkflowEngine<S>,
    session: &Session,
    formatter: &Formatter,
) -> Result<String> {
    let id = parse_workspace_id(&args.workspace)?;
    let traces = engine.traces(&session.tenant, id)?;
    formatter.format_traces(&traces)
}
