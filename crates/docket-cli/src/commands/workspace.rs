//! Workspace lifecycle commands: open, show, lock, unlock.

use super::{parse_workspace_id, Session};
use crate::cli::{ShowArgs, WorkspaceArg};
use crate::error::Result;
use crate::output::Formatter;
use docket_domain::WorkspaceStore;
use docket_engine::WorkflowEngine;

/// Execute the open command.
pub fn execute_open<S: WorkspaceStore>(
    engine: &WorkflowEngine<S>,
    session: &Session,
    formatter: &Formatter,
) -> Result<String> {
    let workspace = engine.create_workspace(&session.tenant)?;
    Ok(formatter.created("Workspace", &workspace.id.to_string()))
}

/// Execute the show command.
pub fn execute_show<S: WorkspaceStore>(
    args: ShowArgs,
    engine: &WorkflowEngine<S>,
    session: &Session,
    formatter: &Formatter,
) -> Result<String> {
    match args.workspace {
        None => {
            let workspaces = engine.list_workspaces(&session.tenant)?;
            formatter.format_workspaces(&workspaces)
        }
        Some(id) => {
            let id = parse_workspace_id(&id)?;
            let workspace = engine.workspace(&session.tenant, id)?;
            let evidence = engine.evidence(&session.tenant, id)?;
            let metrics = engine.preview_metrics(&session.tenant, id)?;
            formatter.format_workspace_detail(&workspace, &evidence, &metrics)
        }
    }
}

/// Execute the lock command.
pub fn execute_lock<S: WorkspaceStore>(
    args: WorkspaceArg,
    engine: &WorkflowEngine<S>,
    session: &Session,
    formatter: &Formatter,
) -> Result<String> {
    let id = parse_workspace_id(&args.workspace)?;
    engine.lock(&session.tenant, id)?;
    Ok(formatter.success(&format!("Workspace {} locked", id)))
}

/// Execute the unlock command.
pub fn execute_unlock<S: WorkspaceStore>(
    args: WorkspaceArg,
    engine: &WorkflowEngine<S>,
    session: &Session,
    formatter: &Formatter,
) -> Result<String> {
    let id = parse_workspace_id(&args.workspace)?;
    engine.unlock(&session.tenant, id)?;
    Ok(formatter.success(&format!("Workspace {} unlocked", id)))
}
