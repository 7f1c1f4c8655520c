//! Command implementations.
//!
//! Every command returns the text to print, so tests can drive them against
//! an in-memory engine.

pub mod evidence;
pub mod history;
pub mod transition;
pub mod workspace;

pub use self::evidence::{execute_add, execute_correct, execute_mark, execute_resolve};
pub use self::history::{execute_log, execute_trace};
pub use self::transition::{execute_advance, execute_check};
pub use self::workspace::{execute_lock, execute_open, execute_show, execute_unlock};

use crate::error::{CliError, Result};
use docket_domain::{Actor, EntityId, TenantId, WorkflowState, WorkspaceId};

/// Who is running the command, and on whose behalf.
#[derive(Debug, Clone)]
pub struct Session {
    /// Tenant the workspaces belong to
    pub tenant: TenantId,
    /// Actor recorded with changes
    pub actor: Actor,
}

impl Session {
    /// Create a session.
    pub fn new(tenant: TenantId, actor: Actor) -> Self {
        Self { tenant, actor }
    }
}

/// Parse a workspace id argument.
pub fn parse_workspace_id(input: &str) -> Result<WorkspaceId> {
    input
        .parse()
        .map_err(|e| CliError::InvalidInput(format!("Invalid workspace id '{}': {}", input, e)))
}

/// Parse an entity id argument.
pub fn parse_entity_id(input: &str) -> Result<EntityId> {
    input
        .parse()
        .map_err(|e| CliError::InvalidInput(format!("Invalid entity id '{}': {}", input, e)))
}

/// Parse a state name (`facts-extracted` or `FACTS_EXTRACTED`).
pub fn parse_state(input: &str) -> Result<WorkflowState> {
    input.parse().map_err(CliError::InvalidInput)
}
