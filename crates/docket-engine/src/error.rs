//! Error types for workflow engine operations

use docket_domain::{EntityId, WorkflowState, WorkspaceId, WorkspaceMetrics};
use thiserror::Error;

/// Errors that can occur during workflow engine operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The workspace is locked and accepts no further transition
    #[error("Workspace {0} is locked")]
    WorkspaceLocked(WorkspaceId),

    /// The validator refused the transition
    ///
    /// `reason` is the validator's message, verbatim. `metrics` are the scores
    /// computed over the evidence at the time of the attempt.
    #[error("Invalid transition from {from} to {to}: {reason}")]
    InvalidTransition {
        /// Current state
        from: WorkflowState,
        /// Requested state
        to: WorkflowState,
        /// Why the transition was refused
        reason: String,
        /// Scores at the time of the attempt
        metrics: WorkspaceMetrics,
    },

    /// No workspace with this id exists
    #[error("Workspace not found: {0}")]
    WorkspaceNotFound(WorkspaceId),

    /// The workspace belongs to another tenant
    #[error("Workspace {workspace} belongs to another tenant")]
    TenantMismatch {
        /// The workspace that was addressed
        workspace: WorkspaceId,
    },

    /// The workspace moved on since the caller read it
    #[error("Workspace version conflict: expected {expected}, found {actual}")]
    VersionConflict {
        /// Version the caller based its decision on
        expected: u64,
        /// Version currently stored
        actual: u64,
    },

    /// An entity referenced by the request does not exist in the workspace
    #[error("Entity not found in workspace: {0}")]
    EntityNotFound(String),

    /// The fact was already corrected; only its latest replacement can be
    #[error("Fact {fact} was already corrected by {replacement}")]
    FactSuperseded {
        /// The fact the caller addressed
        fact: EntityId,
        /// The fact that replaced it
        replacement: EntityId,
    },

    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_surfaces_reason_verbatim() {
        let err = EngineError::InvalidTransition {
            from: WorkflowState::FactsExtracted,
            to: WorkflowState::RiskEvaluated,
            reason: "cannot reach RISK_EVALUATED: no Risk recorded".to_string(),
            metrics: WorkspaceMetrics {
                uncertainty_level: 60.0,
                reasoning_quality: 0.0,
            },
        };
        assert_eq!(
            err.to_string(),
            "Invalid transition from FACTS_EXTRACTED to RISK_EVALUATED: \
             cannot reach RISK_EVALUATED: no Risk recorded"
        );
    }
}
