//! Audit trail and reasoning trace records
//!
//! Both are immutable once created. A `Transition` is the compliance record
//! of one state change; a `ReasoningTrace` is the human-readable note that
//! accompanies it (or, for a fact correction, stands alone).

use crate::clock::now_ms;
use crate::{Actor, EntityId, WorkflowState, WorkspaceId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// State and scores captured at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Workflow state
    pub state: WorkflowState,
    /// Uncertainty level (0-100)
    pub uncertainty_level: f64,
    /// Reasoning quality (0-100)
    pub reasoning_quality: f64,
}

/// Immutable record of one state change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Position in the workspace's trail (1-based; equals the workspace version after commit)
    pub sequence: u64,

    /// Workspace the transition belongs to
    pub workspace_id: WorkspaceId,

    /// State before the change
    pub from_state: WorkflowState,

    /// State after the change
    pub to_state: WorkflowState,

    /// Who requested it
    pub triggered_by: Actor,

    /// When it was committed
    pub triggered_at: u64,

    /// Optional human-readable reason
    pub reason: Option<String>,

    /// Snapshot immediately before the change
    pub state_before: StateSnapshot,

    /// Snapshot immediately after the change
    pub state_after: StateSnapshot,
}

/// Typed metadata entry attached to a reasoning trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceEntry {
    /// Scores computed for the transition
    Metrics {
        /// Uncertainty level (0-100)
        uncertainty_level: f64,
        /// Reasoning quality (0-100)
        reasoning_quality: f64,
    },

    /// Evidence counts when the transition was committed
    EvidenceCounts {
        /// Number of facts
        facts: usize,
        /// Number of context hypotheses
        contexts: usize,
        /// Number of obligations
        obligations: usize,
        /// Number of unresolved missing elements
        open_missing: usize,
        /// Number of risks
        risks: usize,
        /// Number of proposed actions
        proposed_actions: usize,
    },

    /// States jumped over by a multi-step transition
    SkippedStates {
        /// The intermediate states, in pipeline order
        states: Vec<WorkflowState>,
    },

    /// A fact was corrected by appending a replacement
    FactCorrection {
        /// The fact being corrected
        corrected: EntityId,
        /// The new fact
        replacement: EntityId,
    },
}

/// Metadata of a reasoning trace
///
/// Typed entries for everything the engine writes; `notes` is the one open
/// bag, reserved for free-form human annotations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceMetadata {
    /// Typed entries
    #[serde(default)]
    pub entries: Vec<TraceEntry>,

    /// Free-form notes
    #[serde(default)]
    pub notes: BTreeMap<String, String>,
}

impl TraceMetadata {
    /// Add a typed entry
    pub fn with_entry(mut self, entry: TraceEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Add a free-form note
    pub fn with_note(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.notes.insert(key.into(), value.into());
        self
    }
}

/// Immutable explanatory note for human review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningTrace {
    /// Workspace the trace belongs to
    pub workspace_id: WorkspaceId,

    /// Sequence of the paired transition (`None` for a standalone note)
    pub transition: Option<u64>,

    /// Human label of the step (e.g., "RECEIVED → FACTS_EXTRACTED")
    pub step: String,

    /// Explanation of why the step was taken
    pub explanation: String,

    /// Structured and free-form metadata
    pub metadata: TraceMetadata,

    /// Who wrote it
    pub created_by: Actor,

    /// When it was written
    pub created_at: u64,
}

impl ReasoningTrace {
    /// Default step label for a transition
    pub fn step_label(from: WorkflowState, to: WorkflowState) -> String {
        format!("{} → {}", from, to)
    }

    /// Trace paired with a transition
    pub fn for_transition(
        transition: &Transition,
        explanation: impl Into<String>,
        metadata: TraceMetadata,
    ) -> Self {
        Self {
            workspace_id: transition.workspace_id,
            transition: Some(transition.sequence),
            step: Self::step_label(transition.from_state, transition.to_state),
            explanation: explanation.into(),
            metadata,
            created_by: transition.triggered_by.clone(),
            created_at: transition.triggered_at,
        }
    }

    /// Standalone note (not tied to a state change)
    pub fn note(
        workspace_id: WorkspaceId,
        step: impl Into<String>,
        explanation: impl Into<String>,
        metadata: TraceMetadata,
        created_by: Actor,
    ) -> Self {
        Self {
            workspace_id,
            transition: None,
            step: step.into(),
            explanation: explanation.into(),
            metadata,
            created_by,
            created_at: now_ms(),
        }
    }
}

/// A break in a transition chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// `from_state` of an entry does not match the previous `to_state`
    Gap {
        /// Sequence of the offending transition
        sequence: u64,
        /// State the chain was in
        expected: WorkflowState,
        /// State the transition claims to start from
        found: WorkflowState,
    },

    /// Sequences are not 1, 2, 3, ...
    OutOfOrder {
        /// Expected sequence number
        expected: u64,
        /// Sequence number found
        found: u64,
    },
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::Gap {
                sequence,
                expected,
                found,
            } => write!(
                f,
                "transition {} starts from {} but the trail was at {}",
                sequence, found, expected
            ),
            ChainError::OutOfOrder { expected, found } => {
                write!(f, "expected transition {} but found {}", expected, found)
            }
        }
    }
}

impl std::error::Error for ChainError {}

/// Reconstruct the visited-state history from a transition trail
///
/// Checks that sequences run 1..n and that every `from_state` equals the
/// previous `to_state`, starting from `RECEIVED`.
pub fn visited_states(transitions: &[Transition]) -> Result<Vec<WorkflowState>, ChainError> {
    let mut visited = vec![WorkflowState::Received];

    for (index, transition) in transitions.iter().enumerate() {
        let expected_sequence = index as u64 + 1;
        if transition.sequence != expected_sequence {
            return Err(ChainError::OutOfOrder {
                expected: expected_sequence,
                found: transition.sequence,
            });
        }

        let current = *visited.last().unwrap_or(&WorkflowState::Received);
        if transition.from_state != current {
            return Err(ChainError::Gap {
                sequence: transition.sequence,
                expected: current,
                found: transition.from_state,
            });
        }
        visited.push(transition.to_state);
    }

    Ok(visited)
}
