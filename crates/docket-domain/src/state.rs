//! Workflow states - the analytical stages a matter moves through

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage in the case reasoning workflow
///
/// States form a strict linear order (index 0 to 7). A workspace starts in
/// `Received` and the automated pipeline ends in `ReadyForHuman`; only a
/// human decision closes the matter after that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowState {
    /// Matter received, nothing extracted yet
    Received,

    /// At least one fact has been extracted
    FactsExtracted,

    /// At least one context hypothesis frames the matter
    ContextIdentified,

    /// Obligations deduced (or explicitly none)
    ObligationsDeduced,

    /// Missing elements evaluated (possibly none)
    MissingIdentified,

    /// Risks assessed (or explicitly none)
    RiskEvaluated,

    /// At least one action has been proposed
    ActionProposed,

    /// Handed over for a human decision
    ReadyForHuman,
}

impl WorkflowState {
    /// All states in pipeline order
    pub const ALL: [WorkflowState; 8] = [
        WorkflowState::Received,
        WorkflowState::FactsExtracted,
        WorkflowState::ContextIdentified,
        WorkflowState::ObligationsDeduced,
        WorkflowState::MissingIdentified,
        WorkflowState::RiskEvaluated,
        WorkflowState::ActionProposed,
        WorkflowState::ReadyForHuman,
    ];

    /// Position of the state in the pipeline (0 to 7)
    pub fn index(&self) -> usize {
        match self {
            WorkflowState::Received => 0,
            WorkflowState::FactsExtracted => 1,
            WorkflowState::ContextIdentified => 2,
            WorkflowState::ObligationsDeduced => 3,
            WorkflowState::MissingIdentified => 4,
            WorkflowState::RiskEvaluated => 5,
            WorkflowState::ActionProposed => 6,
            WorkflowState::ReadyForHuman => 7,
        }
    }

    /// State at the given pipeline position
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Get the state name in its canonical upper-case form
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::Received => "RECEIVED",
            WorkflowState::FactsExtracted => "FACTS_EXTRACTED",
            WorkflowState::ContextIdentified => "CONTEXT_IDENTIFIED",
            WorkflowState::ObligationsDeduced => "OBLIGATIONS_DEDUCED",
            WorkflowState::MissingIdentified => "MISSING_IDENTIFIED",
            WorkflowState::RiskEvaluated => "RISK_EVALUATED",
            WorkflowState::ActionProposed => "ACTION_PROPOSED",
            WorkflowState::ReadyForHuman => "READY_FOR_HUMAN",
        }
    }

    /// Parse a state name
    ///
    /// Case-insensitive; accepts `-` in place of `_` (`facts-extracted`).
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_uppercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|state| state.as_str() == normalized)
    }

    /// Next state in the pipeline
    pub fn next(&self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    /// Previous state in the pipeline
    pub fn previous(&self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// Whether this is the terminal state of the automated pipeline
    pub fn is_terminal(&self) -> bool {
        *self == WorkflowState::ReadyForHuman
    }

    /// States strictly between `self` and `target`, in pipeline order
    ///
    /// Empty when `target` is not ahead of `self`.
    pub fn skipped_to(&self, target: WorkflowState) -> Vec<WorkflowState> {
        if target.index() <= self.index() + 1 {
            return Vec::new();
        }
        Self::ALL[self.index() + 1..target.index()].to_vec()
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WorkflowState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid workflow state: {}", s))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: index and from_index are inverse over the pipeline
        #[test]
        fn test_index_roundtrip(index in 0usize..8) {
            let state = WorkflowState::from_index(index).unwrap();
            prop_assert_eq!(state.index(), index);
            prop_assert_eq!(WorkflowState::parse(state.as_str()), Some(state));
        }

        /// Property: derived ordering matches pipeline order
        #[test]
        fn test_ordering_matches_index(a in 0usize..8, b in 0usize..8) {
            let sa = WorkflowState::from_index(a).unwrap();
            let sb = WorkflowState::from_index(b).unwrap();
            prop_assert_eq!(sa < sb, a < b);
        }
    }
}
