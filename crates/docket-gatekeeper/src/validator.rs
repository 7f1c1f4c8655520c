//! Transition validation logic

use crate::{JumpPolicy, ValidationConfig};
use docket_domain::{EntityKind, EntityStore, WorkflowState};
use std::fmt;
use thiserror::Error;

/// Evidence a stage presupposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// At least one entity of the kind
    AtLeastOne(EntityKind),

    /// At least one obligation, or the explicit "no obligations" marker
    ObligationsOrNone,

    /// Missing-element evaluation has run
    MissingEvaluated,

    /// At least one risk, or the explicit "no risk" marker
    RisksOrNone,

    /// At least one CONFIRMED context hypothesis
    ConfirmedContext,

    /// No unresolved missing element remains
    NoOpenMissing {
        /// Number of unresolved missing elements found
        open: usize,
    },
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::AtLeastOne(kind) => write!(f, "no {} recorded", kind.label()),
            Requirement::ObligationsOrNone => {
                f.write_str("no Obligation recorded and no-obligations not declared")
            }
            Requirement::MissingEvaluated => {
                f.write_str("missing elements have not been evaluated")
            }
            Requirement::RisksOrNone => f.write_str("no Risk recorded and no-risk not declared"),
            Requirement::ConfirmedContext => f.write_str("no CONFIRMED ContextHypothesis"),
            Requirement::NoOpenMissing { open } => {
                write!(f, "{} MissingElement(s) still unresolved", open)
            }
        }
    }
}

/// Reasons for rejecting a transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    /// Target is behind the current state
    #[error("cannot move from {from} back to {to}: the workflow only moves forward")]
    Backward {
        /// Current state
        from: WorkflowState,
        /// Requested state
        to: WorkflowState,
    },

    /// Target is the current state
    #[error("workspace is already in {state}")]
    SameState {
        /// Current state
        state: WorkflowState,
    },

    /// Multi-step jump under the single-step policy
    #[error("cannot reach {to} from {from}: only the next state ({next}) is allowed")]
    SkipNotAllowed {
        /// Current state
        from: WorkflowState,
        /// Requested state
        to: WorkflowState,
        /// The only permitted target
        next: WorkflowState,
    },

    /// An evidence gate on the way to the target is not met
    #[error("cannot reach {target}: {requirement}{}", gate_suffix(*.target, *.gate))]
    MissingEvidence {
        /// Requested state
        target: WorkflowState,
        /// State whose gate failed (may precede the target)
        gate: WorkflowState,
        /// What is missing
        requirement: Requirement,
    },
}

fn gate_suffix(target: WorkflowState, gate: WorkflowState) -> String {
    if target == gate {
        String::new()
    } else {
        format!(" (required by {})", gate)
    }
}

/// Result of transition validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Current state
    pub from: WorkflowState,

    /// Requested state
    pub to: WorkflowState,

    /// Rejection reasons (empty when valid)
    pub reasons: Vec<RejectionReason>,
}

impl ValidationResult {
    /// Whether the transition is legal
    pub fn is_valid(&self) -> bool {
        self.reasons.is_empty()
    }

    /// Human-readable reason, or `None` when valid
    ///
    /// Several unmet gates are joined with `"; "`.
    pub fn reason(&self) -> Option<String> {
        if self.reasons.is_empty() {
            return None;
        }
        Some(
            self.reasons
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

/// Validates workflow transitions against the evidence gates
#[derive(Debug, Clone, Default)]
pub struct TransitionValidator {
    config: ValidationConfig,
}

impl TransitionValidator {
    /// Create a new validator with the given configuration
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Create a validator with default configuration
    pub fn default_config() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// The active configuration
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a transition
    ///
    /// # Arguments
    ///
    /// * `from` - The workspace's current state
    /// * `to` - The requested state
    /// * `evidence` - The workspace's Entity Store
    ///
    /// # Returns
    ///
    /// A result listing every reason the transition is refused (empty when legal)
    pub fn validate(
        &self,
        from: WorkflowState,
        to: WorkflowState,
        evidence: &EntityStore,
    ) -> ValidationResult {
        let reject = |reason| ValidationResult {
            from,
            to,
            reasons: vec![reason],
        };

        // 1. Direction
        if to == from {
            return reject(RejectionReason::SameState { state: from });
        }
        if to < from {
            return reject(RejectionReason::Backward { from, to });
        }

        // 2. Jump policy
        if self.config.jump_policy == JumpPolicy::SingleStep {
            if let Some(next) = from.next() {
                if to != next {
                    return reject(RejectionReason::SkipNotAllowed { from, to, next });
                }
            }
        }

        // 3. Cumulative evidence gates up to and including the target
        let reasons = WorkflowState::ALL[1..=to.index()]
            .iter()
            .flat_map(|gate| {
                self.unmet_requirements(*gate, evidence)
                    .into_iter()
                    .map(move |requirement| RejectionReason::MissingEvidence {
                        target: to,
                        gate: *gate,
                        requirement,
                    })
            })
            .collect();

        ValidationResult { from, to, reasons }
    }

    /// Requirements of a single stage that the evidence does not meet
    pub fn unmet_requirements(
        &self,
        state: WorkflowState,
        evidence: &EntityStore,
    ) -> Vec<Requirement> {
        let mut unmet = Vec::new();

        match state {
            WorkflowState::Received => {}
            WorkflowState::FactsExtracted => {
                if evidence.count(EntityKind::Fact) == 0 {
                    unmet.push(Requirement::AtLeastOne(EntityKind::Fact));
                }
            }
            WorkflowState::ContextIdentified => {
                if evidence.count(EntityKind::Context) == 0 {
                    unmet.push(Requirement::AtLeastOne(EntityKind::Context));
                }
            }
            WorkflowState::ObligationsDeduced => {
                if !evidence.obligations_settled() {
                    unmet.push(Requirement::ObligationsOrNone);
                }
            }
            WorkflowState::MissingIdentified => {
                if !evidence.missing_evaluated() {
                    unmet.push(Requirement::MissingEvaluated);
                }
            }
            WorkflowState::RiskEvaluated => {
                if !evidence.risks_settled() {
                    unmet.push(Requirement::RisksOrNone);
                }
            }
            WorkflowState::ActionProposed => {
                if evidence.count(EntityKind::ProposedAction) == 0 {
                    unmet.push(Requirement::AtLeastOne(EntityKind::ProposedAction));
                }
            }
            WorkflowState::ReadyForHuman => {
                // Every prior gate is checked cumulatively; only the optional
                // hand-over conditions belong to this stage.
                if self.config.require_confirmed_context_for_ready
                    && evidence.confirmed_contexts().next().is_none()
                {
                    unmet.push(Requirement::ConfirmedContext);
                }
                if self.config.block_ready_on_unresolved_missing {
                    let open = evidence.unresolved_missing().count();
                    if open > 0 {
                        unmet.push(Requirement::NoOpenMissing { open });
                    }
                }
            }
        }

        unmet
    }
}

/// Validate a transition with the default rules
///
/// Shorthand for `TransitionValidator::default_config().validate(from, to, evidence)`.
pub fn validate_state_transition(
    from: WorkflowState,
    to: WorkflowState,
    evidence: &EntityStore,
) -> ValidationResult {
    TransitionValidator::default_config().validate(from, to, evidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_domain::{
        CertaintyLevel, ContextHypothesis, ContextType, EvidenceMarker, Fact, FactSource,
        MissingElement, Obligation, Origin, ProposedAction, Risk, RiskSeverity,
    };

    fn fact() -> Fact {
        Fact::new("sender", "client@example.com", FactSource::Metadata, Origin::Ai)
    }

    fn context(certainty: CertaintyLevel) -> ContextHypothesis {
        ContextHypothesis::new(
            ContextType::Contractual,
            certainty,
            "Unpaid invoice",
            "Reminder letter attached",
            Origin::Ai,
        )
    }

    /// Store satisfying every gate except the one of `skip`
    fn evidence_without(skip: Option<WorkflowState>) -> EntityStore {
        let mut store = EntityStore::new();
        let keep = |state| skip != Some(state);
        if keep(WorkflowState::FactsExtracted) {
            store.add(fact().into());
        }
        if keep(WorkflowState::ContextIdentified) {
            store.add(context(CertaintyLevel::Probable).into());
        }
        if keep(WorkflowState::ObligationsDeduced) {
            store.add(Obligation::new("Pay invoice", "Contract art. 4", Origin::Ai).into());
        }
        if keep(WorkflowState::MissingIdentified) {
            store.add_marker(EvidenceMarker::MissingElementsEvaluated);
        }
        if keep(WorkflowState::RiskEvaluated) {
            store.add(Risk::new("Late fees", RiskSeverity::Low, Origin::Ai).into());
        }
        if keep(WorkflowState::ActionProposed) {
            store.add(
                ProposedAction::new("Send payment plan", "Client cash flow", Origin::Ai).into(),
            );
        }
        store
    }

    fn full_evidence() -> EntityStore {
        evidence_without(None)
    }

    #[test]
    fn test_valid_first_step() {
        let mut store = EntityStore::new();
        store.add(fact().into());

        let result = validate_state_transition(
            WorkflowState::Received,
            WorkflowState::FactsExtracted,
            &store,
        );
        assert!(result.is_valid());
        assert!(result.reason().is_none());
    }

    #[test]
    fn test_each_gate_fails_independently() {
        let validator = TransitionValidator::default_config();
        let full = full_evidence();

        for state in &WorkflowState::ALL[1..7] {
            let store = evidence_without(Some(*state));
            let previous = state.previous().unwrap();

            let result = validator.validate(previous, *state, &store);
            assert!(!result.is_valid(), "{} should be gated", state);
            assert_eq!(result.reasons.len(), 1);
            match &result.reasons[0] {
                RejectionReason::MissingEvidence { gate, target, .. } => {
                    assert_eq!(gate, state);
                    assert_eq!(target, state);
                }
                other => panic!("Expected MissingEvidence, got {:?}", other),
            }

            assert!(validator.validate(previous, *state, &full).is_valid());
        }
    }

    #[test]
    fn test_reason_is_human_readable() {
        let mut store = EntityStore::new();
        store.add(fact().into());
        store.add(context(CertaintyLevel::Confirmed).into());
        store.add_marker(EvidenceMarker::NoObligations);
        store.add_marker(EvidenceMarker::MissingElementsEvaluated);

        let result = validate_state_transition(
            WorkflowState::MissingIdentified,
            WorkflowState::RiskEvaluated,
            &store,
        );
        assert_eq!(
            result.reason().as_deref(),
            Some("cannot reach RISK_EVALUATED: no Risk recorded and no-risk not declared")
        );
    }

    #[test]
    fn test_skipped_gate_names_its_stage() {
        let mut store = EntityStore::new();
        store.add(fact().into());

        let result = validate_state_transition(
            WorkflowState::FactsExtracted,
            WorkflowState::RiskEvaluated,
            &store,
        );
        assert!(!result.is_valid());
        let reason = result.reason().unwrap();
        assert!(reason.starts_with(
            "cannot reach RISK_EVALUATED: \
             no ContextHypothesis recorded (required by CONTEXT_IDENTIFIED)"
        ));
        // Context, obligations, missing, risk
        assert_eq!(result.reasons.len(), 4);
    }

    #[test]
    fn test_backward_rejected_regardless_of_evidence() {
        let result = validate_state_transition(
            WorkflowState::RiskEvaluated,
            WorkflowState::FactsExtracted,
            &full_evidence(),
        );
        assert_eq!(
            result.reasons,
            vec![RejectionReason::Backward {
                from: WorkflowState::RiskEvaluated,
                to: WorkflowState::FactsExtracted,
            }]
        );
    }

    #[test]
    fn test_same_state_rejected() {
        let result = validate_state_transition(
            WorkflowState::FactsExtracted,
            WorkflowState::FactsExtracted,
            &full_evidence(),
        );
        assert!(matches!(result.reasons[0], RejectionReason::SameState { .. }));
    }

    #[test]
    fn test_jump_ahead_allowed_with_evidence() {
        let result = validate_state_transition(
            WorkflowState::Received,
            WorkflowState::ReadyForHuman,
            &full_evidence(),
        );
        assert!(result.is_valid());
    }

    #[test]
    fn test_single_step_policy() {
        let validator = TransitionValidator::new(ValidationConfig {
            jump_policy: JumpPolicy::SingleStep,
            ..Default::default()
        });

        let result = validator.validate(
            WorkflowState::Received,
            WorkflowState::ContextIdentified,
            &full_evidence(),
        );
        assert_eq!(
            result.reason().as_deref(),
            Some(
                "cannot reach CONTEXT_IDENTIFIED from RECEIVED: \
                 only the next state (FACTS_EXTRACTED) is allowed"
            )
        );

        assert!(validator
            .validate(WorkflowState::Received, WorkflowState::FactsExtracted, &full_evidence())
            .is_valid());
    }

    #[test]
    fn test_strict_ready_conditions() {
        let validator = TransitionValidator::new(ValidationConfig::strict());
        let mut store = full_evidence();
        let missing = MissingElement::new("Bank statement", "Proves payment date", Origin::Ai);
        let missing_id = missing.id;
        store.add(missing.into());

        let result = validator.validate(
            WorkflowState::ActionProposed,
            WorkflowState::ReadyForHuman,
            &store,
        );
        assert!(result.reasons.contains(&RejectionReason::MissingEvidence {
            target: WorkflowState::ReadyForHuman,
            gate: WorkflowState::ReadyForHuman,
            requirement: Requirement::ConfirmedContext,
        }));
        assert!(result.reasons.contains(&RejectionReason::MissingEvidence {
            target: WorkflowState::ReadyForHuman,
            gate: WorkflowState::ReadyForHuman,
            requirement: Requirement::NoOpenMissing { open: 1 },
        }));

        store.add(context(CertaintyLevel::Confirmed).into());
        store.add_marker(EvidenceMarker::MissingElementResolved(missing_id));
        assert!(validator
            .validate(WorkflowState::ActionProposed, WorkflowState::ReadyForHuman, &store)
            .is_valid());
    }
}
