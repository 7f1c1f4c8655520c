//! Entity Store - the per-workspace evidence collections

use crate::entity::{
    ContextHypothesis, Entity, EntityKind, Fact, MissingElement, Obligation, ProposedAction, Risk,
};
use crate::EntityId;
use serde::{Deserialize, Serialize};

/// Explicit outcome recorded when an analytical stage legitimately finds nothing,
/// or when a missing element has been supplied
///
/// Markers are append-only like entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "marker", content = "entity", rename_all = "snake_case")]
pub enum EvidenceMarker {
    /// Obligation analysis ran and found no obligation
    NoObligations,

    /// Missing-element evaluation ran (it may have found nothing)
    MissingElementsEvaluated,

    /// Risk assessment ran and found no risk
    NoRisk,

    /// The given missing element has since been provided
    MissingElementResolved(EntityId),
}

impl EvidenceMarker {
    /// Storage name of the marker
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceMarker::NoObligations => "no_obligations",
            EvidenceMarker::MissingElementsEvaluated => "missing_elements_evaluated",
            EvidenceMarker::NoRisk => "no_risk",
            EvidenceMarker::MissingElementResolved(_) => "missing_element_resolved",
        }
    }
}

/// Typed evidence collections for one workspace
///
/// A pure container: entities and markers are appended and listed, never
/// edited or removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityStore {
    facts: Vec<Fact>,
    contexts: Vec<ContextHypothesis>,
    obligations: Vec<Obligation>,
    missing_elements: Vec<MissingElement>,
    risks: Vec<Risk>,
    proposed_actions: Vec<ProposedAction>,
    markers: Vec<EvidenceMarker>,
}

impl EntityStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entity to its collection
    pub fn add(&mut self, entity: Entity) {
        match entity {
            Entity::Fact(e) => self.facts.push(e),
            Entity::Context(e) => self.contexts.push(e),
            Entity::Obligation(e) => self.obligations.push(e),
            Entity::MissingElement(e) => self.missing_elements.push(e),
            Entity::Risk(e) => self.risks.push(e),
            Entity::ProposedAction(e) => self.proposed_actions.push(e),
        }
    }

    /// Append a marker
    ///
    /// Recording the same marker twice is a no-op.
    pub fn add_marker(&mut self, marker: EvidenceMarker) {
        if !self.markers.contains(&marker) {
            self.markers.push(marker);
        }
    }

    /// Facts, in insertion order
    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    /// Context hypotheses, in insertion order
    pub fn contexts(&self) -> &[ContextHypothesis] {
        &self.contexts
    }

    /// Obligations, in insertion order
    pub fn obligations(&self) -> &[Obligation] {
        &self.obligations
    }

    /// Missing elements, in insertion order
    pub fn missing_elements(&self) -> &[MissingElement] {
        &self.missing_elements
    }

    /// Risks, in insertion order
    pub fn risks(&self) -> &[Risk] {
        &self.risks
    }

    /// Proposed actions, in insertion order
    pub fn proposed_actions(&self) -> &[ProposedAction] {
        &self.proposed_actions
    }

    /// Markers, in insertion order
    pub fn markers(&self) -> &[EvidenceMarker] {
        &self.markers
    }

    /// Whether a marker has been recorded
    pub fn has_marker(&self, marker: EvidenceMarker) -> bool {
        self.markers.contains(&marker)
    }

    /// Number of entities of a kind
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Fact => self.facts.len(),
            EntityKind::Context => self.contexts.len(),
            EntityKind::Obligation => self.obligations.len(),
            EntityKind::MissingElement => self.missing_elements.len(),
            EntityKind::Risk => self.risks.len(),
            EntityKind::ProposedAction => self.proposed_actions.len(),
        }
    }

    /// Total number of entities (markers excluded)
    pub fn len(&self) -> usize {
        EntityKind::ALL.iter().map(|kind| self.count(*kind)).sum()
    }

    /// Whether no entity has been recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any entity with the given id exists
    pub fn contains(&self, id: EntityId) -> bool {
        self.facts.iter().any(|e| e.id == id)
            || self.contexts.iter().any(|e| e.id == id)
            || self.obligations.iter().any(|e| e.id == id)
            || self.missing_elements.iter().any(|e| e.id == id)
            || self.risks.iter().any(|e| e.id == id)
            || self.proposed_actions.iter().any(|e| e.id == id)
    }

    /// Look up a fact by id
    pub fn fact(&self, id: EntityId) -> Option<&Fact> {
        self.facts.iter().find(|f| f.id == id)
    }

    /// The fact that corrects `id`, if any
    pub fn correction_of(&self, id: EntityId) -> Option<&Fact> {
        self.facts.iter().find(|f| f.corrects == Some(id))
    }

    /// Facts that have not been superseded by a correction
    pub fn current_facts(&self) -> impl Iterator<Item = &Fact> {
        self.facts
            .iter()
            .filter(move |f| self.correction_of(f.id).is_none())
    }

    /// Hypotheses at `CONFIRMED` certainty
    pub fn confirmed_contexts(&self) -> impl Iterator<Item = &ContextHypothesis> {
        self.contexts.iter().filter(|c| c.is_confirmed())
    }

    /// Whether the given missing element has been resolved
    pub fn is_resolved(&self, id: EntityId) -> bool {
        self.has_marker(EvidenceMarker::MissingElementResolved(id))
    }

    /// Missing elements that have not been resolved
    pub fn unresolved_missing(&self) -> impl Iterator<Item = &MissingElement> {
        self.missing_elements
            .iter()
            .filter(move |m| !self.is_resolved(m.id))
    }

    /// Whether obligation analysis produced an outcome (obligations or an explicit none)
    pub fn obligations_settled(&self) -> bool {
        !self.obligations.is_empty() || self.has_marker(EvidenceMarker::NoObligations)
    }

    /// Whether missing-element evaluation has run
    pub fn missing_evaluated(&self) -> bool {
        !self.missing_elements.is_empty()
            || self.has_marker(EvidenceMarker::MissingElementsEvaluated)
    }

    /// Whether risk assessment produced an outcome (risks or an explicit none)
    pub fn risks_settled(&self) -> bool {
        !self.risks.is_empty() || self.has_marker(EvidenceMarker::NoRisk)
    }
}
