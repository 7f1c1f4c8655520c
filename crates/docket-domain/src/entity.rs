//! Evidence entities attached to a workspace
//!
//! Every entity is a leaf record: it is created once, appended to its
//! workspace, and never edited. Each carries its provenance (`AI` or `HUMAN`)
//! so the origin of any piece of evidence is always recoverable.

use crate::clock::now_ms;
use crate::EntityId;
use serde::{Deserialize, Serialize};

/// Who produced an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Origin {
    /// Proposed by the AI producer
    Ai,
    /// Entered or confirmed by a human
    Human,
}

impl Origin {
    /// Get the origin name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Ai => "AI",
            Origin::Human => "HUMAN",
        }
    }
}

/// Where a fact was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FactSource {
    /// Stated explicitly in the incoming message
    ExplicitMessage,
    /// Message or document metadata (sender, dates, headers)
    Metadata,
    /// An attached or referenced document
    Document,
    /// Provided directly by a user
    UserProvided,
}

impl FactSource {
    /// Get the source name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            FactSource::ExplicitMessage => "EXPLICIT_MESSAGE",
            FactSource::Metadata => "METADATA",
            FactSource::Document => "DOCUMENT",
            FactSource::UserProvided => "USER_PROVIDED",
        }
    }
}

/// An assertion taken as ground truth
///
/// A fact is never an inference, so its confidence is always maximal.
/// Facts are append-only: a correction is a new fact whose `corrects` field
/// names the fact it replaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// Unique identifier
    pub id: EntityId,

    /// Short label (e.g., "sender", "invoice date")
    pub label: String,

    /// The asserted value
    pub value: String,

    /// Where the fact was taken from
    pub source: FactSource,

    /// Who extracted it
    pub extracted_by: Origin,

    /// Optional pointer into the source material (message id, page, ...)
    pub source_ref: Option<String>,

    /// Fact this one corrects, if any
    pub corrects: Option<EntityId>,

    /// When this fact was recorded
    pub created_at: u64,
}

impl Fact {
    /// Confidence of every fact
    pub const CONFIDENCE: f64 = 1.0;

    /// Create a new fact
    pub fn new(
        label: impl Into<String>,
        value: impl Into<String>,
        source: FactSource,
        extracted_by: Origin,
    ) -> Self {
        Self {
            id: EntityId::new(),
            label: label.into(),
            value: value.into(),
            source,
            extracted_by,
            source_ref: None,
            corrects: None,
            created_at: now_ms(),
        }
    }

    /// Attach a source reference
    pub fn with_source_ref(mut self, source_ref: impl Into<String>) -> Self {
        self.source_ref = Some(source_ref.into());
        self
    }

    /// Mark this fact as the correction of an earlier one
    pub fn correcting(mut self, fact: EntityId) -> Self {
        self.corrects = Some(fact);
        self
    }

    /// Confidence of the fact (always 100%)
    pub fn confidence(&self) -> f64 {
        Self::CONFIDENCE
    }
}

/// Framing a context hypothesis proposes for the matter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContextType {
    /// Litigation, statutory or regulatory framing
    Legal,
    /// Dealings with an administration
    Administrative,
    /// Contract performance or breach
    Contractual,
    /// Deadlines and limitation periods
    Temporal,
    /// Internal organization of the client
    Organizational,
}

impl ContextType {
    /// Get the context type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextType::Legal => "LEGAL",
            ContextType::Administrative => "ADMINISTRATIVE",
            ContextType::Contractual => "CONTRACTUAL",
            ContextType::Temporal => "TEMPORAL",
            ContextType::Organizational => "ORGANIZATIONAL",
        }
    }
}

/// Ordered certainty scale: `Possible < Probable < Confirmed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertaintyLevel {
    /// Plausible framing, weakly supported
    Possible,
    /// Likely framing
    Probable,
    /// Framing confirmed by evidence or a human
    Confirmed,
}

impl CertaintyLevel {
    /// Get the certainty name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            CertaintyLevel::Possible => "POSSIBLE",
            CertaintyLevel::Probable => "PROBABLE",
            CertaintyLevel::Confirmed => "CONFIRMED",
        }
    }

    /// Contribution of this level to the context uncertainty (1.0 to 0.0)
    pub fn uncertainty_weight(&self) -> f64 {
        match self {
            CertaintyLevel::Possible => 1.0,
            CertaintyLevel::Probable => 0.5,
            CertaintyLevel::Confirmed => 0.0,
        }
    }
}

/// A candidate framing for the matter
///
/// Several hypotheses may coexist; the model never forces a single framing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextHypothesis {
    /// Unique identifier
    pub id: EntityId,

    /// Kind of framing
    pub context_type: ContextType,

    /// How certain the framing is
    pub certainty: CertaintyLevel,

    /// What the framing is
    pub description: String,

    /// Why it was proposed
    pub reasoning: String,

    /// Who proposed it
    pub identified_by: Origin,

    /// When it was recorded
    pub created_at: u64,
}

impl ContextHypothesis {
    /// Create a new context hypothesis
    pub fn new(
        context_type: ContextType,
        certainty: CertaintyLevel,
        description: impl Into<String>,
        reasoning: impl Into<String>,
        identified_by: Origin,
    ) -> Self {
        Self {
            id: EntityId::new(),
            context_type,
            certainty,
            description: description.into(),
            reasoning: reasoning.into(),
            identified_by,
            created_at: now_ms(),
        }
    }

    /// Whether the hypothesis is confirmed
    pub fn is_confirmed(&self) -> bool {
        self.certainty == CertaintyLevel::Confirmed
    }
}

/// An obligation deduced for the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obligation {
    /// Unique identifier
    pub id: EntityId,

    /// What has to be done
    pub description: String,

    /// Legal or contractual basis
    pub basis: String,

    /// Deadline, as stated in the source material
    pub deadline: Option<String>,

    /// Who deduced it
    pub identified_by: Origin,

    /// When it was recorded
    pub created_at: u64,
}

impl Obligation {
    /// Create a new obligation
    pub fn new(
        description: impl Into<String>,
        basis: impl Into<String>,
        identified_by: Origin,
    ) -> Self {
        Self {
            id: EntityId::new(),
            description: description.into(),
            basis: basis.into(),
            deadline: None,
            identified_by,
            created_at: now_ms(),
        }
    }

    /// Attach a deadline
    pub fn with_deadline(mut self, deadline: impl Into<String>) -> Self {
        self.deadline = Some(deadline.into());
        self
    }
}

/// Something the matter needs that has not been provided
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingElement {
    /// Unique identifier
    pub id: EntityId,

    /// What is missing
    pub description: String,

    /// Why its absence blocks progress
    pub blocking_reason: String,

    /// Who identified it
    pub identified_by: Origin,

    /// When it was recorded
    pub created_at: u64,
}

impl MissingElement {
    /// Create a new missing element
    pub fn new(
        description: impl Into<String>,
        blocking_reason: impl Into<String>,
        identified_by: Origin,
    ) -> Self {
        Self {
            id: EntityId::new(),
            description: description.into(),
            blocking_reason: blocking_reason.into(),
            identified_by,
            created_at: now_ms(),
        }
    }
}

/// Severity of an assessed risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskSeverity {
    /// Minor exposure
    Low,
    /// Notable exposure
    Medium,
    /// Serious exposure
    High,
    /// Immediate action required
    Critical,
}

impl RiskSeverity {
    /// Get the severity name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskSeverity::Low => "LOW",
            RiskSeverity::Medium => "MEDIUM",
            RiskSeverity::High => "HIGH",
            RiskSeverity::Critical => "CRITICAL",
        }
    }
}

/// An assessed risk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    /// Unique identifier
    pub id: EntityId,

    /// What the risk is
    pub description: String,

    /// How severe it is
    pub severity: RiskSeverity,

    /// Suggested mitigation, if any
    pub mitigation: Option<String>,

    /// Who assessed it
    pub identified_by: Origin,

    /// When it was recorded
    pub created_at: u64,
}

impl Risk {
    /// Create a new risk
    pub fn new(
        description: impl Into<String>,
        severity: RiskSeverity,
        identified_by: Origin,
    ) -> Self {
        Self {
            id: EntityId::new(),
            description: description.into(),
            severity,
            mitigation: None,
            identified_by,
            created_at: now_ms(),
        }
    }

    /// Attach a mitigation
    pub fn with_mitigation(mut self, mitigation: impl Into<String>) -> Self {
        self.mitigation = Some(mitigation.into());
        self
    }
}

/// An action proposed to the human reviewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedAction {
    /// Unique identifier
    pub id: EntityId,

    /// What should be done
    pub description: String,

    /// Why
    pub rationale: String,

    /// Priority (1 is most urgent)
    pub priority: Option<u8>,

    /// Who proposed it
    pub identified_by: Origin,

    /// When it was recorded
    pub created_at: u64,
}

impl ProposedAction {
    /// Create a new proposed action
    pub fn new(
        description: impl Into<String>,
        rationale: impl Into<String>,
        identified_by: Origin,
    ) -> Self {
        Self {
            id: EntityId::new(),
            description: description.into(),
            rationale: rationale.into(),
            priority: None,
            identified_by,
            created_at: now_ms(),
        }
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Kind of an entity, used for counting and storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// [`Fact`]
    Fact,
    /// [`ContextHypothesis`]
    Context,
    /// [`Obligation`]
    Obligation,
    /// [`MissingElement`]
    MissingElement,
    /// [`Risk`]
    Risk,
    /// [`ProposedAction`]
    ProposedAction,
}

impl EntityKind {
    /// All kinds in pipeline order
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Fact,
        EntityKind::Context,
        EntityKind::Obligation,
        EntityKind::MissingElement,
        EntityKind::Risk,
        EntityKind::ProposedAction,
    ];

    /// Storage name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Fact => "fact",
            EntityKind::Context => "context",
            EntityKind::Obligation => "obligation",
            EntityKind::MissingElement => "missing_element",
            EntityKind::Risk => "risk",
            EntityKind::ProposedAction => "proposed_action",
        }
    }

    /// Human-readable record name, as used in rejection messages
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Fact => "Fact",
            EntityKind::Context => "ContextHypothesis",
            EntityKind::Obligation => "Obligation",
            EntityKind::MissingElement => "MissingElement",
            EntityKind::Risk => "Risk",
            EntityKind::ProposedAction => "ProposedAction",
        }
    }

    /// Parse a kind from its storage name
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.as_str() == s)
    }
}

/// Any evidence entity
///
/// A closed union: every payload is one of the six typed records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    /// A fact
    Fact(Fact),
    /// A context hypothesis
    Context(ContextHypothesis),
    /// An obligation
    Obligation(Obligation),
    /// A missing element
    MissingElement(MissingElement),
    /// A risk
    Risk(Risk),
    /// A proposed action
    ProposedAction(ProposedAction),
}

impl Entity {
    /// Identifier of the wrapped record
    pub fn id(&self) -> EntityId {
        match self {
            Entity::Fact(e) => e.id,
            Entity::Context(e) => e.id,
            Entity::Obligation(e) => e.id,
            Entity::MissingElement(e) => e.id,
            Entity::Risk(e) => e.id,
            Entity::ProposedAction(e) => e.id,
        }
    }

    /// Kind of the wrapped record
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Fact(_) => EntityKind::Fact,
            Entity::Context(_) => EntityKind::Context,
            Entity::Obligation(_) => EntityKind::Obligation,
            Entity::MissingElement(_) => EntityKind::MissingElement,
            Entity::Risk(_) => EntityKind::Risk,
            Entity::ProposedAction(_) => EntityKind::ProposedAction,
        }
    }

    /// Provenance of the wrapped record
    pub fn origin(&self) -> Origin {
        match self {
            Entity::Fact(e) => e.extracted_by,
            Entity::Context(e) => e.identified_by,
            Entity::Obligation(e) => e.identified_by,
            Entity::MissingElement(e) => e.identified_by,
            Entity::Risk(e) => e.identified_by,
            Entity::ProposedAction(e) => e.identified_by,
        }
    }

    /// Creation timestamp of the wrapped record
    pub fn created_at(&self) -> u64 {
        match self {
            Entity::Fact(e) => e.created_at,
            Entity::Context(e) => e.created_at,
            Entity::Obligation(e) => e.created_at,
            Entity::MissingElement(e) => e.created_at,
            Entity::Risk(e) => e.created_at,
            Entity::ProposedAction(e) => e.created_at,
        }
    }
}

impl From<Fact> for Entity {
    fn from(e: Fact) -> Self {
        Entity::Fact(e)
    }
}

impl From<ContextHypothesis> for Entity {
    fn from(e: ContextHypothesis) -> Self {
        Entity::Context(e)
    }
}

impl From<Obligation> for Entity {
    fn from(e: Obligation) -> Self {
        Entity::Obligation(e)
    }
}

impl From<MissingElement> for Entity {
    fn from(e: MissingElement) -> Self {
        Entity::MissingElement(e)
    }
}

impl From<Risk> for Entity {
    fn from(e: Risk) -> Self {
        Entity::Risk(e)
    }
}

impl From<ProposedAction> for Entity {
    fn from(e: ProposedAction) -> Self {
        Entity::ProposedAction(e)
    }
}
