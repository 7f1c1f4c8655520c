//! Docket Domain Layer
//!
//! This crate contains the core model of the case reasoning workflow: the
//! states a matter moves through, the evidence that accumulates along the way,
//! and the immutable records that explain every step. It holds no I/O and
//! depends only on `uuid` and `serde`.
//!
//! ## Key Concepts
//!
//! - **Workspace**: The reasoning unit for one incoming matter
//! - **WorkflowState**: Eight ordered analytical stages, `RECEIVED` to `READY_FOR_HUMAN`
//! - **Entity**: Evidence attached to a workspace (facts, context hypotheses,
//!   obligations, missing elements, risks, proposed actions)
//! - **EntityStore**: The per-workspace collection evidence accumulates into
//! - **Transition / ReasoningTrace**: Append-only audit trail and narrative
//! - **Metrics**: Uncertainty level and reasoning quality, computed purely
//!   from the evidence
//!
//! ## Architecture
//!
//! - Pure domain logic only
//! - Storage implementations live in `docket-store`
//! - Transition rules live in `docket-gatekeeper`
//! - Orchestration lives in `docket-engine`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod actor;
pub mod audit;
pub mod clock;
pub mod entity;
pub mod evidence;
pub mod ids;
pub mod metrics;
pub mod state;
pub mod traits;
pub mod workspace;

// Re-exports for convenience
pub use actor::{Actor, ActorKind};
pub use audit::{
    visited_states, ChainError, ReasoningTrace, StateSnapshot, TraceEntry, TraceMetadata,
    Transition,
};
pub use entity::{
    CertaintyLevel, ContextHypothesis, ContextType, Entity, EntityKind, Fact, FactSource,
    MissingElement, Obligation, Origin, ProposedAction, Risk, RiskSeverity,
};
pub use evidence::{EntityStore, EvidenceMarker};
pub use ids::{EntityId, TenantId, WorkspaceId};
pub use metrics::{compute_metrics, ScoringConfig, WorkspaceMetrics};
pub use state::WorkflowState;
pub use traits::{CommitOutcome, WorkspaceStore};
pub use workspace::Workspace;
