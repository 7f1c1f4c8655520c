//! Docket Workflow Engine
//!
//! The state machine core of the case reasoning workflow. It advances a
//! workspace through its analytical stages while:
//! - **Guarding**: tenant ownership, the lock flag and optimistic versions
//! - **Validating**: every move goes through the evidence-gated validator
//! - **Scoring**: uncertainty and reasoning quality are recomputed on each attempt
//! - **Recording**: each committed move appends one `Transition` and one
//!   `ReasoningTrace` in the same atomic commit
//!
//! # Concurrency
//!
//! Transitions are synchronous units of work. Operations on one workspace
//! are serialized by a keyed lock registry, and the store's commit is a
//! compare-and-swap on the workspace version, so two racing transitions can
//! never both append a record with the same `from_state`. Different
//! workspaces never contend.
//!
//! # Usage
//!
//! ```
//! use docket_domain::{
//!     Actor, CertaintyLevel, ContextHypothesis, ContextType, EvidenceMarker, Fact, FactSource,
//!     Origin, ProposedAction, TenantId, WorkflowState,
//! };
//! use docket_engine::{EngineConfig, WorkflowEngine};
//! use docket_store::MemoryStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = WorkflowEngine::new(MemoryStore::new(), EngineConfig::default());
//! let tenant = TenantId::new("acme")?;
//! let ws = engine.create_workspace(&tenant)?;
//!
//! let sender = Fact::new("sender", "client", FactSource::Metadata, Origin::Ai);
//! engine.add_fact(&tenant, ws.id, sender)?;
//! engine.add_context(&tenant, ws.id, ContextHypothesis::new(
//!     ContextType::Contractual,
//!     CertaintyLevel::Confirmed,
//!     "Unpaid invoice",
//!     "Second reminder attached",
//!     Origin::Human,
//! ))?;
//! engine.record_marker(&tenant, ws.id, EvidenceMarker::NoObligations)?;
//! engine.record_marker(&tenant, ws.id, EvidenceMarker::MissingElementsEvaluated)?;
//! engine.record_marker(&tenant, ws.id, EvidenceMarker::NoRisk)?;
//! engine.add_proposed_action(&tenant, ws.id, ProposedAction::new(
//!     "Offer a payment plan",
//!     "Client cash flow",
//!     Origin::Ai,
//! ))?;
//!
//! let outcome = engine.transition(
//!     &tenant,
//!     ws.id,
//!     WorkflowState::ReadyForHuman,
//!     &Actor::system("intake"),
//!     Some("All stages evidenced"),
//! )?;
//! assert!(outcome.metrics.reasoning_quality > 0.0);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! See [`EngineConfig`] for the TOML layout and presets.

#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod locks;
mod metrics;

pub use config::{ConfigError, EngineConfig};
pub use engine::{
    Result, TransitionOutcome, TransitionRequest, WorkflowEngine, FACT_CORRECTION_STEP,
};
pub use error::EngineError;
pub use locks::KeyedLocks;
pub use metrics::EngineMetrics;
