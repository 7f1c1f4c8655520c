//! Docket Gatekeeper
//!
//! Decides whether a workspace may move from one workflow state to another.
//!
//! The pipeline is evidence-gated, not merely sequential: reaching a stage
//! requires the evidence every stage up to it presupposes. The Gatekeeper
//! provides:
//! - Direction checks (forward only, never the same state)
//! - Jump policy (skip ahead when evidence allows, or single step only)
//! - Evidence gates per target state
//! - Human-readable rejection reasons, surfaced verbatim to operators
//!
//! # Examples
//!
//! ```
//! use docket_domain::{EntityStore, WorkflowState};
//! use docket_gatekeeper::TransitionValidator;
//!
//! let validator = TransitionValidator::default_config();
//! let result = validator.validate(
//!     WorkflowState::Received,
//!     WorkflowState::FactsExtracted,
//!     &EntityStore::new(),
//! );
//!
//! assert!(!result.is_valid());
//! assert_eq!(
//!     result.reason().as_deref(),
//!     Some("cannot reach FACTS_EXTRACTED: no Fact recorded")
//! );
//! ```

#![warn(missing_docs)]

mod config;
mod validator;

pub use config::{JumpPolicy, ValidationConfig};
pub use validator::{
    validate_state_transition, RejectionReason, Requirement, TransitionValidator,
    ValidationResult,
};
