//! Actors - who requested a change

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of actor requesting an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorKind {
    /// A human operator
    Human,

    /// An automated job (batch, scheduler, webhook handler)
    System,

    /// The AI producer
    Ai,
}

impl ActorKind {
    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorKind::Human => "human",
            ActorKind::System => "system",
            ActorKind::Ai => "ai",
        }
    }
}

/// Identity recorded as `triggered_by` / `state_changed_by` / `created_by`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    /// Display name or user identifier (e.g., "user:alice", "job:intake")
    pub name: String,

    /// What kind of actor this is
    pub kind: ActorKind,
}

impl Actor {
    /// Create a new actor
    pub fn new(name: impl Into<String>, kind: ActorKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// A human operator
    pub fn human(name: impl Into<String>) -> Self {
        Self::new(name, ActorKind::Human)
    }

    /// An automated system actor
    pub fn system(name: impl Into<String>) -> Self {
        Self::new(name, ActorKind::System)
    }

    /// The AI producer
    pub fn ai(name: impl Into<String>) -> Self {
        Self::new(name, ActorKind::Ai)
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind.as_str())
    }
}
