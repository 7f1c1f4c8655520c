//! Workspace - the reasoning unit for one incoming matter

use crate::audit::StateSnapshot;
use crate::clock::now_ms;
use crate::evidence::EntityStore;
use crate::metrics::{compute_metrics, ScoringConfig, WorkspaceMetrics};
use crate::{Actor, TenantId, WorkflowState, WorkspaceId};
use serde::{Deserialize, Serialize};

/// A workspace
///
/// Created in `RECEIVED` when a matter arrives. Its state pointer and scores
/// are only changed by a committed transition; `version` counts those commits
/// and doubles as the optimistic concurrency token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    /// Unique identifier
    pub id: WorkspaceId,

    /// Owning tenant (never crossed)
    pub tenant_id: TenantId,

    /// Current analytical stage
    pub current_state: WorkflowState,

    /// Once true, no further transition is accepted
    pub locked: bool,

    /// Last computed uncertainty level (0-100)
    pub uncertainty_level: f64,

    /// Last computed reasoning quality (0-100)
    pub reasoning_quality: f64,

    /// When the state last changed (creation time until the first transition)
    pub state_changed_at: u64,

    /// Who last changed the state (`None` until the first transition)
    pub state_changed_by: Option<Actor>,

    /// When the workspace was created
    pub created_at: u64,

    /// Number of committed transitions
    pub version: u64,
}

impl Workspace {
    /// Create a new workspace in the initial state, scored with the default constants
    pub fn new(tenant_id: TenantId) -> Self {
        Self::with_scoring(tenant_id, &ScoringConfig::default())
    }

    /// Create a new workspace whose scores are those of an empty store under `scoring`
    pub fn with_scoring(tenant_id: TenantId, scoring: &ScoringConfig) -> Self {
        let now = now_ms();
        let metrics = compute_metrics(&EntityStore::new(), scoring);
        Self {
            id: WorkspaceId::new(),
            tenant_id,
            current_state: WorkflowState::Received,
            locked: false,
            uncertainty_level: metrics.uncertainty_level,
            reasoning_quality: metrics.reasoning_quality,
            state_changed_at: now,
            state_changed_by: None,
            created_at: now,
            version: 0,
        }
    }

    /// Last computed scores
    pub fn metrics(&self) -> WorkspaceMetrics {
        WorkspaceMetrics {
            uncertainty_level: self.uncertainty_level,
            reasoning_quality: self.reasoning_quality,
        }
    }

    /// Overwrite the stored scores
    pub fn set_metrics(&mut self, metrics: WorkspaceMetrics) {
        self.uncertainty_level = metrics.uncertainty_level;
        self.reasoning_quality = metrics.reasoning_quality;
    }

    /// State and scores at this instant
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            state: self.current_state,
            uncertainty_level: self.uncertainty_level,
            reasoning_quality: self.reasoning_quality,
        }
    }

    /// Whether the workspace belongs to the given tenant
    pub fn belongs_to(&self, tenant: &TenantId) -> bool {
        &self.tenant_id == tenant
    }
}
