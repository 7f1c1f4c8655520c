//! Operational counters for the workflow engine

use docket_domain::WorkflowState;
use std::collections::BTreeMap;

/// Counters collected by the engine
///
/// Tracks committed and rejected transitions per target state, plus the
/// other operations callers perform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineMetrics {
    /// Workspaces created
    pub workspaces_created: usize,

    /// Entities appended (corrections included)
    pub entities_added: usize,

    /// Committed transitions per target state
    pub committed: BTreeMap<WorkflowState, usize>,

    /// Rejected transitions per requested state
    pub rejected: BTreeMap<WorkflowState, usize>,

    /// Attempts refused because the workspace was locked
    pub locked_rejections: usize,

    /// Commits that lost a version race
    pub conflicts: usize,

    /// Facts corrected
    pub corrections: usize,
}

impl EngineMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a workspace creation
    pub fn record_workspace(&mut self) {
        self.workspaces_created += 1;
    }

    /// Record an appended entity
    pub fn record_entity(&mut self) {
        self.entities_added += 1;
    }

    /// Record a committed transition
    pub fn record_commit(&mut self, to: WorkflowState) {
        *self.committed.entry(to).or_insert(0) += 1;
    }

    /// Record a rejected transition
    pub fn record_rejection(&mut self, to: WorkflowState) {
        *self.rejected.entry(to).or_insert(0) += 1;
    }

    /// Record an attempt on a locked workspace
    pub fn record_locked(&mut self) {
        self.locked_rejections += 1;
    }

    /// Record a lost version race
    pub fn record_conflict(&mut self) {
        self.conflicts += 1;
    }

    /// Record a fact correction
    pub fn record_correction(&mut self) {
        self.corrections += 1;
    }

    /// Total committed transitions
    pub fn total_committed(&self) -> usize {
        self.committed.values().sum()
    }

    /// Total rejected transitions
    pub fn total_rejected(&self) -> usize {
        self.rejected.values().sum()
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Engine Metrics Summary".to_string(),
            "======================".to_string(),
            format!("Workspaces created: {}", self.workspaces_created),
            format!("Entities added: {}", self.entities_added),
            format!("Fact corrections: {}", self.corrections),
            format!("Locked rejections: {}", self.locked_rejections),
            format!("Version conflicts: {}", self.conflicts),
            String::new(),
        ];

        if !self.committed.is_empty() {
            lines.push("Committed transitions by target:".to_string());
            for (state, count) in &self.committed {
                lines.push(format!("  {}: {}", state, count));
            }
            lines.push(format!("  Total: {}", self.total_committed()));
            lines.push(String::new());
        }

        if !self.rejected.is_empty() {
            lines.push("Rejected transitions by target:".to_string());
            for (state, count) in &self.rejected {
                lines.push(format!("  {}: {}", state, count));
            }
            lines.push(format!("  Total: {}", self.total_rejected()));
        }

        lines.join("\n")
    }
}
