//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use docket_domain::{
    EntityId, EntityStore, ReasoningTrace, Transition, Workspace, WorkspaceMetrics,
};
use docket_engine::TransitionOutcome;
use docket_gatekeeper::ValidationResult;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a list of workspaces.
    pub fn format_workspaces(&self, workspaces: &[Workspace]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(workspaces)?),
            OutputFormat::Quiet => Ok(workspaces
                .iter()
                .map(|w| w.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if workspaces.is_empty() {
                    return Ok(self.colorize("No workspaces found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["ID", "State", "Uncertainty", "Quality", "Version", "Locked"]);
                for ws in workspaces {
                    builder.push_record([
                        ws.id.to_string(),
                        ws.current_state.to_string(),
                        format!("{:.1}", ws.uncertainty_level),
                        format!("{:.1}", ws.reasoning_quality),
                        ws.version.to_string(),
                        (if ws.locked { "yes" } else { "" }).to_string(),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format one workspace with its evidence and current scores.
    pub fn format_workspace_detail(
        &self,
        workspace: &Workspace,
        evidence: &EntityStore,
        metrics: &WorkspaceMetrics,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "workspace": workspace,
                "evidence": evidence,
                "metrics": metrics,
            }))?),
            OutputFormat::Quiet => Ok(workspace.current_state.to_string()),
            OutputFormat::Table => {
                let mut out = vec![
                    format!("Workspace {}", workspace.id),
                    format!(
                        "  State:       {}{}",
                        self.colorize(workspace.current_state.as_str(), "cyan"),
                        if workspace.locked {
                            format!(" {}", self.colorize("(locked)", "yellow"))
                        } else {
                            String::new()
                        }
                    ),
                    format!("  Tenant:      {}", workspace.tenant_id),
                    format!("  Version:     {}", workspace.version),
                    format!(
                        "  Uncertainty: {:.1} (stored)  {:.1} (now)",
                        workspace.uncertainty_level, metrics.uncertainty_level
                    ),
                    format!(
                        "  Quality:     {:.1} (stored)  {:.1} (now)",
                        workspace.reasoning_quality, metrics.reasoning_quality
                    ),
                ];
                if let Some(actor) = &workspace.state_changed_by {
                    out.push(format!("  Changed by:  {}", actor));
                }

                out.push(String::new());
                out.push(self.format_evidence_table(evidence));
                if !evidence.markers().is_empty() {
                    let markers: Vec<&str> =
                        evidence.markers().iter().map(|m| m.as_str()).collect();
                    out.push(format!("Markers: {}", markers.join(", ")));
                }
                Ok(out.join("\n"))
            }
        }
    }

    fn format_evidence_table(&self, evidence: &EntityStore) -> String {
        if evidence.is_empty() {
            return self.colorize("No evidence recorded.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "Kind", "Detail", "Origin"]);

        for fact in evidence.facts() {
            let mut detail = format!("{} = {} [{}]", fact.label, fact.value, fact.source.as_str());
            if let Some(corrects) = fact.corrects {
                detail.push_str(&format!(" (corrects {})", short_id(corrects)));
            }
            builder.push_record([
                short_id(fact.id),
                "Fact".to_string(),
                detail,
                fact.extracted_by.as_str().to_string(),
            ]);
        }
        for context in evidence.contexts() {
            builder.push_record([
                short_id(context.id),
                "Context".to_string(),
                format!(
                    "{} ({}, {})",
                    context.description,
                    context.context_type.as_str(),
                    context.certainty.as_str()
                ),
                context.identified_by.as_str().to_string(),
            ]);
        }
        for obligation in evidence.obligations() {
            let deadline = obligation
                .deadline
                .as_deref()
                .map(|d| format!(", due {}", d))
                .unwrap_or_default();
            builder.push_record([
                short_id(obligation.id),
                "Obligation".to_string(),
                format!("{} ({}{})", obligation.description, obligation.basis, deadline),
                obligation.identified_by.as_str().to_string(),
            ]);
        }
        for missing in evidence.missing_elements() {
            let status = if evidence.is_resolved(missing.id) {
                "resolved"
            } else {
                "open"
            };
            builder.push_record([
                short_id(missing.id),
                "Missing".to_string(),
                format!("{} [{}]", missing.description, status),
                missing.identified_by.as_str().to_string(),
            ]);
        }
        for risk in evidence.risks() {
            builder.push_record([
                short_id(risk.id),
                "Risk".to_string(),
                format!("{} ({})", risk.description, risk.severity.as_str()),
                risk.identified_by.as_str().to_string(),
            ]);
        }
        for action in evidence.proposed_actions() {
            let priority = action
                .priority
                .map(|p| format!(" [P{}]", p))
                .unwrap_or_default();
            builder.push_record([
                short_id(action.id),
                "Action".to_string(),
                format!("{}{}", action.description, priority),
                action.identified_by.as_str().to_string(),
            ]);
        }

        self.render(builder)
    }

    /// Format a transition trail.
    pub fn format_transitions(&self, transitions: &[Transition]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(transitions)?),
            OutputFormat::Quiet => Ok(transitions
                .iter()
                .map(|t| t.to_state.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if transitions.is_empty() {
                    return Ok(self.colorize("No transitions recorded.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["#", "From", "To", "By", "Uncertainty", "Quality", "Reason"]);
                for t in transitions {
                    builder.push_record([
                        t.sequence.to_string(),
                        t.from_state.to_string(),
                        t.to_state.to_string(),
                        t.triggered_by.to_string(),
                        format!(
                            "{:.1} → {:.1}",
                            t.state_before.uncertainty_level, t.state_after.uncertainty_level
                        ),
                        format!(
                            "{:.1} → {:.1}",
                            t.state_before.reasoning_quality, t.state_after.reasoning_quality
                        ),
                        t.reason.clone().unwrap_or_default(),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format a reasoning trace.
    pub fn format_traces(&self, traces: &[ReasoningTrace]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(traces)?),
            OutputFormat::Quiet => Ok(traces
                .iter()
                .map(|t| t.step.clone())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if traces.is_empty() {
                    return Ok(self.colorize("No reasoning recorded.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["#", "Step", "Explanation", "By"]);
                for trace in traces {
                    let mut explanation = trace.explanation.clone();
                    for (key, value) in &trace.metadata.notes {
                        explanation.push_str(&format!("\n  {}: {}", key, value));
                    }
                    builder.push_record([
                        trace
                            .transition
                            .map(|s| s.to_string())
                            .unwrap_or_else(|| "-".to_string()),
                        trace.step.clone(),
                        explanation,
                        trace.created_by.to_string(),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format a dry-run validation result.
    pub fn format_validation(&self, result: &ValidationResult) -> Result<String> {
        let reasons: Vec<String> = result.reasons.iter().map(|r| r.to_string()).collect();
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "from": result.from,
                "to": result.to,
                "valid": result.is_valid(),
                "reasons": reasons,
            }))?),
            OutputFormat::Quiet => {
                Ok((if result.is_valid() { "ok" } else { "rejected" }).to_string())
            }
            OutputFormat::Table => {
                if result.is_valid() {
                    return Ok(self.success(&format!(
                        "{} → {} is allowed",
                        result.from, result.to
                    )));
                }
                let mut out = vec![self.error(&format!(
                    "{} → {} would be rejected",
                    result.from, result.to
                ))];
                out.extend(reasons.iter().map(|r| format!("  - {}", r)));
                Ok(out.join("\n"))
            }
        }
    }

    /// Format a committed transition.
    pub fn format_outcome(&self, outcome: &TransitionOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "workspace": outcome.workspace,
                "metrics": outcome.metrics,
                "transition": outcome.transition,
            }))?),
            OutputFormat::Quiet => Ok(outcome.workspace.current_state.to_string()),
            OutputFormat::Table => Ok(self.success(&format!(
                "{} → {} (uncertainty {:.1}, quality {:.1}, version {})",
                outcome.transition.from_state,
                outcome.transition.to_state,
                outcome.metrics.uncertainty_level,
                outcome.metrics.reasoning_quality,
                outcome.workspace.version
            ))),
        }
    }

    /// Format the id of something just created.
    pub fn created(&self, what: &str, id: &str) -> String {
        match self.format {
            OutputFormat::Json => serde_json::json!({ "id": id }).to_string(),
            OutputFormat::Quiet => id.to_string(),
            OutputFormat::Table => self.success(&format!("{} created: {}", what, id)),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn render(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// First eight characters of an entity id, enough to tell rows apart.
fn short_id(id: EntityId) -> String {
    id.to_string().chars().take(8).collect()
}
