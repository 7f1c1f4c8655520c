//! Evidence commands: add, mark, resolve, correct.

use super::{parse_entity_id, parse_workspace_id, Session};
use crate::cli::{AddArgs, AddEntity, CorrectArgs, MarkArgs, ResolveArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use docket_domain::{
    ActorKind, ContextHypothesis, Entity, EvidenceMarker, Fact, MissingElement, Obligation,
    Origin, ProposedAction, Risk, WorkspaceStore,
};
use docket_engine::{EngineError, WorkflowEngine};

/// Execute the add command.
pub fn execute_add<S: WorkspaceStore>(
    args: AddArgs,
    engine: &WorkflowEngine<S>,
    session: &Session,
    formatter: &Formatter,
) -> Result<String> {
    let id = parse_workspace_id(&args.workspace)?;
    let origin: Origin = args.origin.into();
    let entity = build_entity(args.entity, origin)?;
    let label = entity.kind().label();

    let entity_id = engine.add_entity(&session.tenant, id, entity)?;
    Ok(formatter.created(label, &entity_id.to_string()))
}

fn build_entity(entity: AddEntity, origin: Origin) -> Result<Entity> {
    let entity = match entity {
        AddEntity::Fact {
            label,
            value,
            source,
            source_ref,
        } => {
            require_text("label", &label)?;
            let mut fact = Fact::new(label, value, source.into(), origin);
            if let Some(source_ref) = source_ref {
                fact = fact.with_source_ref(source_ref);
            }
            fact.into()
        }
        AddEntity::Context {
            description,
            context_type,
            certainty,
            reasoning,
        } => {
            require_text("description", &description)?;
            ContextHypothesis::new(
                context_type.into(),
                certainty.into(),
                description,
                reasoning,
                origin,
            )
            .into()
        }
        AddEntity::Obligation {
            description,
            basis,
            deadline,
        } => {
            require_text("description", &description)?;
            let mut obligation = Obligation::new(description, basis, origin);
            if let Some(deadline) = deadline {
                obligation = obligation.with_deadline(deadline);
            }
            obligation.into()
        }
        AddEntity::Missing {
            description,
            blocking_reason,
        } => {
            require_text("description", &description)?;
            MissingElement::new(description, blocking_reason, origin).into()
        }
        AddEntity::Risk {
            description,
            severity,
            mitigation,
        } => {
            require_text("description", &description)?;
            let mut risk = Risk::new(description, severity.into(), origin);
            if let Some(mitigation) = mitigation {
                risk = risk.with_mitigation(mitigation);
            }
            risk.into()
        }
        AddEntity::Action {
            description,
            rationale,
            priority,
        } => {
            require_text("description", &description)?;
            let mut action = ProposedAction::new(description, rationale, origin);
            if let Some(priority) = priority {
                action = action.with_priority(priority);
            }
            action.into()
        }
    };
    Ok(entity)
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CliError::InvalidInput(format!("{} cannot be empty", field)));
    }
    Ok(())
}

/// Execute the mark command.
pub fn execute_mark<S: WorkspaceStore>(
    args: MarkArgs,
    engine: &WorkflowEngine<S>,
    session: &Session,
    formatter: &Formatter,
) -> Result<String> {
    let id = parse_workspace_id(&args.workspace)?;
    let marker: EvidenceMarker = args.marker.into();
    engine.record_marker(&session.tenant, id, marker)?;
    Ok(formatter.success(&format!("Marker {} recorded", marker.as_str())))
}

/// Execute the resolve command.
pub fn execute_resolve<S: WorkspaceStore>(
    args: ResolveArgs,
    engine: &WorkflowEngine<S>,
    session: &Session,
    formatter: &Formatter,
) -> Result<String> {
    let id = parse_workspace_id(&args.workspace)?;
    let element = parse_entity_id(&args.element)?;
    engine.resolve_missing_element(&session.tenant, id, element)?;
    Ok(formatter.success(&format!("Missing element {} resolved", element)))
}

/// Execute the correct command.
pub fn execute_correct<S: WorkspaceStore>(
    args: CorrectArgs,
    engine: &WorkflowEngine<S>,
    session: &Session,
    formatter: &Formatter,
) -> Result<String> {
    let id = parse_workspace_id(&args.workspace)?;
    let fact_id = parse_entity_id(&args.fact)?;

    let evidence = engine.evidence(&session.tenant, id)?;
    let original = evidence
        .fact(fact_id)
        .ok_or_else(|| EngineError::EntityNotFound(format!("fact {}", fact_id)))?;

    let origin = match session.actor.kind {
        ActorKind::Ai => Origin::Ai,
        ActorKind::Human | ActorKind::System => Origin::Human,
    };
    let label = args.label.unwrap_or_else(|| original.label.clone());
    let corrected = Fact::new(label, args.value, original.source, origin);

    let replacement = engine.correct_fact(
        &session.tenant,
        id,
        fact_id,
        corrected,
        &session.actor,
        args.note.as_deref(),
    )?;
    Ok(formatter.created("Corrected fact", &replacement.to_string()))
}
