//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use docket_domain::{
    ActorKind, CertaintyLevel, ContextType, EvidenceMarker, FactSource, Origin, RiskSeverity,
};
use std::path::PathBuf;

/// Docket CLI - Drive case reasoning workspaces through their analytical stages.
#[derive(Debug, Parser)]
#[command(name = "docket")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database path
    #[arg(long, global = true, env = "DOCKET_DB")]
    pub database: Option<PathBuf>,

    /// Tenant the workspaces belong to
    #[arg(short, long, global = true, env = "DOCKET_TENANT")]
    pub tenant: Option<String>,

    /// Name recorded as the actor of changes
    #[arg(short, long, global = true, env = "DOCKET_ACTOR")]
    pub actor: Option<String>,

    /// Kind of actor recorded with changes
    #[arg(long, value_enum, global = true)]
    pub actor_kind: Option<ActorKindArg>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open a workspace for a newly received matter
    Open,

    /// Add evidence to a workspace
    Add(AddArgs),

    /// Record that a stage legitimately found nothing
    Mark(MarkArgs),

    /// Mark a missing element as provided
    Resolve(ResolveArgs),

    /// Correct a fact (appends a replacement, never edits)
    Correct(CorrectArgs),

    /// Check whether a workspace could move to a state, without moving it
    Check(TargetArgs),

    /// Move a workspace to a later state
    Advance(AdvanceArgs),

    /// Lock a workspace against further transitions
    Lock(WorkspaceArg),

    /// Unlock a workspace
    Unlock(WorkspaceArg),

    /// List workspaces, or show one with its evidence
    Show(ShowArgs),

    /// Show the transition log of a workspace
    Log(WorkspaceArg),

    /// Show the reasoning trace of a workspace
    Trace(WorkspaceArg),
}

/// A workspace identifier argument.
#[derive(Debug, Args)]
pub struct WorkspaceArg {
    /// Workspace ID
    pub workspace: String,
}

/// Arguments for the add command.
#[derive(Debug, Args)]
pub struct AddArgs {
    /// Workspace ID
    pub workspace: String,

    /// Who produced the entity
    #[arg(short, long, value_enum, default_value = "human")]
    pub origin: OriginArg,

    #[command(subcommand)]
    pub entity: AddEntity,
}

/// Entity to add.
#[derive(Debug, Subcommand)]
pub enum AddEntity {
    /// A fact taken from the source material
    Fact {
        /// Short label (e.g., "sender")
        label: String,
        /// Asserted value
        value: String,
        /// Where the fact was taken from
        #[arg(short, long, value_enum, default_value = "explicit-message")]
        source: FactSourceArg,
        /// Pointer into the source material
        #[arg(long)]
        source_ref: Option<String>,
    },

    /// A candidate framing of the matter
    Context {
        /// What the framing is
        description: String,
        /// Kind of framing
        #[arg(short = 'k', long = "type", value_enum)]
        context_type: ContextTypeArg,
        /// How certain the framing is
        #[arg(long, value_enum, default_value = "possible")]
        certainty: CertaintyArg,
        /// Why it was proposed
        #[arg(short, long, default_value = "")]
        reasoning: String,
    },

    /// An obligation deduced for the client
    Obligation {
        /// What has to be done
        description: String,
        /// Legal or contractual basis
        #[arg(short, long)]
        basis: String,
        /// Deadline, as stated in the source material
        #[arg(short, long)]
        deadline: Option<String>,
    },

    /// Something the matter needs that has not been provided
    Missing {
        /// What is missing
        description: String,
        /// Why its absence blocks progress
        #[arg(short, long)]
        blocking_reason: String,
    },

    /// An assessed risk
    Risk {
        /// What the risk is
        description: String,
        /// How severe it is
        #[arg(short, long, value_enum, default_value = "medium")]
        severity: SeverityArg,
        /// Suggested mitigation
        #[arg(short, long)]
        mitigation: Option<String>,
    },

    /// An action proposed to the reviewer
    Action {
        /// What should be done
        description: String,
        /// Why
        #[arg(short, long)]
        rationale: String,
        /// Priority (1 is most urgent)
        #[arg(short, long)]
        priority: Option<u8>,
    },
}

/// Arguments for the mark command.
#[derive(Debug, Args)]
pub struct MarkArgs {
    /// Workspace ID
    pub workspace: String,

    /// Outcome to record
    #[arg(value_enum)]
    pub marker: MarkerArg,
}

/// Arguments for the resolve command.
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Workspace ID
    pub workspace: String,

    /// Missing element ID
    pub element: String,
}

/// Arguments for the correct command.
#[derive(Debug, Args)]
pub struct CorrectArgs {
    /// Workspace ID
    pub workspace: String,

    /// ID of the fact being corrected
    pub fact: String,

    /// Corrected value
    pub value: String,

    /// New label (defaults to the corrected fact's label)
    #[arg(short, long)]
    pub label: Option<String>,

    /// Explanation written to the reasoning trace
    #[arg(short, long)]
    pub note: Option<String>,
}

/// Arguments naming a target state.
#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Workspace ID
    pub workspace: String,

    /// Target state (e.g., facts-extracted, RISK_EVALUATED)
    pub target: String,
}

/// Arguments for the advance command.
#[derive(Debug, Args)]
pub struct AdvanceArgs {
    /// Workspace ID
    pub workspace: String,

    /// Target state (e.g., facts-extracted, RISK_EVALUATED)
    pub target: String,

    /// Reason recorded with the transition
    #[arg(short, long)]
    pub reason: Option<String>,

    /// Only advance if the workspace is still at this version
    #[arg(long)]
    pub expect_version: Option<u64>,

    /// Note attached to the reasoning trace (repeatable)
    #[arg(short = 'n', long = "note", value_name = "KEY=VALUE", value_parser = parse_note)]
    pub notes: Vec<(String, String)>,
}

/// Parse a `KEY=VALUE` trace note.
fn parse_note(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid note '{}': expected KEY=VALUE", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid note '{}': empty key", s));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Arguments for the show command.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Workspace ID (lists the tenant's workspaces when omitted)
    pub workspace: Option<String>,
}

/// Origin argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OriginArg {
    /// Proposed by the AI producer
    Ai,
    /// Entered by a human
    Human,
}

/// Actor kind argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ActorKindArg {
    /// A human operator
    Human,
    /// An automated job
    System,
    /// The AI producer
    Ai,
}

/// Fact source argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum FactSourceArg {
    /// Stated in the incoming message
    ExplicitMessage,
    /// Message or document metadata
    Metadata,
    /// An attached or referenced document
    Document,
    /// Provided directly by a user
    UserProvided,
}

/// Context type argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ContextTypeArg {
    /// Legal framing
    Legal,
    /// Administrative framing
    Administrative,
    /// Contractual framing
    Contractual,
    /// Temporal framing
    Temporal,
    /// Organizational framing
    Organizational,
}

/// Certainty argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CertaintyArg {
    /// Weakly supported
    Possible,
    /// Likely
    Probable,
    /// Confirmed
    Confirmed,
}

/// Severity argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SeverityArg {
    /// Minor exposure
    Low,
    /// Notable exposure
    Medium,
    /// Serious exposure
    High,
    /// Immediate action required
    Critical,
}

/// Marker argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum MarkerArg {
    /// Obligation analysis found no obligation
    NoObligations,
    /// Missing-element evaluation ran
    MissingEvaluated,
    /// Risk assessment found no risk
    NoRisk,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<OriginArg> for Origin {
    fn from(origin: OriginArg) -> Self {
        match origin {
            OriginArg::Ai => Origin::Ai,
            OriginArg::Human => Origin::Human,
        }
    }
}

impl From<ActorKindArg> for ActorKind {
    fn from(kind: ActorKindArg) -> Self {
        match kind {
            ActorKindArg::Human => ActorKind::Human,
            ActorKindArg::System => ActorKind::System,
            ActorKindArg::Ai => ActorKind::Ai,
        }
    }
}

impl From<FactSourceArg> for FactSource {
    fn from(source: FactSourceArg) -> Self {
        match source {
            FactSourceArg::ExplicitMessage => FactSource::ExplicitMessage,
            FactSourceArg::Metadata => FactSource::Metadata,
            FactSourceArg::Document => FactSource::Document,
            FactSourceArg::UserProvided => FactSource::UserProvided,
        }
    }
}

impl From<ContextTypeArg> for ContextType {
    fn from(context_type: ContextTypeArg) -> Self {
        match context_type {
            ContextTypeArg::Legal => ContextType::Legal,
            ContextTypeArg::Administrative => ContextType::Administrative,
            ContextTypeArg::Contractual => ContextType::Contractual,
            ContextTypeArg::Temporal => ContextType::Temporal,
            ContextTypeArg::Organizational => ContextType::Organizational,
        }
    }
}

impl From<CertaintyArg> for CertaintyLevel {
    fn from(certainty: CertaintyArg) -> Self {
        match certainty {
            CertaintyArg::Possible => CertaintyLevel::Possible,
            CertaintyArg::Probable => CertaintyLevel::Probable,
            CertaintyArg::Confirmed => CertaintyLevel::Confirmed,
        }
    }
}

impl From<SeverityArg> for RiskSeverity {
    fn from(severity: SeverityArg) -> Self {
        match severity {
            SeverityArg::Low => RiskSeverity::Low,
            SeverityArg::Medium => RiskSeverity::Medium,
            SeverityArg::High => RiskSeverity::High,
            SeverityArg::Critical => RiskSeverity::Critical,
        }
    }
}

impl From<MarkerArg> for EvidenceMarker {
    fn from(marker: MarkerArg) -> Self {
        match marker {
            MarkerArg::NoObligations => EvidenceMarker::NoObligations,
            MarkerArg::MissingEvaluated => EvidenceMarker::MissingElementsEvaluated,
            MarkerArg::NoRisk => EvidenceMarker::NoRisk,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WS: &str = "0192a4f0-1c2b-7d3e-8f40-123456789abc";

    #[test]
    fn test_open_command() {
        let cli = Cli::parse_from(["docket", "--tenant", "acme", "open"]);
        assert!(matches!(cli.command, Command::Open));
        assert_eq!(cli.tenant.as_deref(), Some("acme"));
    }

    #[test]
    fn test_add_fact_command() {
        let cli = Cli::parse_from([
            "docket", "add", WS, "--origin", "ai", "fact", "sender", "client@example.com",
            "--source", "metadata",
        ]);
        match cli.command {
            Command::Add(args) => {
                assert_eq!(args.workspace, WS);
                assert!(matches!(args.origin, OriginArg::Ai));
                match args.entity {
                    AddEntity::Fact { label, value, source, source_ref } => {
                        assert_eq!(label, "sender");
                        assert_eq!(value, "client@example.com");
                        assert!(matches!(source, FactSourceArg::Metadata));
                        assert!(source_ref.is_none());
                    }
                    other => panic!("Expected fact, got {:?}", other),
                }
            }
            _ => panic!("Expected Add command"),
        }
    }

    #[test]
    fn test_add_context_command() {
        let cli = Cli::parse_from([
            "docket", "add", WS, "context", "Unpaid invoice", "--type", "contractual",
            "--certainty", "confirmed",
        ]);
        match cli.command {
            Command::Add(AddArgs {
                entity: AddEntity::Context { context_type, certainty, .. },
                ..
            }) => {
                assert!(matches!(ContextType::from(context_type), ContextType::Contractual));
                assert_eq!(CertaintyLevel::from(certainty), CertaintyLevel::Confirmed);
            }
            _ => panic!("Expected Add context command"),
        }
    }

    #[test]
    fn test_advance_command() {
        let cli = Cli::parse_from([
            "docket", "advance", WS, "risk-evaluated", "--reason", "assessed", "--expect-version",
            "4",
        ]);
        match cli.command {
            Command::Advance(args) => {
                assert_eq!(args.target, "risk-evaluated");
                assert_eq!(args.reason.as_deref(), Some("assessed"));
                assert_eq!(args.expect_version, Some(4));
            }
            _ => panic!("Expected Advance command"),
        }
    }

    #[test]
    fn test_advance_notes() {
        let cli = Cli::parse_from([
            "docket", "advance", WS, "ready-for-human", "-n", "ticket=INT-42", "--note",
            "reviewer=bob=lead",
        ]);
        match cli.command {
            Command::Advance(args) => {
                assert_eq!(
                    args.notes,
                    vec![
                        ("ticket".to_string(), "INT-42".to_string()),
                        ("reviewer".to_string(), "bob=lead".to_string()),
                    ]
                );
            }
            _ => panic!("Expected Advance command"),
        }

        for bad in ["ticket", "=x"] {
            let result =
                Cli::try_parse_from(["docket", "advance", WS, "ready-for-human", "-n", bad]);
            assert!(result.is_err(), "accepted note {}", bad);
        }
    }

    #[test]
    fn test_mark_command() {
        let cli = Cli::parse_from(["docket", "mark", WS, "no-risk"]);
        match cli.command {
            Command::Mark(args) => {
                assert_eq!(EvidenceMarker::from(args.marker), EvidenceMarker::NoRisk);
            }
            _ => panic!("Expected Mark command"),
        }
    }

    #[test]
    fn test_show_without_workspace() {
        let cli = Cli::parse_from(["docket", "show", "--format", "json"]);
        assert!(matches!(cli.command, Command::Show(ShowArgs { workspace: None })));
        assert!(matches!(cli.format, Some(CliFormat::Json)));
    }

    #[test]
    fn test_missing_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["docket"]).is_err());
    }
}
