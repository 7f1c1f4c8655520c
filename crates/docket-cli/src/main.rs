//! Docket CLI - Command-line interface for the case reasoning workflow.

use clap::Parser;
use docket_cli::commands;
use docket_cli::{Cli, CliError, Command, Config, Formatter, Session};
use docket_domain::{Actor, ActorKind, TenantId};
use docket_engine::WorkflowEngine;
use docket_store::SqliteStore;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    match run() {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Logs go to stderr so command output stays pipeable.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("DOCKET_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> docket_cli::Result<String> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let tenant = cli
        .tenant
        .clone()
        .or_else(|| config.defaults.tenant.clone())
        .unwrap_or_else(|| "default".to_string());
    let tenant = TenantId::new(tenant).map_err(CliError::InvalidInput)?;

    let actor_name = cli
        .actor
        .clone()
        .or_else(|| config.defaults.actor.clone())
        .unwrap_or_else(|| "operator".to_string());
    let actor_kind = cli.actor_kind.map(Into::into).unwrap_or(ActorKind::Human);
    let session = Session::new(tenant, Actor::new(actor_name, actor_kind));

    let database = match &cli.database {
        Some(path) => path.clone(),
        None => config.database_path()?,
    };
    if let Some(parent) = database.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    debug!(database = %database.display(), tenant = %session.tenant, "Opening store");

    let store = SqliteStore::new(&database)?;
    let engine = WorkflowEngine::new(store, config.engine);

    let output = match cli.command {
        Command::Open => commands::execute_open(&engine, &session, &formatter),
        Command::Add(args) => commands::execute_add(args, &engine, &session, &formatter),
        Command::Mark(args) => commands::execute_mark(args, &engine, &session, &formatter),
        Command::Resolve(args) => commands::execute_resolve(args, &engine, &session, &formatter),
        Command::Correct(args) => commands::execute_correct(args, &engine, &session, &formatter),
        Command::Check(args) => commands::execute_check(args, &engine, &session, &formatter),
        Command::Advance(args) => commands::execute_advance(args, &engine, &session, &formatter),
        Command::Lock(args) => commands::execute_lock(args, &engine, &session, &formatter),
        Command::Unlock(args) => commands::execute_unlock(args, &engine, &session, &formatter),
        Command::Show(args) => commands::execute_show(args, &engine, &session, &formatter),
        Command::Log(args) => commands::execute_log(args, &engine, &session, &formatter),
        Command::Trace(args) => commands::execute_trace(args, &engine, &session, &formatter),
    };

    debug!("{}", engine.engine_metrics().summary());
    output
}
