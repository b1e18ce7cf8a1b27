// `waves` entry point.
//
// Startup sequence:
// 1. Parse the command line
// 2. Initialize tracing (log to file, stdout carries command output only)
// 3. Load config, copying defaults on first run
// 4. Open play log, game session and roster
// 5. Run the command and print its result

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::info;

use waves_app::app::{describe_pev, describe_run_expectancy, App};
use waves_app::cli::{Cli, Command, TeamsCommand};
use waves_app::config::{self, ScopeKind};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Parse the command line
    let cli = Cli::parse();
    let base_dir = match cli.dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to resolve working directory")?,
    };

    // 2. Initialize tracing
    init_tracing(&base_dir)?;
    info!(command = ?cli.command, "waves starting");

    // 3. Load config
    let config = config::load_config(&base_dir).context("failed to load configuration")?;
    info!("Config loaded: team={}", config.team.name);

    // 4. Open application state
    let mut app = App::open(config).context("failed to open application state")?;

    // 5. Dispatch
    let output = match cli.command {
        Command::Status => app.status(),
        Command::Set(args) => app.update_situation(args.into())?,
        Command::ToggleBase { base } => app.toggle_base(base)?,
        Command::Log(args) => app.log_play(args.into())?,
        Command::Undo => app.undo()?,
        Command::NextInning => app.next_inning()?,
        Command::Analyze { scope } => app.analyze(scope),
        Command::Advise { scope } => advise(&app, scope).await,
        Command::Re {
            outs,
            runners,
            count,
        } => describe_run_expectancy(outs, runners, count),
        Command::Pev(args) => {
            describe_pev(&args.before(), args.outcome, args.runs, args.after())
        }
        Command::Export { path } => app.export(&path)?,
        Command::Import { path, yes } => app.import(&path, yes)?,
        Command::Teams { action } => match action {
            TeamsCommand::List => app.list_teams(),
            TeamsCommand::Add { name } => app.add_team(&name)?,
        },
        Command::Opponent { name } => app.set_opponent(name.as_deref())?,
    };

    let output = output.trim_end();
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

/// Print the coach's reply as it streams in. Returns whatever still has to be
/// printed afterwards: the fallback message when nothing (or only part of a
/// reply) was streamed.
async fn advise(app: &App, scope: Option<ScopeKind>) -> String {
    let mut stdout = std::io::stdout();
    let mut streamed = String::new();
    let text = app
        .advise(scope, |token| {
            let _ = write!(stdout, "{token}");
            let _ = stdout.flush();
            streamed.push_str(token);
        })
        .await;

    if streamed.is_empty() {
        return text;
    }
    println!();
    if text == streamed.trim() {
        String::new()
    } else {
        text
    }
}

/// Initialize tracing to log to a file so stdout only carries command output.
fn init_tracing(base_dir: &Path) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir: PathBuf = base_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("waves.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("waves=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
