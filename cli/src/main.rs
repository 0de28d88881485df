use std::sync::Arc;

use clap::{Parser, Subcommand};
use keywatch_cli::app_state::AppState;
use keywatch_cli::{commands, readline, render};
use tokio::sync::RwLock;
use tracing_subscriber::filter::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), String> {
    init_logging();

    let state = Arc::new(RwLock::new(AppState::new()));
    state
        .write()
        .await
        .tracker
        .subscribe("notices", Box::new(render::NoticePrinter));

    // One-shot mode when a subcommand is given on the command line
    let cli = Cli::parse();
    if let Some(command) = cli.command {
        run_command(&command, Arc::clone(&state)).await;
        // A follow task keeps running until interrupted
        let follow = state.write().await.follow_task.take();
        if let Some(task) = follow {
            let _ = task.await;
        }
        return Ok(());
    }

    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, Arc::clone(&state)).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                println!("{err}");
            }
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(version, about = "Key item cooldown tracker")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the item status table
    Status,
    /// Process a capture file (all frames, then print status)
    Feed {
        #[arg(short, long, default_value = "")]
        path: String,
    },
    /// Tail a capture file, processing frames as they arrive
    Follow {
        #[arg(short, long, default_value = "")]
        path: String,
    },
    /// Force a cooldown start time (correction for a missed frame)
    SetTimestamp {
        #[arg(short, long)]
        id: u16,
        #[arg(short, long)]
        time: i64,
    },
    /// Force the stored time credit
    SetTimebank {
        #[arg(short, long)]
        secs: i64,
    },
    /// Write the durable state file now
    Save,
    /// Take a manual backup snapshot
    Backup,
    /// List backup snapshots for the current identity
    Backups,
    /// Restore a named backup as current state
    Restore {
        #[arg(short, long)]
        name: String,
    },
    /// Set or clear the player identity
    Identity {
        #[arg(short, long)]
        id: Option<u32>,
        #[arg(short, long)]
        clear: bool,
    },
    /// Show configuration and paths
    Config,
    Exit,
}

async fn run_command(command: &Commands, state: Arc<RwLock<AppState>>) {
    match command {
        Commands::Status => commands::show_status(state).await,
        Commands::Feed { path } => commands::feed_file(path, state).await,
        Commands::Follow { path } => commands::follow_file(path, state).await,
        Commands::SetTimestamp { id, time } => commands::set_timestamp(*id, *time, state).await,
        Commands::SetTimebank { secs } => commands::set_timebank(*secs, state).await,
        Commands::Save => commands::save(state).await,
        Commands::Backup => commands::backup(state).await,
        Commands::Backups => commands::list_backups(state).await,
        Commands::Restore { name } => commands::restore(name, state).await,
        Commands::Identity { id, clear } => {
            let identity = if *clear { None } else { *id };
            commands::set_identity(identity, state).await;
        }
        Commands::Config => commands::show_settings(state).await,
        Commands::Exit => commands::exit(),
    }
}

async fn respond(line: &str, state: Arc<RwLock<AppState>>) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "keywatch".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match &cli.command {
        Some(Commands::Exit) => {
            commands::exit();
            return Ok(true);
        }
        Some(command) => run_command(command, state).await,
        None => {}
    }
    Ok(false)
}

/// Initialize logging, writing to KEYWATCH_LOG_PATH if set, otherwise
/// stderr.
fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    if let Ok(path) = std::env::var("KEYWATCH_LOG_PATH") {
        if let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(file)
                .init();
            return;
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
