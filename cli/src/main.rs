use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use scoreboard_cli::CliContext;
use scoreboard_cli::commands;
use scoreboard_cli::logging;
use scoreboard_cli::readline;

/// Interactive host simulator for the scoreboard overlays.
#[derive(Parser)]
#[command(version, about = "scoreboard host simulator")]
struct Args {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start without a rendering adapter, leaving the scoreboard inert
    #[arg(long)]
    no_adapter: bool,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();
    let _log_guard = logging::init();

    let ctx = CliContext::new(args.config, !args.no_adapter)?;

    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &ctx).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                write!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(version, about = "cli")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect a client
    Join {
        name: String,
        #[arg(short, long, default_value = "world")]
        zone: String,
    },
    /// Disconnect a client
    Quit { name: String },
    /// Drop a client's connection from the host side
    Kick { name: String },
    /// Show or hide a client's scoreboard
    Toggle { name: String },
    /// Move a client to another zone
    Move { name: String, zone: String },
    /// Reload the configuration file
    Reload,
    List,
    /// Print what a client currently sees
    Show { name: String },
    Status,
    Exit,
}

async fn respond(line: &str, ctx: &CliContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "scoreboard".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match &cli.command {
        Some(Commands::Join { name, zone }) => commands::join(ctx, name, zone),
        Some(Commands::Quit { name }) => commands::quit(ctx, name),
        Some(Commands::Kick { name }) => commands::kick(ctx, name),
        Some(Commands::Toggle { name }) => commands::toggle(ctx, name),
        Some(Commands::Move { name, zone }) => commands::move_to(ctx, name, zone),
        Some(Commands::Reload) => commands::reload(ctx).await,
        Some(Commands::List) => commands::list(ctx),
        Some(Commands::Show { name }) => commands::show(ctx, name),
        Some(Commands::Status) => commands::status(ctx),
        Some(Commands::Exit) => {
            commands::exit(ctx).await;
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
