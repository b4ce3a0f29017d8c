use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod context;

use context::Context;

#[derive(Parser)]
#[command(name = "dailyread-cli", version, about = "Dailyread reading-plan CLI")]
struct Cli {
    /// Config file (defaults to the data directory's config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User registration and settings
    User {
        #[command(subcommand)]
        action: commands::user::UserAction,
    },
    /// Show the reading card at the user's pointer
    Today {
        user_id: i64,
    },
    /// Preview the reading after the user's pointer
    Next {
        user_id: i64,
    },
    /// Streak, breaks and totals
    Stats {
        user_id: i64,
    },
    /// Apply a card button payload (read|m|d, break|m|d, next)
    Interact {
        user_id: i64,
        /// Unique id of this delivery; repeats are ignored
        interaction_id: String,
        payload: String,
    },
    /// Scheduled sends
    Sweep {
        #[command(subcommand)]
        action: commands::sweep::SweepAction,
    },
    /// Reading plan content
    Plan {
        #[command(subcommand)]
        action: commands::plan::PlanAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Claimed interaction bookkeeping
    Claims {
        #[command(subcommand)]
        action: commands::claims::ClaimsAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Commands::Config { action } = cli.command {
        return commands::config::run(action, cli.config);
    }

    let ctx = Context::load(cli.config)?;
    match cli.command {
        Commands::User { action } => commands::user::run(&ctx, action),
        Commands::Today { user_id } => commands::reading::today(&ctx, user_id),
        Commands::Next { user_id } => commands::reading::next(&ctx, user_id),
        Commands::Stats { user_id } => commands::reading::stats(&ctx, user_id),
        Commands::Interact {
            user_id,
            interaction_id,
            payload,
        } => commands::interact::run(&ctx, user_id, &interaction_id, &payload),
        Commands::Sweep { action } => commands::sweep::run(&ctx, action),
        Commands::Plan { action } => commands::plan::run(&ctx, action),
        Commands::Claims { action } => commands::claims::run(&ctx, action),
        Commands::Config { .. } => Ok(()),
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
