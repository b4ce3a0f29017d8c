use std::path::PathBuf;

use clap::Subcommand;
use dailyread_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as JSON (cron secret redacted)
    Show,
    /// Get a config value
    Get {
        /// Dot-separated key (e.g. "breaks.cap", "schedule.daily_target")
        key: String,
    },
    /// Print the config file location
    Path,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn resolve(path: Option<PathBuf>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(path),
        None => Ok(Config::default_path()?),
    }
}

pub fn run(action: ConfigAction, path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let path = resolve(path)?;
    match action {
        ConfigAction::Show => {
            let mut config = Config::load_from(&path)?;
            if !config.cron.secret.is_empty() {
                config.cron.secret = "<redacted>".to_string();
            }
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Get { key } => {
            let config = Config::load_from(&path)?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Path => println!("{}", path.display()),
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                return Err(format!("{} already exists (use --force)", path.display()).into());
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            Config::default().save_to(&path)?;
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}
