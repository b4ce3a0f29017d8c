use std::path::PathBuf;

use dailyread_core::{Config, Database, ProgressEngine, SystemClock};
use tracing::debug;

/// Loaded configuration plus the database it points at.
pub struct Context {
    pub config: Config,
}

impl Context {
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        let config = match config_path {
            Some(path) => Config::load_from(&path)?,
            None => Config::load()?,
        };
        Ok(Self { config })
    }

    pub fn engine(&self) -> Result<ProgressEngine<Database>, Box<dyn std::error::Error>> {
        let path = self.config.database_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        debug!(path = %path.display(), "opening database");
        let db = Database::open(&path)?;
        Ok(ProgressEngine::new(db, SystemClock, &self.config)?)
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
