//! TOML-based application configuration.
//!
//! Holds every tunable the engine uses:
//! - Default timezone for new users
//! - Plan grid bounds and start position
//! - Break cap and rolling window
//! - Daily-card and nudge target times with their tolerance
//! - Cron shared secret and delivery endpoint
//!
//! Configuration is stored at `~/.config/dailyread/config.toml`. It is loaded
//! and validated once at startup; components receive values derived from it.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::breaks::BreakBudget;
use crate::clock::parse_timezone;
use crate::error::ConfigError;
use crate::plan::{PlanBounds, Position};
use crate::schedule::{SendScheduler, SendWindow};

const CRON_SECRET_ENV: &str = "DAILYREAD_CRON_SECRET";

/// Plan grid configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanConfig {
    #[serde(default = "default_one")]
    pub start_month: u32,
    #[serde(default = "default_one")]
    pub start_day: u32,
    #[serde(default = "default_days_per_month")]
    pub days_per_month: u32,
    #[serde(default = "default_months_per_cycle")]
    pub months_per_cycle: u32,
}

/// Break budget configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreaksConfig {
    #[serde(default = "default_break_cap")]
    pub cap: u32,
    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

/// Reminder schedule configuration. Times are local `HH:MM`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_daily_target")]
    pub daily_target: String,
    #[serde(default = "default_nudge_target")]
    pub nudge_target: String,
    #[serde(default = "default_tolerance_minutes")]
    pub tolerance_minutes: u32,
}

/// Scheduled entry point protection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CronConfig {
    /// Shared secret; `DAILYREAD_CRON_SECRET` overrides the file value.
    #[serde(default)]
    pub secret: String,
}

/// Outbound message delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// HTTP endpoint receiving `{chat_id, text}` JSON. Unset means log only.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Claimed interaction bookkeeping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteractionsConfig {
    /// Drop claims older than this many days. Unset keeps them forever.
    #[serde(default)]
    pub retention_days: Option<u32>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/dailyread/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_timezone")]
    pub default_timezone: String,
    /// SQLite file; defaults to `dailyread.db` in the data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    #[serde(default)]
    pub plan: PlanConfig,
    #[serde(default)]
    pub breaks: BreaksConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub cron: CronConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub interactions: InteractionsConfig,
}

// Default functions
fn default_timezone() -> String {
    "Asia/Singapore".into()
}
fn default_one() -> u32 {
    1
}
fn default_days_per_month() -> u32 {
    25
}
fn default_months_per_cycle() -> u32 {
    12
}
fn default_break_cap() -> u32 {
    5
}
fn default_window_days() -> u32 {
    30
}
fn default_daily_target() -> String {
    "07:00".into()
}
fn default_nudge_target() -> String {
    "20:00".into()
}
fn default_tolerance_minutes() -> u32 {
    60
}
fn default_timeout_secs() -> u64 {
    10
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            start_month: 1,
            start_day: 1,
            days_per_month: default_days_per_month(),
            months_per_cycle: default_months_per_cycle(),
        }
    }
}

impl Default for BreaksConfig {
    fn default() -> Self {
        Self {
            cap: default_break_cap(),
            window_days: default_window_days(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            daily_target: default_daily_target(),
            nudge_target: default_nudge_target(),
            tolerance_minutes: default_tolerance_minutes(),
        }
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_timezone: default_timezone(),
            database_path: None,
            plan: PlanConfig::default(),
            breaks: BreaksConfig::default(),
            schedule: ScheduleConfig::default(),
            cron: CronConfig::default(),
            delivery: DeliveryConfig::default(),
            interactions: InteractionsConfig::default(),
        }
    }
}

fn parse_hhmm(key: &str, value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("'{value}' is not HH:MM ({e})"),
    })
}

/// Upper bound for day-count settings, about a century.
const MAX_DAYS: u32 = 36_500;

fn check_days(key: &str, days: Option<u32>) -> Result<(), ConfigError> {
    match days {
        Some(0) => Err(invalid(key, "must be at least 1")),
        Some(d) if d > MAX_DAYS => Err(invalid(key, format!("must be at most {MAX_DAYS}"))),
        _ => Ok(()),
    }
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.into(),
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Default config file location.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("~/.config/dailyread"),
                message: e.to_string(),
            })
    }

    /// Load from `path`, falling back to defaults if the file does not exist.
    /// Applies environment overrides and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// resulting configuration is invalid.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut cfg = match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                return Err(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
        };
        cfg.apply_env();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from the default location.
    ///
    /// # Errors
    ///
    /// See [`Config::load_from`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    fn apply_env(&mut self) {
        if let Ok(secret) = std::env::var(CRON_SECRET_ENV) {
            if !secret.is_empty() {
                self.cron.secret = secret;
            }
        }
    }

    /// Check every value the engine depends on.
    ///
    /// # Errors
    ///
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_timezone(&self.default_timezone)
            .map_err(|e| invalid("default_timezone", e.to_string()))?;

        if self.plan.days_per_month == 0 {
            return Err(invalid("plan.days_per_month", "must be at least 1"));
        }
        if self.plan.months_per_cycle == 0 {
            return Err(invalid("plan.months_per_cycle", "must be at least 1"));
        }
        self.plan_bounds()
            .check(self.start_position())
            .map_err(|e| invalid("plan.start_month/plan.start_day", e.to_string()))?;

        check_days("breaks.window_days", Some(self.breaks.window_days))?;

        parse_hhmm("schedule.daily_target", &self.schedule.daily_target)?;
        parse_hhmm("schedule.nudge_target", &self.schedule.nudge_target)?;
        if self.schedule.tolerance_minutes >= 12 * 60 {
            return Err(invalid(
                "schedule.tolerance_minutes",
                "must be under 720 (12 hours)",
            ));
        }

        if self.delivery.timeout_secs == 0 {
            return Err(invalid("delivery.timeout_secs", "must be at least 1"));
        }
        if let Some(endpoint) = &self.delivery.endpoint {
            let parsed = url::Url::parse(endpoint)
                .map_err(|e| invalid("delivery.endpoint", e.to_string()))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(invalid("delivery.endpoint", "must be an http(s) URL"));
            }
        }

        check_days("interactions.retention_days", self.interactions.retention_days)?;

        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn plan_bounds(&self) -> PlanBounds {
        PlanBounds::new(self.plan.days_per_month, self.plan.months_per_cycle)
    }

    pub fn start_position(&self) -> Position {
        Position::new(self.plan.start_month, self.plan.start_day)
    }

    pub fn break_budget(&self) -> BreakBudget {
        BreakBudget::new(self.breaks.cap, self.breaks.window_days)
    }

    /// Scheduler built from the configured targets.
    ///
    /// # Errors
    ///
    /// Returns an error if a target time is not `HH:MM`.
    pub fn send_scheduler(&self) -> Result<SendScheduler, ConfigError> {
        let tolerance = self.schedule.tolerance_minutes;
        Ok(SendScheduler::new(
            SendWindow::new(
                parse_hhmm("schedule.daily_target", &self.schedule.daily_target)?,
                tolerance,
            ),
            SendWindow::new(
                parse_hhmm("schedule.nudge_target", &self.schedule.nudge_target)?,
                tolerance,
            ),
        ))
    }

    /// Database file location.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => data_dir()
                .map(|dir| dir.join("dailyread.db"))
                .map_err(|e| ConfigError::LoadFailed {
                    path: PathBuf::from("~/.config/dailyread"),
                    message: e.to_string(),
                }),
        }
    }
}
