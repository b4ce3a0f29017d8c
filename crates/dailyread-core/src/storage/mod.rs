mod config;
pub mod database;
pub mod memory;
pub mod migrations;

pub use config::{
    BreaksConfig, Config, CronConfig, DeliveryConfig, InteractionsConfig, PlanConfig,
    ScheduleConfig,
};
pub use database::Database;
pub use memory::MemoryStore;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::DatabaseError;
use crate::events::{ActionEvent, ActionKind, ProgressRecord};
use crate::plan::{PlanEntry, Position};
use crate::schedule::SentMarkers;

/// A registered reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable external id (the chat platform's user id).
    pub id: i64,
    pub username: Option<String>,
    pub timezone: String,
    /// Next not-yet-completed plan position.
    pub pointer: Position,
    pub last_daily_sent: Option<NaiveDate>,
    pub last_nudge_sent: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn markers(&self) -> SentMarkers {
        SentMarkers {
            last_daily_sent: self.last_daily_sent,
            last_nudge_sent: self.last_nudge_sent,
        }
    }
}

/// Result of a store write that may carry an interaction claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardedWrite {
    Applied,
    /// The claim was already taken. Nothing was written.
    AlreadyClaimed,
    /// The break window is full. The claim, if any, is kept.
    OverBudget,
}

/// Persistence for users, the event log, progress history, claimed
/// interactions, and plan entries.
///
/// Multi-record writes (`record_read`, `record_break`, `record_nudge_sent`)
/// are atomic: either every record lands or none does. When those writes
/// carry a claim id, the claim commits or rolls back with them.
/// `claim_interaction` is a single check-and-insert.
pub trait Store: Send + Sync {
    /// Insert `user` if its id is unknown, otherwise refresh the username only.
    /// Returns the stored row.
    fn upsert_user(&self, user: &User) -> Result<User, DatabaseError>;

    fn get_user(&self, user_id: i64) -> Result<Option<User>, DatabaseError>;

    fn list_users(&self) -> Result<Vec<User>, DatabaseError>;

    fn set_timezone(&self, user_id: i64, timezone: &str) -> Result<(), DatabaseError>;

    fn append_event(&self, event: &ActionEvent) -> Result<(), DatabaseError>;

    fn append_progress(&self, record: &ProgressRecord) -> Result<(), DatabaseError>;

    /// Events of `action` for `user_id`, oldest first, optionally only those
    /// with `at >= since`.
    fn query_events(
        &self,
        user_id: i64,
        action: ActionKind,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ActionEvent>, DatabaseError>;

    /// Most recent progress record by completion time.
    fn latest_progress(&self, user_id: i64) -> Result<Option<ProgressRecord>, DatabaseError>;

    fn count_progress(&self, user_id: i64) -> Result<u64, DatabaseError>;

    /// Append the progress record and the read event and move the pointer to
    /// `next`, all together. With `claim`, the interaction id is claimed in
    /// the same write; a taken id yields `AlreadyClaimed`.
    fn record_read(
        &self,
        record: &ProgressRecord,
        next: Position,
        claim: Option<&str>,
    ) -> Result<GuardedWrite, DatabaseError>;

    /// Append the break `event` unless the user already has `cap` breaks at
    /// or after `since`. The count and the append happen in one write, as
    /// does the optional claim.
    fn record_break(
        &self,
        event: &ActionEvent,
        since: DateTime<Utc>,
        cap: u32,
        claim: Option<&str>,
    ) -> Result<GuardedWrite, DatabaseError>;

    fn mark_daily_sent(&self, user_id: i64, date: NaiveDate) -> Result<(), DatabaseError>;

    /// Set the nudge marker and append a nudge event, together.
    fn record_nudge_sent(
        &self,
        user_id: i64,
        date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<(), DatabaseError>;

    /// Atomically claim `interaction_id`. `true` if this call claimed it,
    /// `false` if it was already claimed.
    fn claim_interaction(
        &self,
        interaction_id: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, DatabaseError>;

    /// Drop claims made before `before`. Returns the number removed.
    fn prune_interactions(&self, before: DateTime<Utc>) -> Result<usize, DatabaseError>;

    fn plan_entry(&self, position: Position) -> Result<Option<PlanEntry>, DatabaseError>;

    /// Insert or replace entries keyed on (month, day).
    fn upsert_plan_entries(&self, entries: &[PlanEntry]) -> Result<usize, DatabaseError>;

    fn plan_len(&self) -> Result<usize, DatabaseError>;
}

/// Returns `~/.config/dailyread[-dev]/` based on DAILYREAD_ENV.
///
/// Set DAILYREAD_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("DAILYREAD_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("dailyread-dev")
    } else {
        base_dir.join("dailyread")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
