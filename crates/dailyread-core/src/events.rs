use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::plan::Position;

/// Kinds of user action recorded in the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Read,
    Break,
    Nudge,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Read => "read",
            ActionKind::Break => "break",
            ActionKind::Nudge => "nudge",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(ActionKind::Read),
            "break" => Ok(ActionKind::Break),
            "nudge" => Ok(ActionKind::Nudge),
            other => Err(format!("unknown action '{other}'")),
        }
    }
}

/// Append-only fact: user performed `action` at `at`.
///
/// Nudges carry no plan position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEvent {
    pub user_id: i64,
    pub action: ActionKind,
    pub position: Option<Position>,
    pub at: DateTime<Utc>,
}

impl ActionEvent {
    pub fn read(user_id: i64, position: Position, at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            action: ActionKind::Read,
            position: Some(position),
            at,
        }
    }

    pub fn break_taken(user_id: i64, position: Position, at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            action: ActionKind::Break,
            position: Some(position),
            at,
        }
    }

    pub fn nudge(user_id: i64, at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            action: ActionKind::Nudge,
            position: None,
            at,
        }
    }
}

/// Append-only fact: user completed plan position `position` at `completed_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub user_id: i64,
    pub position: Position,
    pub completed_at: DateTime<Utc>,
}
