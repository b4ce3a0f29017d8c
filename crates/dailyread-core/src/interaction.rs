//! Inline-button payloads attached to a reading card.
//!
//! Wire format: `read|<month>|<day>`, `break|<month>|<day>`, or `next`.

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::plan::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// Mark the given position as read.
    Read(Position),
    /// Take a break on the given position.
    Break(Position),
    /// Show the position after the current one. Read-only.
    Next,
}

impl Interaction {
    /// Whether applying this interaction mutates state and so must be claimed.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Interaction::Next)
    }
}

fn malformed(payload: &str, message: impl Into<String>) -> ValidationError {
    ValidationError::MalformedPayload {
        payload: payload.to_string(),
        message: message.into(),
    }
}

fn parse_component(payload: &str, name: &str, raw: Option<&str>) -> Result<u32, ValidationError> {
    let raw = raw.ok_or_else(|| malformed(payload, format!("missing {name}")))?;
    raw.trim()
        .parse::<u32>()
        .map_err(|_| malformed(payload, format!("{name} '{raw}' is not a number")))
}

impl FromStr for Interaction {
    type Err = ValidationError;

    fn from_str(payload: &str) -> Result<Self, Self::Err> {
        let mut parts = payload.split('|');
        let action = parts.next().unwrap_or_default().trim();

        let interaction = match action {
            "next" => Interaction::Next,
            "read" | "break" => {
                let month = parse_component(payload, "month", parts.next())?;
                let day = parse_component(payload, "day", parts.next())?;
                let pos = Position::new(month, day);
                if action == "read" {
                    Interaction::Read(pos)
                } else {
                    Interaction::Break(pos)
                }
            }
            "" => return Err(malformed(payload, "empty action")),
            other => return Err(malformed(payload, format!("unknown action '{other}'"))),
        };

        if parts.next().is_some() {
            return Err(malformed(payload, "trailing fields"));
        }
        Ok(interaction)
    }
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interaction::Read(p) => write!(f, "read|{}|{}", p.month, p.day),
            Interaction::Break(p) => write!(f, "break|{}|{}", p.month, p.day),
            Interaction::Next => f.write_str("next"),
        }
    }
}
