//! Rolling-window break budget.
//!
//! A user may take at most `cap` breaks in any trailing window (30 days by
//! default). The window is anchored to the query instant, not to calendar
//! boundaries, so capacity frees up one break at a time as old breaks age out.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::events::{ActionEvent, ActionKind};

/// Snapshot of a user's break budget at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub used: u32,
    pub left: u32,
    pub cap: u32,
    /// When the oldest counted break leaves the window, if any are counted.
    pub next_release: Option<DateTime<Utc>>,
}

/// Break budget policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakBudget {
    cap: u32,
    window: Duration,
}

impl Default for BreakBudget {
    fn default() -> Self {
        Self::new(5, 30)
    }
}

impl BreakBudget {
    pub fn new(cap: u32, window_days: u32) -> Self {
        Self {
            cap,
            window: Duration::days(i64::from(window_days)),
        }
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Earliest timestamp still inside the window. Inclusive.
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.window
    }

    /// Count of breaks with `window_start(now) <= at`.
    pub fn breaks_used<'a, I>(&self, events: I, now: DateTime<Utc>) -> u32
    where
        I: IntoIterator<Item = &'a ActionEvent>,
    {
        let since = self.window_start(now);
        let count = events
            .into_iter()
            .filter(|e| e.action == ActionKind::Break && e.at >= since)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    pub fn breaks_left(&self, used: u32) -> u32 {
        self.cap.saturating_sub(used)
    }

    pub fn can_take_break<'a, I>(&self, events: I, now: DateTime<Utc>) -> bool
    where
        I: IntoIterator<Item = &'a ActionEvent>,
    {
        self.breaks_left(self.breaks_used(events, now)) > 0
    }

    /// Full budget snapshot.
    pub fn status<'a, I>(&self, events: I, now: DateTime<Utc>) -> BudgetStatus
    where
        I: IntoIterator<Item = &'a ActionEvent> + Clone,
    {
        let used = self.breaks_used(events.clone(), now);
        let since = self.window_start(now);
        let next_release = events
            .into_iter()
            .filter(|e| e.action == ActionKind::Break && e.at >= since)
            .map(|e| e.at)
            .min()
            .map(|oldest| oldest + self.window + Duration::seconds(1));

        BudgetStatus {
            used,
            left: self.breaks_left(used),
            cap: self.cap,
            next_release,
        }
    }
}
