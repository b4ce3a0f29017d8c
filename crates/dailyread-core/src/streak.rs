//! Consecutive-day reading streaks.
//!
//! Streaks are recomputed from raw read timestamps on every query. Each
//! timestamp is projected into the user's current timezone, so a later
//! timezone change re-buckets the whole history consistently.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use std::collections::HashSet;

use crate::clock::local_date;
use crate::events::{ActionEvent, ActionKind};

/// Streak calculator bound to one user's timezone.
#[derive(Debug, Clone, Copy)]
pub struct StreakCalculator {
    tz: Tz,
}

impl StreakCalculator {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Distinct local dates that have at least one read.
    pub fn read_dates<'a, I>(&self, events: I) -> HashSet<NaiveDate>
    where
        I: IntoIterator<Item = &'a ActionEvent>,
    {
        events
            .into_iter()
            .filter(|e| e.action == ActionKind::Read)
            .map(|e| local_date(e.at, &self.tz))
            .collect()
    }

    /// Number of consecutive local days ending at `today` with a read.
    ///
    /// Zero when `today` itself has no read. Several reads on one day count once.
    pub fn streak<'a, I>(&self, events: I, today: NaiveDate) -> u32
    where
        I: IntoIterator<Item = &'a ActionEvent>,
    {
        let dates = self.read_dates(events);
        let mut streak = 0;
        let mut day = today;
        while dates.contains(&day) {
            streak += 1;
            day -= Duration::days(1);
        }
        streak
    }

    /// Whether any read falls on local date `date`.
    pub fn read_on<'a, I>(&self, events: I, date: NaiveDate) -> bool
    where
        I: IntoIterator<Item = &'a ActionEvent>,
    {
        events
            .into_iter()
            .any(|e| e.action == ActionKind::Read && local_date(e.at, &self.tz) == date)
    }

    /// Local date of `now` in this calculator's timezone.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        local_date(now, &self.tz)
    }
}
