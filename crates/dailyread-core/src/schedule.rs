//! Send-eligibility decisions for the daily card and the evening nudge.
//!
//! Sweeps are triggered by an external caller at coarse, possibly irregular
//! intervals. A send is eligible whenever the user's local time falls within
//! `tolerance` of the target, and at most once per local calendar day thanks
//! to the per-user "sent today" markers.

use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::clock::LocalNow;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// A target local time with a symmetric tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendWindow {
    pub target: NaiveTime,
    pub tolerance_minutes: u32,
}

impl SendWindow {
    pub fn new(target: NaiveTime, tolerance_minutes: u32) -> Self {
        Self {
            target,
            tolerance_minutes,
        }
    }

    /// Minutes between `time` and the target, measured around the clock so
    /// that 23:50 is ten minutes from 00:00.
    pub fn distance_minutes(&self, time: NaiveTime) -> i64 {
        let a = i64::from(time.hour() * 60 + time.minute());
        let b = i64::from(self.target.hour() * 60 + self.target.minute());
        let diff = (a - b).rem_euclid(MINUTES_PER_DAY);
        diff.min(MINUTES_PER_DAY - diff)
    }

    /// Inclusive at both edges.
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.distance_minutes(time) <= i64::from(self.tolerance_minutes)
    }

    pub fn tolerance(&self) -> Duration {
        Duration::minutes(i64::from(self.tolerance_minutes))
    }
}

/// Per-user markers recording which sends already happened, by local date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentMarkers {
    pub last_daily_sent: Option<NaiveDate>,
    pub last_nudge_sent: Option<NaiveDate>,
}

/// Decides daily-card and nudge eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendScheduler {
    daily: SendWindow,
    nudge: SendWindow,
}

impl Default for SendScheduler {
    fn default() -> Self {
        Self {
            daily: SendWindow::new(NaiveTime::from_hms_opt(7, 0, 0).unwrap_or(NaiveTime::MIN), 60),
            nudge: SendWindow::new(NaiveTime::from_hms_opt(20, 0, 0).unwrap_or(NaiveTime::MIN), 60),
        }
    }
}

impl SendScheduler {
    pub fn new(daily: SendWindow, nudge: SendWindow) -> Self {
        Self { daily, nudge }
    }

    pub fn daily_window(&self) -> SendWindow {
        self.daily
    }

    pub fn nudge_window(&self) -> SendWindow {
        self.nudge
    }

    /// Inside the daily window and no daily card recorded for today.
    pub fn should_send_daily(&self, markers: SentMarkers, local: LocalNow) -> bool {
        self.daily.contains(local.time) && markers.last_daily_sent != Some(local.date)
    }

    /// Inside the nudge window, nothing read today, and no nudge recorded for today.
    pub fn should_send_nudge(&self, markers: SentMarkers, local: LocalNow, read_today: bool) -> bool {
        self.nudge.contains(local.time)
            && !read_today
            && markers.last_nudge_sent != Some(local.date)
    }
}
