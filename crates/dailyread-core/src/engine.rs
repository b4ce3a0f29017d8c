//! Progress engine: the orchestrator behind every user-facing operation.
//!
//! The engine composes the plan grid, streak calculator, break budget,
//! idempotency guard and send scheduler over a [`Store`]. It owns a
//! [`Clock`] and passes its reading into each component, so time-dependent
//! behavior is deterministic under a [`FixedClock`](crate::clock::FixedClock).
//!
//! Per plan position a user moves `pending -> completed` via
//! [`ProgressEngine::apply_read`] (pointer advances) or stays `pending` via
//! [`ProgressEngine::apply_break`]. Previews never change state.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::breaks::BreakBudget;
use crate::clock::{localize, parse_timezone, Clock, SystemClock};
use crate::error::{ConfigError, CoreError, DatabaseError, Result};
use crate::events::{ActionEvent, ActionKind, ProgressRecord};
use crate::idempotency::IdempotencyGuard;
use crate::interaction::Interaction;
use crate::plan::{PlanBounds, PlanEntry, Position};
use crate::schedule::SendScheduler;
use crate::storage::{Config, GuardedWrite, Store, User};
use crate::streak::StreakCalculator;

/// Aggregated progress figures shown on cards and in `/stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub streak: u32,
    pub breaks_used: u32,
    pub breaks_left: u32,
    pub break_cap: u32,
    pub current: Position,
    pub next: Position,
    pub total_completed: u64,
    pub last_completed: Option<Position>,
}

/// Outcome of a break request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BreakDecision {
    Recorded(Stats),
    /// Budget exhausted; no break was written.
    Rejected {
        breaks_used: u32,
        cap: u32,
        next_release: Option<DateTime<Utc>>,
    },
}

/// Outcome of an inbound card interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InteractionOutcome {
    Read { stats: Stats },
    Break { decision: BreakDecision },
    Preview { entry: Option<PlanEntry> },
    /// The interaction id was already applied. Acknowledge as success.
    Duplicate,
}

/// A daily card ready to hand to a messenger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCard {
    pub entry: PlanEntry,
    pub stats: Stats,
}

pub struct ProgressEngine<S: Store, C: Clock = SystemClock> {
    store: S,
    clock: C,
    bounds: PlanBounds,
    start: Position,
    budget: BreakBudget,
    scheduler: SendScheduler,
    default_timezone: String,
    claim_retention_days: Option<u32>,
}

impl<S: Store, C: Clock> ProgressEngine<S, C> {
    /// Build an engine from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn new(store: S, clock: C, config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            store,
            clock,
            bounds: config.plan_bounds(),
            start: config.start_position(),
            budget: config.break_budget(),
            scheduler: config.send_scheduler()?,
            default_timezone: config.default_timezone.clone(),
            claim_retention_days: config.interactions.retention_days,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn bounds(&self) -> PlanBounds {
        self.bounds
    }

    pub fn budget(&self) -> BreakBudget {
        self.budget
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Timezone of `user`. Stored names are validated on write; a name that
    /// no longer parses falls back to the configured default.
    pub fn timezone_of(&self, user: &User) -> Tz {
        parse_timezone(&user.timezone).unwrap_or_else(|_| {
            warn!(user_id = user.id, timezone = %user.timezone, "stored timezone invalid, using default");
            parse_timezone(&self.default_timezone).unwrap_or(chrono_tz::UTC)
        })
    }

    pub fn user(&self, user_id: i64) -> Result<User> {
        self.store
            .get_user(user_id)?
            .ok_or(CoreError::UserNotFound { user_id })
    }

    pub fn users(&self) -> Result<Vec<User>> {
        Ok(self.store.list_users()?)
    }

    /// Register a user, or refresh the profile of an existing one.
    ///
    /// New users start at the configured start position. An existing user's
    /// pointer and history are untouched. `timezone`, when given, is applied
    /// either way.
    pub fn register(&self, user_id: i64, username: Option<&str>, timezone: Option<&str>) -> Result<User> {
        let timezone = match timezone {
            Some(name) => Some(parse_timezone(name)?.name().to_string()),
            None => None,
        };

        let candidate = User {
            id: user_id,
            username: username.map(str::to_string),
            timezone: timezone
                .clone()
                .unwrap_or_else(|| self.default_timezone.clone()),
            pointer: self.start,
            last_daily_sent: None,
            last_nudge_sent: None,
            created_at: self.clock.now(),
        };
        let mut user = self.store.upsert_user(&candidate)?;

        if let Some(tz) = timezone {
            if user.timezone != tz {
                self.store.set_timezone(user_id, &tz)?;
                user.timezone = tz;
            }
        }

        info!(user_id, pointer = %user.pointer, timezone = %user.timezone, "user registered");
        Ok(user)
    }

    pub fn set_timezone(&self, user_id: i64, timezone: &str) -> Result<User> {
        let tz = parse_timezone(timezone)?;
        let mut user = self.user(user_id)?;
        self.store.set_timezone(user_id, tz.name())?;
        user.timezone = tz.name().to_string();
        info!(user_id, timezone = %user.timezone, "timezone updated");
        Ok(user)
    }

    /// Plan entry at the user's pointer. `None` if the plan has no entry there.
    pub fn current(&self, user_id: i64) -> Result<Option<PlanEntry>> {
        let user = self.user(user_id)?;
        Ok(self.store.plan_entry(user.pointer)?)
    }

    /// Plan entry one step past the pointer, without moving it.
    pub fn preview_next(&self, user_id: i64) -> Result<Option<PlanEntry>> {
        let user = self.user(user_id)?;
        Ok(self.store.plan_entry(self.bounds.advance(user.pointer))?)
    }

    /// Record a completed reading of `position` and move the pointer past it.
    pub fn apply_read(&self, user_id: i64, position: Position) -> Result<Stats> {
        self.read(user_id, position, None)?
            .ok_or_else(|| unclaimed_write_skipped("read"))
    }

    /// `None` if `claim` was already taken; nothing is written then.
    fn read(&self, user_id: i64, position: Position, claim: Option<&str>) -> Result<Option<Stats>> {
        let user = self.user(user_id)?;
        let position = self.bounds.check(position)?;
        let now = self.clock.now();
        let next = self.bounds.advance(position);

        if position != user.pointer {
            debug!(user_id, %position, pointer = %user.pointer, "read for a position other than the pointer");
        }

        let record = ProgressRecord {
            user_id,
            position,
            completed_at: now,
        };
        if self.store.record_read(&record, next, claim)? == GuardedWrite::AlreadyClaimed {
            return Ok(None);
        }
        info!(user_id, %position, %next, "reading recorded");

        let user = User {
            pointer: next,
            ..user
        };
        self.stats_at(&user, now).map(Some)
    }

    /// Take a break on `position` if budget remains. The pointer never moves.
    pub fn apply_break(&self, user_id: i64, position: Position) -> Result<BreakDecision> {
        self.take_break(user_id, position, None)?
            .ok_or_else(|| unclaimed_write_skipped("break"))
    }

    /// `None` if `claim` was already taken. The budget re-count and the
    /// append are a single store write.
    fn take_break(
        &self,
        user_id: i64,
        position: Position,
        claim: Option<&str>,
    ) -> Result<Option<BreakDecision>> {
        let user = self.user(user_id)?;
        let position = self.bounds.check(position)?;
        let now = self.clock.now();
        let since = self.budget.window_start(now);

        let event = ActionEvent::break_taken(user_id, position, now);
        match self.store.record_break(&event, since, self.budget.cap(), claim)? {
            GuardedWrite::AlreadyClaimed => Ok(None),
            GuardedWrite::OverBudget => {
                let breaks = self.store.query_events(user_id, ActionKind::Break, Some(since))?;
                let status = self.budget.status(&breaks, now);
                info!(user_id, used = status.used, cap = status.cap, "break rejected, budget exhausted");
                Ok(Some(BreakDecision::Rejected {
                    breaks_used: status.used,
                    cap: status.cap,
                    next_release: status.next_release,
                }))
            }
            GuardedWrite::Applied => {
                let stats = self.stats_at(&user, now)?;
                info!(user_id, %position, left = stats.breaks_left, "break recorded");
                Ok(Some(BreakDecision::Recorded(stats)))
            }
        }
    }

    pub fn stats(&self, user_id: i64) -> Result<Stats> {
        let user = self.user(user_id)?;
        self.stats_at(&user, self.clock.now())
    }

    fn stats_at(&self, user: &User, now: DateTime<Utc>) -> Result<Stats> {
        let tz = self.timezone_of(user);
        let streaks = StreakCalculator::new(tz);

        let reads = self.store.query_events(user.id, ActionKind::Read, None)?;
        let breaks = self.store.query_events(
            user.id,
            ActionKind::Break,
            Some(self.budget.window_start(now)),
        )?;
        let breaks_used = self.budget.breaks_used(&breaks, now);

        Ok(Stats {
            streak: streaks.streak(&reads, streaks.today(now)),
            breaks_used,
            breaks_left: self.budget.breaks_left(breaks_used),
            break_cap: self.budget.cap(),
            current: user.pointer,
            next: self.bounds.advance(user.pointer),
            total_completed: self.store.count_progress(user.id)?,
            last_completed: self.store.latest_progress(user.id)?.map(|r| r.position),
        })
    }

    /// Decode and apply a card interaction exactly once per `interaction_id`.
    ///
    /// Malformed payloads, unknown users and off-grid positions fail before
    /// anything is written. The id is claimed in the same store write as the
    /// mutation, so a failed write leaves it free for the redelivery. `next`
    /// is read-only and is not claimed.
    pub fn handle_interaction(
        &self,
        interaction_id: &str,
        user_id: i64,
        payload: &str,
    ) -> Result<InteractionOutcome> {
        let interaction: Interaction = payload.parse()?;
        self.user(user_id)?;

        let outcome = match interaction {
            Interaction::Read(pos) => self
                .read(user_id, self.bounds.check(pos)?, Some(interaction_id))?
                .map(|stats| InteractionOutcome::Read { stats }),
            Interaction::Break(pos) => self
                .take_break(user_id, self.bounds.check(pos)?, Some(interaction_id))?
                .map(|decision| InteractionOutcome::Break { decision }),
            Interaction::Next => Some(InteractionOutcome::Preview {
                entry: self.preview_next(user_id)?,
            }),
        };

        Ok(outcome.unwrap_or_else(|| {
            info!(user_id, interaction_id, "duplicate interaction ignored");
            InteractionOutcome::Duplicate
        }))
    }

    /// Drop claimed interaction ids past the configured retention.
    pub fn prune_claims(&self) -> Result<usize> {
        let guard = IdempotencyGuard::new(&self.store).with_retention_days(self.claim_retention_days);
        Ok(guard.prune(self.clock.now())?)
    }

    pub fn should_send_daily(&self, user: &User, now: DateTime<Utc>) -> bool {
        let local = localize(now, &self.timezone_of(user));
        self.scheduler.should_send_daily(user.markers(), local)
    }

    pub fn should_send_nudge(&self, user: &User, now: DateTime<Utc>) -> Result<bool> {
        let tz = self.timezone_of(user);
        let local = localize(now, &tz);
        // Two days back covers any local "today" for any offset.
        let recent = self
            .store
            .query_events(user.id, ActionKind::Read, Some(now - Duration::days(2)))?;
        let read_today = StreakCalculator::new(tz).read_on(&recent, local.date);
        Ok(self.scheduler.should_send_nudge(user.markers(), local, read_today))
    }

    /// Card for the user's current position, or `None` if the plan has no entry there.
    pub fn daily_card(&self, user: &User) -> Result<Option<DailyCard>> {
        let Some(entry) = self.store.plan_entry(user.pointer)? else {
            return Ok(None);
        };
        let stats = self.stats_at(user, self.clock.now())?;
        Ok(Some(DailyCard { entry, stats }))
    }

    pub fn mark_daily_sent(&self, user: &User, now: DateTime<Utc>) -> Result<()> {
        let date = localize(now, &self.timezone_of(user)).date;
        self.store.mark_daily_sent(user.id, date)?;
        Ok(())
    }

    pub fn record_nudge_sent(&self, user: &User, now: DateTime<Utc>) -> Result<()> {
        let date = localize(now, &self.timezone_of(user)).date;
        self.store.record_nudge_sent(user.id, date, now)?;
        Ok(())
    }

    /// Upsert plan entries. Every entry must lie inside the grid.
    pub fn load_plan(&self, entries: &[PlanEntry]) -> Result<usize> {
        for entry in entries {
            self.bounds.check(entry.position())?;
        }
        let count = self.store.upsert_plan_entries(entries)?;
        info!(count, "plan entries upserted");
        Ok(count)
    }
}

fn unclaimed_write_skipped(what: &str) -> CoreError {
    DatabaseError::QueryFailed(format!("{what} without a claim was reported as a duplicate")).into()
}
