//! # Dailyread Core Library
//!
//! Progress and engagement engine for a fixed reading plan laid out as a
//! month × day grid. The library owns all business rules; the
//! `dailyread-cli` binary is a thin shell over it.
//!
//! ## Architecture
//!
//! - **Plan grid**: [`PlanBounds`] advances a [`Position`] and wraps at the cycle end
//! - **Streaks**: [`StreakCalculator`] buckets reads by the user's local date
//! - **Breaks**: [`BreakBudget`] caps skips over a rolling window
//! - **Idempotency**: [`IdempotencyGuard`] applies each interaction at most once
//! - **Scheduling**: [`SendScheduler`] decides daily-card and nudge eligibility
//! - **Engine**: [`ProgressEngine`] composes the above over a [`Store`]
//! - **Sweeps**: [`Sweeper`] runs the scheduled sends through a [`Messenger`]
//!
//! Storage is SQLite ([`Database`]) or in-memory ([`MemoryStore`]); configuration
//! is TOML ([`Config`]).

pub mod breaks;
pub mod clock;
pub mod delivery;
pub mod engine;
pub mod error;
pub mod events;
pub mod idempotency;
pub mod interaction;
pub mod plan;
pub mod render;
pub mod schedule;
pub mod storage;
pub mod streak;
pub mod sweep;

pub use breaks::{BreakBudget, BudgetStatus};
pub use clock::{Clock, FixedClock, LocalNow, SystemClock};
pub use delivery::{Button, HttpMessenger, LogMessenger, Message, Messenger};
pub use engine::{BreakDecision, DailyCard, InteractionOutcome, ProgressEngine, Stats};
pub use error::{ConfigError, CoreError, DatabaseError, DeliveryError, ValidationError};
pub use events::{ActionEvent, ActionKind, ProgressRecord};
pub use idempotency::{ClaimOutcome, IdempotencyGuard};
pub use interaction::Interaction;
pub use plan::{PlanBounds, PlanEntry, Position, Reading};
pub use schedule::{SendScheduler, SendWindow, SentMarkers};
pub use storage::{Config, Database, GuardedWrite, MemoryStore, Store, User};
pub use streak::StreakCalculator;
pub use sweep::{verify_cron_secret, SweepReport, Sweeper};
