//! At-most-once application of inbound interactions.
//!
//! The chat platform may redeliver a callback under retry or timeout. Every
//! mutating interaction claims its identifier; only the caller that wins the
//! claim applies the mutation. The claim is a single atomic store operation,
//! never a lookup followed by an insert.
//!
//! Reads and breaks pass their id to [`Store::record_read`] and
//! [`Store::record_break`], which claim inside the same write, so a failed
//! write leaves the id free. [`IdempotencyGuard::claim`] is the standalone
//! form for side effects that are not store writes.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::error::DatabaseError;
use crate::storage::Store;

/// Result of claiming an interaction identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// First claim: proceed, exactly once.
    Accepted,
    /// Seen before: do nothing and acknowledge as success.
    AlreadyClaimed,
}

impl ClaimOutcome {
    pub fn is_accepted(self) -> bool {
        self == ClaimOutcome::Accepted
    }
}

/// Claims interaction identifiers against a [`Store`].
pub struct IdempotencyGuard<'a, S: Store + ?Sized> {
    store: &'a S,
    retention: Option<Duration>,
}

impl<'a, S: Store + ?Sized> IdempotencyGuard<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            retention: None,
        }
    }

    /// Keep claims for `days` days; older claims may be pruned.
    pub fn with_retention_days(mut self, days: Option<u32>) -> Self {
        self.retention = days.map(|d| Duration::days(i64::from(d)));
        self
    }

    pub fn claim(&self, interaction_id: &str, now: DateTime<Utc>) -> Result<ClaimOutcome, DatabaseError> {
        if self.store.claim_interaction(interaction_id, now)? {
            Ok(ClaimOutcome::Accepted)
        } else {
            debug!(interaction_id, "interaction already claimed");
            Ok(ClaimOutcome::AlreadyClaimed)
        }
    }

    /// Drop claims older than the retention period. No-op without one.
    pub fn prune(&self, now: DateTime<Utc>) -> Result<usize, DatabaseError> {
        match self.retention {
            Some(retention) => {
                let removed = self.store.prune_interactions(now - retention)?;
                debug!(removed, "pruned claimed interactions");
                Ok(removed)
            }
            None => Ok(0),
        }
    }
}
