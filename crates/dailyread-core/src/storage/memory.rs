//! In-memory [`Store`] backed by a single mutex.
//!
//! Every operation holds the lock for its full duration, which makes the
//! multi-record writes and the interaction claim atomic.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use super::{GuardedWrite, Store, User};
use crate::error::DatabaseError;
use crate::events::{ActionEvent, ActionKind, ProgressRecord};
use crate::plan::{PlanEntry, Position};

#[derive(Debug, Default)]
struct Inner {
    users: BTreeMap<i64, User>,
    events: Vec<ActionEvent>,
    progress: Vec<ProgressRecord>,
    claims: HashMap<String, DateTime<Utc>>,
    plan: BTreeMap<Position, PlanEntry>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl Inner {
    fn claim(&mut self, interaction_id: &str, at: DateTime<Utc>) -> bool {
        if self.claims.contains_key(interaction_id) {
            return false;
        }
        self.claims.insert(interaction_id.to_string(), at);
        true
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, DatabaseError> {
        self.inner.lock().map_err(|_| DatabaseError::Locked)
    }
}

impl Store for MemoryStore {
    fn upsert_user(&self, user: &User) -> Result<User, DatabaseError> {
        let mut inner = self.lock()?;
        let stored = inner
            .users
            .entry(user.id)
            .and_modify(|existing| existing.username = user.username.clone())
            .or_insert_with(|| user.clone());
        Ok(stored.clone())
    }

    fn get_user(&self, user_id: i64) -> Result<Option<User>, DatabaseError> {
        Ok(self.lock()?.users.get(&user_id).cloned())
    }

    fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        Ok(self.lock()?.users.values().cloned().collect())
    }

    fn set_timezone(&self, user_id: i64, timezone: &str) -> Result<(), DatabaseError> {
        if let Some(user) = self.lock()?.users.get_mut(&user_id) {
            user.timezone = timezone.to_string();
        }
        Ok(())
    }

    fn append_event(&self, event: &ActionEvent) -> Result<(), DatabaseError> {
        self.lock()?.events.push(event.clone());
        Ok(())
    }

    fn append_progress(&self, record: &ProgressRecord) -> Result<(), DatabaseError> {
        self.lock()?.progress.push(record.clone());
        Ok(())
    }

    fn query_events(
        &self,
        user_id: i64,
        action: ActionKind,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ActionEvent>, DatabaseError> {
        let inner = self.lock()?;
        let mut events: Vec<ActionEvent> = inner
            .events
            .iter()
            .filter(|e| e.user_id == user_id && e.action == action)
            .filter(|e| since.map_or(true, |s| e.at >= s))
            .cloned()
            .collect();
        events.sort_by_key(|e| e.at);
        Ok(events)
    }

    fn latest_progress(&self, user_id: i64) -> Result<Option<ProgressRecord>, DatabaseError> {
        // Ties on completion time resolve to the later insert.
        Ok(self
            .lock()?
            .progress
            .iter()
            .enumerate()
            .filter(|(_, r)| r.user_id == user_id)
            .max_by_key(|(i, r)| (r.completed_at, *i))
            .map(|(_, r)| r.clone()))
    }

    fn count_progress(&self, user_id: i64) -> Result<u64, DatabaseError> {
        let count = self
            .lock()?
            .progress
            .iter()
            .filter(|r| r.user_id == user_id)
            .count();
        Ok(count as u64)
    }

    fn record_read(
        &self,
        record: &ProgressRecord,
        next: Position,
        claim: Option<&str>,
    ) -> Result<GuardedWrite, DatabaseError> {
        let mut inner = self.lock()?;
        // A failed write must leave the id unclaimed.
        if !inner.users.contains_key(&record.user_id) {
            return Err(DatabaseError::QueryFailed(format!(
                "no user {} to record read for",
                record.user_id
            )));
        }
        if let Some(id) = claim {
            if !inner.claim(id, record.completed_at) {
                return Ok(GuardedWrite::AlreadyClaimed);
            }
        }
        if let Some(user) = inner.users.get_mut(&record.user_id) {
            user.pointer = next;
        }
        inner.progress.push(record.clone());
        inner.events.push(ActionEvent::read(
            record.user_id,
            record.position,
            record.completed_at,
        ));
        Ok(GuardedWrite::Applied)
    }

    fn record_break(
        &self,
        event: &ActionEvent,
        since: DateTime<Utc>,
        cap: u32,
        claim: Option<&str>,
    ) -> Result<GuardedWrite, DatabaseError> {
        let mut inner = self.lock()?;
        if !inner.users.contains_key(&event.user_id) {
            return Err(DatabaseError::QueryFailed(format!(
                "no user {} to record break for",
                event.user_id
            )));
        }
        if let Some(id) = claim {
            if !inner.claim(id, event.at) {
                return Ok(GuardedWrite::AlreadyClaimed);
            }
        }
        let used = inner
            .events
            .iter()
            .filter(|e| e.user_id == event.user_id && e.action == ActionKind::Break)
            .filter(|e| e.at >= since)
            .count();
        if used >= cap as usize {
            return Ok(GuardedWrite::OverBudget);
        }
        inner.events.push(event.clone());
        Ok(GuardedWrite::Applied)
    }

    fn mark_daily_sent(&self, user_id: i64, date: NaiveDate) -> Result<(), DatabaseError> {
        if let Some(user) = self.lock()?.users.get_mut(&user_id) {
            user.last_daily_sent = Some(date);
        }
        Ok(())
    }

    fn record_nudge_sent(
        &self,
        user_id: i64,
        date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let mut inner = self.lock()?;
        if let Some(user) = inner.users.get_mut(&user_id) {
            user.last_nudge_sent = Some(date);
            inner.events.push(ActionEvent::nudge(user_id, at));
        }
        Ok(())
    }

    fn claim_interaction(
        &self,
        interaction_id: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, DatabaseError> {
        Ok(self.lock()?.claim(interaction_id, at))
    }

    fn prune_interactions(&self, before: DateTime<Utc>) -> Result<usize, DatabaseError> {
        let mut inner = self.lock()?;
        let len = inner.claims.len();
        inner.claims.retain(|_, claimed_at| *claimed_at >= before);
        Ok(len - inner.claims.len())
    }

    fn plan_entry(&self, position: Position) -> Result<Option<PlanEntry>, DatabaseError> {
        Ok(self.lock()?.plan.get(&position).cloned())
    }

    fn upsert_plan_entries(&self, entries: &[PlanEntry]) -> Result<usize, DatabaseError> {
        let mut inner = self.lock()?;
        for entry in entries {
            inner.plan.insert(entry.position(), entry.clone());
        }
        Ok(entries.len())
    }

    fn plan_len(&self) -> Result<usize, DatabaseError> {
        Ok(self.lock()?.plan.len())
    }
}
