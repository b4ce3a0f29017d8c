//! SQLite-backed [`Store`].
//!
//! Provides persistent storage for:
//! - Registered users and their plan pointer
//! - The append-only event log and progress history
//! - Claimed interaction ids (unique-keyed, so a claim is one insert)
//! - Plan entries keyed on (month, day)
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings so that text
//! comparison orders them chronologically.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::{migrations, GuardedWrite, Store, User};
use crate::error::DatabaseError;
use crate::events::{ActionEvent, ActionKind, ProgressRecord};
use crate::plan::{PlanEntry, Position, Reading};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn ts(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(table: &'static str, raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::CorruptRow {
            table,
            message: format!("bad timestamp '{raw}': {e}"),
        })
}

fn parse_date(table: &'static str, raw: Option<String>) -> Result<Option<NaiveDate>, DatabaseError> {
    raw.map(|s| {
        NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|e| DatabaseError::CorruptRow {
            table,
            message: format!("bad date '{s}': {e}"),
        })
    })
    .transpose()
}

/// Raw `users` row before timestamp/date decoding.
struct UserRow {
    id: i64,
    username: Option<String>,
    timezone: String,
    month: u32,
    day: u32,
    last_daily_sent: Option<String>,
    last_nudge_sent: Option<String>,
    created_at: String,
}

impl UserRow {
    const COLUMNS: &'static str = "id, username, timezone, current_month, current_day, \
                                   last_daily_sent, last_nudge_sent, created_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            timezone: row.get(2)?,
            month: row.get(3)?,
            day: row.get(4)?,
            last_daily_sent: row.get(5)?,
            last_nudge_sent: row.get(6)?,
            created_at: row.get(7)?,
        })
    }

    fn decode(self) -> Result<User, DatabaseError> {
        Ok(User {
            id: self.id,
            username: self.username,
            timezone: self.timezone,
            pointer: Position::new(self.month, self.day),
            last_daily_sent: parse_date("users", self.last_daily_sent)?,
            last_nudge_sent: parse_date("users", self.last_nudge_sent)?,
            created_at: parse_ts("users", &self.created_at)?,
        })
    }
}

/// SQLite database for reading progress.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (creating if needed) the database at `path` and migrate it.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::init(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, DatabaseError> {
        conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")?;
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::Locked)
    }
}

fn insert_event(conn: &Connection, event: &ActionEvent) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO user_events (user_id, action, plan_month, plan_day, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            event.user_id,
            event.action.as_str(),
            event.position.map(|p| p.month),
            event.position.map(|p| p.day),
            ts(event.at),
        ],
    )
}

/// `true` if this insert took the id.
fn insert_claim(conn: &Connection, interaction_id: &str, at: DateTime<Utc>) -> rusqlite::Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO processed_interactions (interaction_id, processed_at)
         VALUES (?1, ?2)",
        params![interaction_id, ts(at)],
    )?;
    Ok(inserted == 1)
}

fn insert_progress(conn: &Connection, record: &ProgressRecord) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO user_progress (user_id, month, day, completed_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            record.user_id,
            record.position.month,
            record.position.day,
            ts(record.completed_at),
        ],
    )
}

impl Store for Database {
    fn upsert_user(&self, user: &User) -> Result<User, DatabaseError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO users (id, username, timezone, current_month, current_day, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET username = excluded.username",
            params![
                user.id,
                user.username,
                user.timezone,
                user.pointer.month,
                user.pointer.day,
                ts(user.created_at),
            ],
        )?;
        let row = tx.query_row(
            &format!("SELECT {} FROM users WHERE id = ?1", UserRow::COLUMNS),
            params![user.id],
            UserRow::from_row,
        )?;
        tx.commit()?;
        row.decode()
    }

    fn get_user(&self, user_id: i64) -> Result<Option<User>, DatabaseError> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?1", UserRow::COLUMNS),
                params![user_id],
                UserRow::from_row,
            )
            .optional()?;
        row.map(UserRow::decode).transpose()
    }

    fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users ORDER BY id",
            UserRow::COLUMNS
        ))?;
        let rows = stmt
            .query_map([], UserRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(UserRow::decode).collect()
    }

    fn set_timezone(&self, user_id: i64, timezone: &str) -> Result<(), DatabaseError> {
        self.conn()?.execute(
            "UPDATE users SET timezone = ?1 WHERE id = ?2",
            params![timezone, user_id],
        )?;
        Ok(())
    }

    fn append_event(&self, event: &ActionEvent) -> Result<(), DatabaseError> {
        let conn = self.conn()?;
        insert_event(&conn, event)?;
        Ok(())
    }

    fn append_progress(&self, record: &ProgressRecord) -> Result<(), DatabaseError> {
        let conn = self.conn()?;
        insert_progress(&conn, record)?;
        Ok(())
    }

    fn query_events(
        &self,
        user_id: i64,
        action: ActionKind,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ActionEvent>, DatabaseError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT plan_month, plan_day, created_at
             FROM user_events
             WHERE user_id = ?1 AND action = ?2 AND (?3 IS NULL OR created_at >= ?3)
             ORDER BY created_at, id",
        )?;
        let rows = stmt
            .query_map(
                params![user_id, action.as_str(), since.map(ts)],
                |row| {
                    Ok((
                        row.get::<_, Option<u32>>(0)?,
                        row.get::<_, Option<u32>>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(month, day, at)| {
                Ok(ActionEvent {
                    user_id,
                    action,
                    position: month.zip(day).map(|(m, d)| Position::new(m, d)),
                    at: parse_ts("user_events", &at)?,
                })
            })
            .collect()
    }

    fn latest_progress(&self, user_id: i64) -> Result<Option<ProgressRecord>, DatabaseError> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT month, day, completed_at FROM user_progress
                 WHERE user_id = ?1
                 ORDER BY completed_at DESC, id DESC
                 LIMIT 1",
                params![user_id],
                |row| {
                    Ok((
                        row.get::<_, u32>(0)?,
                        row.get::<_, u32>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(month, day, at)| {
            Ok(ProgressRecord {
                user_id,
                position: Position::new(month, day),
                completed_at: parse_ts("user_progress", &at)?,
            })
        })
        .transpose()
    }

    fn count_progress(&self, user_id: i64) -> Result<u64, DatabaseError> {
        let count = self.conn()?.query_row(
            "SELECT COUNT(*) FROM user_progress WHERE user_id = ?1",
            params![user_id],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    fn record_read(
        &self,
        record: &ProgressRecord,
        next: Position,
        claim: Option<&str>,
    ) -> Result<GuardedWrite, DatabaseError> {
        let mut conn = self.conn()?;
        // Immediate: other handles on the same file wait on busy_timeout
        // instead of failing the read-to-write lock upgrade.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if let Some(id) = claim {
            if !insert_claim(&tx, id, record.completed_at)? {
                return Ok(GuardedWrite::AlreadyClaimed);
            }
        }
        let updated = tx.execute(
            "UPDATE users SET current_month = ?1, current_day = ?2 WHERE id = ?3",
            params![next.month, next.day, record.user_id],
        )?;
        if updated == 0 {
            return Err(DatabaseError::QueryFailed(format!(
                "no user {} to record read for",
                record.user_id
            )));
        }
        insert_progress(&tx, record)?;
        insert_event(
            &tx,
            &ActionEvent::read(record.user_id, record.position, record.completed_at),
        )?;
        tx.commit()?;
        Ok(GuardedWrite::Applied)
    }

    fn record_break(
        &self,
        event: &ActionEvent,
        since: DateTime<Utc>,
        cap: u32,
        claim: Option<&str>,
    ) -> Result<GuardedWrite, DatabaseError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if let Some(id) = claim {
            if !insert_claim(&tx, id, event.at)? {
                return Ok(GuardedWrite::AlreadyClaimed);
            }
        }
        let used = tx.query_row(
            "SELECT COUNT(*) FROM user_events
             WHERE user_id = ?1 AND action = ?2 AND created_at >= ?3",
            params![event.user_id, ActionKind::Break.as_str(), ts(since)],
            |row| row.get::<_, i64>(0),
        )?;
        let outcome = if used >= i64::from(cap) {
            GuardedWrite::OverBudget
        } else {
            insert_event(&tx, event)?;
            GuardedWrite::Applied
        };
        tx.commit()?;
        Ok(outcome)
    }

    fn mark_daily_sent(&self, user_id: i64, date: NaiveDate) -> Result<(), DatabaseError> {
        self.conn()?.execute(
            "UPDATE users SET last_daily_sent = ?1 WHERE id = ?2",
            params![date.format(DATE_FORMAT).to_string(), user_id],
        )?;
        Ok(())
    }

    fn record_nudge_sent(
        &self,
        user_id: i64,
        date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let updated = tx.execute(
            "UPDATE users SET last_nudge_sent = ?1 WHERE id = ?2",
            params![date.format(DATE_FORMAT).to_string(), user_id],
        )?;
        if updated > 0 {
            insert_event(&tx, &ActionEvent::nudge(user_id, at))?;
        }
        tx.commit()?;
        Ok(())
    }

    fn claim_interaction(
        &self,
        interaction_id: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, DatabaseError> {
        let conn = self.conn()?;
        Ok(insert_claim(&conn, interaction_id, at)?)
    }

    fn prune_interactions(&self, before: DateTime<Utc>) -> Result<usize, DatabaseError> {
        let removed = self.conn()?.execute(
            "DELETE FROM processed_interactions WHERE processed_at < ?1",
            params![ts(before)],
        )?;
        Ok(removed)
    }

    fn plan_entry(&self, position: Position) -> Result<Option<PlanEntry>, DatabaseError> {
        let conn = self.conn()?;
        let entry = conn
            .query_row(
                "SELECT new_a_book, new_a_ref, new_b_book, new_b_ref,
                        old_a_book, old_a_ref, old_b_book, old_b_ref
                 FROM plan WHERE month = ?1 AND day = ?2",
                params![position.month, position.day],
                |row| {
                    Ok(PlanEntry {
                        month: position.month,
                        day: position.day,
                        new_a: Reading::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?),
                        new_b: Reading::new(row.get::<_, String>(2)?, row.get::<_, String>(3)?),
                        old_a: Reading::new(row.get::<_, String>(4)?, row.get::<_, String>(5)?),
                        old_b: Reading::new(row.get::<_, String>(6)?, row.get::<_, String>(7)?),
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }

    fn upsert_plan_entries(&self, entries: &[PlanEntry]) -> Result<usize, DatabaseError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO plan (month, day, new_a_book, new_a_ref, new_b_book, new_b_ref,
                                   old_a_book, old_a_ref, old_b_book, old_b_ref)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(month, day) DO UPDATE SET
                    new_a_book = excluded.new_a_book, new_a_ref = excluded.new_a_ref,
                    new_b_book = excluded.new_b_book, new_b_ref = excluded.new_b_ref,
                    old_a_book = excluded.old_a_book, old_a_ref = excluded.old_a_ref,
                    old_b_book = excluded.old_b_book, old_b_ref = excluded.old_b_ref",
            )?;
            for e in entries {
                stmt.execute(params![
                    e.month,
                    e.day,
                    e.new_a.book,
                    e.new_a.passage,
                    e.new_b.book,
                    e.new_b.passage,
                    e.old_a.book,
                    e.old_a.passage,
                    e.old_b.book,
                    e.old_b.passage,
                ])?;
            }
        }
        tx.commit()?;
        Ok(entries.len())
    }

    fn plan_len(&self) -> Result<usize, DatabaseError> {
        let count = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM plan", [], |row| row.get::<_, i64>(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn user(id: i64) -> User {
        User {
            id,
            username: Some("reader".into()),
            timezone: "Asia/Singapore".into(),
            pointer: Position::new(1, 1),
            last_daily_sent: None,
            last_nudge_sent: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn entry(month: u32, day: u32, tag: &str) -> PlanEntry {
        PlanEntry {
            month,
            day,
            new_a: Reading::new("Matthew", format!("{day}")),
            new_b: Reading::new("Acts", tag),
            old_a: Reading::new("Genesis", format!("{day}")),
            old_b: Reading::new("Psalms", format!("{month}")),
        }
    }

    #[test]
    fn user_roundtrip_and_markers() {
        let db = Database::open_memory().unwrap();
        db.upsert_user(&user(5)).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 2, 3).unwrap();
        db.mark_daily_sent(5, date).unwrap();
        db.record_nudge_sent(5, date, Utc::now()).unwrap();

        let stored = db.get_user(5).unwrap().unwrap();
        assert_eq!(stored.last_daily_sent, Some(date));
        assert_eq!(stored.last_nudge_sent, Some(date));
        assert_eq!(stored.created_at, user(5).created_at);
        assert_eq!(db.query_events(5, ActionKind::Nudge, None).unwrap().len(), 1);
    }

    #[test]
    fn upsert_updates_username_only() {
        let db = Database::open_memory().unwrap();
        db.upsert_user(&user(5)).unwrap();
        db.record_read(
            &ProgressRecord {
                user_id: 5,
                position: Position::new(1, 1),
                completed_at: Utc::now(),
            },
            Position::new(1, 2),
            None,
        )
        .unwrap();

        let mut again = user(5);
        again.username = None;
        again.timezone = "UTC".into();
        let stored = db.upsert_user(&again).unwrap();
        assert_eq!(stored.username, None);
        assert_eq!(stored.timezone, "Asia/Singapore");
        assert_eq!(stored.pointer, Position::new(1, 2));
    }

    #[test]
    fn record_read_is_atomic_for_unknown_user() {
        let db = Database::open_memory().unwrap();
        let record = ProgressRecord {
            user_id: 404,
            position: Position::new(1, 1),
            completed_at: Utc::now(),
        };
        assert!(db.record_read(&record, Position::new(1, 2), None).is_err());
        assert_eq!(db.count_progress(404).unwrap(), 0);
        assert!(db.query_events(404, ActionKind::Read, None).unwrap().is_empty());
    }

    #[test]
    fn failed_read_releases_its_claim() {
        let db = Database::open_memory().unwrap();
        let record = ProgressRecord {
            user_id: 404,
            position: Position::new(1, 1),
            completed_at: Utc::now(),
        };
        assert!(db.record_read(&record, Position::new(1, 2), Some("cb-1")).is_err());
        assert!(db.claim_interaction("cb-1", Utc::now()).unwrap());
    }

    #[test]
    fn read_with_taken_claim_writes_nothing() {
        let db = Database::open_memory().unwrap();
        db.upsert_user(&user(5)).unwrap();
        let record = ProgressRecord {
            user_id: 5,
            position: Position::new(1, 1),
            completed_at: Utc::now(),
        };
        let first = db.record_read(&record, Position::new(1, 2), Some("cb-1")).unwrap();
        let second = db.record_read(&record, Position::new(1, 2), Some("cb-1")).unwrap();
        assert_eq!(first, GuardedWrite::Applied);
        assert_eq!(second, GuardedWrite::AlreadyClaimed);
        assert_eq!(db.count_progress(5).unwrap(), 1);
    }

    #[test]
    fn record_break_stops_at_cap_and_keeps_claim() {
        let db = Database::open_memory().unwrap();
        db.upsert_user(&user(1)).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let since = now - Duration::days(30);
        let brk = ActionEvent::break_taken(1, Position::new(1, 1), now);

        assert_eq!(db.record_break(&brk, since, 2, None).unwrap(), GuardedWrite::Applied);
        assert_eq!(db.record_break(&brk, since, 2, None).unwrap(), GuardedWrite::Applied);
        assert_eq!(
            db.record_break(&brk, since, 2, Some("cb-3")).unwrap(),
            GuardedWrite::OverBudget
        );
        assert_eq!(db.query_events(1, ActionKind::Break, None).unwrap().len(), 2);
        assert!(!db.claim_interaction("cb-3", now).unwrap());
    }

    #[test]
    fn concurrent_breaks_on_file_database_respect_cap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("breaks.db");
        let a = Database::open(&path).unwrap();
        let b = Database::open(&path).unwrap();
        a.upsert_user(&user(1)).unwrap();
        let now = Utc::now();
        let since = now - Duration::days(30);
        std::thread::scope(|s| {
            for i in 0..10 {
                let db = if i % 2 == 0 { &a } else { &b };
                s.spawn(move || {
                    let brk = ActionEvent::break_taken(1, Position::new(1, 1), now);
                    db.record_break(&brk, since, 5, Some(format!("cb-{i}").as_str())).unwrap();
                });
            }
        });
        assert_eq!(a.query_events(1, ActionKind::Break, None).unwrap().len(), 5);
    }

    #[test]
    fn latest_progress_orders_by_completion_time() {
        let db = Database::open_memory().unwrap();
        db.upsert_user(&user(1)).unwrap();
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        for (i, day) in [3u32, 1, 2].into_iter().enumerate() {
            db.append_progress(&ProgressRecord {
                user_id: 1,
                position: Position::new(1, day),
                completed_at: base + Duration::hours(i as i64),
            })
            .unwrap();
        }
        let latest = db.latest_progress(1).unwrap().unwrap();
        assert_eq!(latest.position, Position::new(1, 2));
        assert_eq!(db.count_progress(1).unwrap(), 3);
    }

    #[test]
    fn query_events_since_is_inclusive() {
        let db = Database::open_memory().unwrap();
        db.upsert_user(&user(1)).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        for days in [31, 30, 29] {
            db.append_event(&ActionEvent::break_taken(
                1,
                Position::new(1, 1),
                now - Duration::days(days),
            ))
            .unwrap();
        }
        let events = db
            .query_events(1, ActionKind::Break, Some(now - Duration::days(30)))
            .unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].at, now - Duration::days(30));
    }

    #[test]
    fn plan_upsert_replaces_by_position() {
        let db = Database::open_memory().unwrap();
        db.upsert_plan_entries(&[entry(1, 1, "1"), entry(1, 2, "2")]).unwrap();
        db.upsert_plan_entries(&[entry(1, 1, "replaced")]).unwrap();

        assert_eq!(db.plan_len().unwrap(), 2);
        let e = db.plan_entry(Position::new(1, 1)).unwrap().unwrap();
        assert_eq!(e.new_b.passage, "replaced");
        assert!(db.plan_entry(Position::new(9, 9)).unwrap().is_none());
    }

    #[test]
    fn claim_is_single_use() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        assert!(db.claim_interaction("cb-9", now).unwrap());
        assert!(!db.claim_interaction("cb-9", now).unwrap());
    }

    #[test]
    fn concurrent_claims_on_file_database_accept_exactly_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("claims.db");
        // Two handles on the same file race through SQLite's own locking.
        let a = Database::open(&path).unwrap();
        let b = Database::open(&path).unwrap();
        let accepted = AtomicUsize::new(0);
        std::thread::scope(|s| {
            for i in 0..8 {
                let db = if i % 2 == 0 { &a } else { &b };
                let accepted = &accepted;
                s.spawn(move || {
                    if db.claim_interaction("cb-race", Utc::now()).unwrap() {
                        accepted.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });
        assert_eq!(accepted.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn prune_removes_claims_before_cutoff() {
        let db = Database::open_memory().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        db.claim_interaction("a", now - Duration::days(8)).unwrap();
        db.claim_interaction("b", now).unwrap();
        assert_eq!(db.prune_interactions(now - Duration::days(7)).unwrap(), 1);
    }
}
