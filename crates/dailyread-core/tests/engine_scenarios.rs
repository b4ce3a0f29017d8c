//! End-to-end engine scenarios, run against both the in-memory and SQLite stores.

use chrono::{DateTime, Duration, TimeZone, Utc};
use dailyread_core::{
    ActionKind, BreakDecision, Config, CoreError, Database, FixedClock, InteractionOutcome,
    MemoryStore, PlanEntry, Position, ProgressEngine, Reading, Store,
};

fn start() -> DateTime<Utc> {
    // 08:00 UTC
    Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()
}

fn utc_config() -> Config {
    Config {
        default_timezone: "UTC".to_string(),
        ..Config::default()
    }
}

fn plan_entry(month: u32, day: u32) -> PlanEntry {
    PlanEntry {
        month,
        day,
        new_a: Reading::new("John", format!("{day}")),
        new_b: Reading::new("Acts", format!("{month}")),
        old_a: Reading::new("Genesis", format!("{day}")),
        old_b: Reading::new("Psalm", format!("{}", month * day)),
    }
}

fn full_plan() -> Vec<PlanEntry> {
    (1..=12)
        .flat_map(|m| (1..=25).map(move |d| plan_entry(m, d)))
        .collect()
}

fn engine_with<S: Store>(store: S) -> ProgressEngine<S, FixedClock> {
    ProgressEngine::new(store, FixedClock::new(start()), &utc_config()).unwrap()
}

/// Expands a scenario into one test per store implementation.
macro_rules! scenario {
    ($name:ident, |$engine:ident| $body:block) => {
        mod $name {
            use super::*;

            fn run<S: Store>($engine: &ProgressEngine<S, FixedClock>) $body

            #[test]
            fn memory() {
                run(&engine_with(MemoryStore::new()));
            }

            #[test]
            fn sqlite() {
                run(&engine_with(Database::open_memory().unwrap()));
            }
        }
    };
}

scenario!(twenty_five_daily_reads_roll_into_next_month, |engine| {
    engine.register(1, Some("reader"), None).unwrap();
    let mut stats = None;
    for day in 1..=25 {
        stats = Some(engine.apply_read(1, Position::new(1, day)).unwrap());
        engine.clock().advance(Duration::days(1));
    }
    let stats = stats.unwrap();
    assert_eq!(stats.current, Position::new(2, 1));
    assert_eq!(stats.streak, 25);
    assert_eq!(stats.total_completed, 25);
    assert_eq!(stats.last_completed, Some(Position::new(1, 25)));
});

scenario!(last_position_wraps_to_start, |engine| {
    engine.register(1, None, None).unwrap();
    let stats = engine.apply_read(1, Position::new(12, 25)).unwrap();
    assert_eq!(stats.current, Position::new(1, 1));
});

scenario!(sixth_break_is_rejected_until_window_passes, |engine| {
    engine.register(1, None, None).unwrap();
    for _ in 0..5 {
        let decision = engine.apply_break(1, Position::new(1, 1)).unwrap();
        assert!(matches!(decision, BreakDecision::Recorded(_)));
        engine.clock().advance(Duration::hours(1));
    }

    let rejected = engine.apply_break(1, Position::new(1, 1)).unwrap();
    let BreakDecision::Rejected { breaks_used, cap, next_release } = rejected else {
        panic!("sixth break should be rejected");
    };
    assert_eq!((breaks_used, cap), (5, 5));
    assert_eq!(next_release, Some(start() + Duration::days(30) + Duration::seconds(1)));
    assert_eq!(engine.user(1).unwrap().pointer, Position::new(1, 1));

    engine.clock().set(start() + Duration::days(31));
    let stats = engine.stats(1).unwrap();
    assert_eq!(stats.breaks_used, 0);
    assert_eq!(stats.breaks_left, 5);
});

scenario!(duplicate_delivery_advances_once, |engine| {
    engine.register(1, None, None).unwrap();
    let first = engine.handle_interaction("cb-77", 1, "read|1|1").unwrap();
    assert!(matches!(first, InteractionOutcome::Read { .. }));
    for _ in 0..3 {
        assert_eq!(
            engine.handle_interaction("cb-77", 1, "read|1|1").unwrap(),
            InteractionOutcome::Duplicate
        );
    }
    let stats = engine.stats(1).unwrap();
    assert_eq!(stats.current, Position::new(1, 2));
    assert_eq!(stats.total_completed, 1);
    assert_eq!(engine.store().query_events(1, ActionKind::Read, None).unwrap().len(), 1);
});

scenario!(duplicate_break_is_counted_once, |engine| {
    engine.register(1, None, None).unwrap();
    engine.handle_interaction("cb-b", 1, "break|1|1").unwrap();
    engine.handle_interaction("cb-b", 1, "break|1|1").unwrap();
    assert_eq!(engine.stats(1).unwrap().breaks_used, 1);
});

scenario!(concurrent_duplicate_deliveries_apply_once, |engine| {
    engine.register(1, None, None).unwrap();
    let outcomes: Vec<InteractionOutcome> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| engine.handle_interaction("cb-race", 1, "read|1|1").unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    let applied = outcomes
        .iter()
        .filter(|o| matches!(o, InteractionOutcome::Read { .. }))
        .count();
    assert_eq!(applied, 1);
    assert_eq!(engine.stats(1).unwrap().total_completed, 1);
});

scenario!(interactions_for_unknown_users_fail_without_claiming, |engine| {
    let err = engine.handle_interaction("cb-1", 5, "read|1|1").unwrap_err();
    assert!(matches!(err, CoreError::UserNotFound { user_id: 5 }));
    engine.register(5, None, None).unwrap();
    assert!(matches!(
        engine.handle_interaction("cb-1", 5, "read|1|1").unwrap(),
        InteractionOutcome::Read { .. }
    ));
});

scenario!(off_grid_interaction_keeps_its_id, |engine| {
    engine.register(1, None, None).unwrap();
    assert!(engine.handle_interaction("cb-y", 1, "read|1|30").is_err());
    assert!(engine.handle_interaction("cb-y", 1, "read|1|30").is_err());
    assert!(matches!(
        engine.handle_interaction("cb-y", 1, "read|1|1").unwrap(),
        InteractionOutcome::Read { .. }
    ));
    assert_eq!(engine.stats(1).unwrap().total_completed, 1);
});

scenario!(concurrent_breaks_with_distinct_ids_respect_cap, |engine| {
    engine.register(1, None, None).unwrap();
    let outcomes: Vec<InteractionOutcome> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..9)
            .map(|i| {
                scope.spawn(move || {
                    engine
                        .handle_interaction(&format!("cb-{i}"), 1, "break|1|1")
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    let recorded = outcomes
        .iter()
        .filter(|o| {
            matches!(
                o,
                InteractionOutcome::Break { decision: BreakDecision::Recorded(_) }
            )
        })
        .count();
    assert_eq!(recorded, 5);
    assert_eq!(engine.stats(1).unwrap().breaks_used, 5);
});

scenario!(missed_day_resets_streak, |engine| {
    engine.register(1, None, None).unwrap();
    for day in 1..=3 {
        engine.apply_read(1, Position::new(1, day)).unwrap();
        engine.clock().advance(Duration::days(1));
    }
    // Day four passes with no read.
    engine.clock().advance(Duration::days(1));
    assert_eq!(engine.stats(1).unwrap().streak, 0);
    let stats = engine.apply_read(1, Position::new(1, 4)).unwrap();
    assert_eq!(stats.streak, 1);
    assert_eq!(stats.total_completed, 4);
});

scenario!(re_registration_keeps_progress, |engine| {
    engine.register(1, Some("old"), None).unwrap();
    engine.apply_read(1, Position::new(1, 1)).unwrap();
    let user = engine.register(1, Some("new"), None).unwrap();
    assert_eq!(user.username.as_deref(), Some("new"));
    assert_eq!(user.pointer, Position::new(1, 2));
});

scenario!(next_preview_follows_pointer, |engine| {
    engine.load_plan(&full_plan()).unwrap();
    engine.register(1, None, None).unwrap();
    engine.apply_read(1, Position::new(1, 1)).unwrap();
    let outcome = engine.handle_interaction("cb-n", 1, "next").unwrap();
    let InteractionOutcome::Preview { entry: Some(entry) } = outcome else {
        panic!("expected a preview");
    };
    assert_eq!(entry.position(), Position::new(1, 3));
    assert_eq!(engine.current(1).unwrap().unwrap().position(), Position::new(1, 2));
});

scenario!(plan_reload_is_idempotent, |engine| {
    assert_eq!(engine.load_plan(&full_plan()).unwrap(), 300);
    engine.load_plan(&full_plan()).unwrap();
    assert_eq!(engine.store().plan_len().unwrap(), 300);
});

#[test]
fn sqlite_progress_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dailyread.db");
    {
        let engine =
            ProgressEngine::new(Database::open(&path).unwrap(), FixedClock::new(start()), &utc_config()).unwrap();
        engine.register(1, None, None).unwrap();
        engine.apply_read(1, Position::new(1, 1)).unwrap();
        engine.apply_break(1, Position::new(1, 2)).unwrap();
    }
    let engine =
        ProgressEngine::new(Database::open(&path).unwrap(), FixedClock::new(start()), &utc_config()).unwrap();
    let stats = engine.stats(1).unwrap();
    assert_eq!(stats.current, Position::new(1, 2));
    assert_eq!(stats.streak, 1);
    assert_eq!(stats.breaks_used, 1);
}

#[test]
fn failed_write_leaves_interaction_retryable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dailyread.db");
    let engine =
        ProgressEngine::new(Database::open(&path).unwrap(), FixedClock::new(start()), &utc_config()).unwrap();
    engine.register(1, None, None).unwrap();

    // A second connection makes every progress and break insert abort.
    let side = rusqlite::Connection::open(&path).unwrap();
    side.execute_batch(
        "CREATE TRIGGER fail_progress BEFORE INSERT ON user_progress
         BEGIN SELECT RAISE(ABORT, 'disk full'); END;
         CREATE TRIGGER fail_breaks BEFORE INSERT ON user_events WHEN NEW.action = 'break'
         BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
    )
    .unwrap();

    assert!(engine.handle_interaction("cb-r", 1, "read|1|1").is_err());
    assert!(engine.handle_interaction("cb-b", 1, "break|1|2").is_err());
    assert_eq!(engine.stats(1).unwrap().current, Position::new(1, 1));

    side.execute_batch("DROP TRIGGER fail_progress; DROP TRIGGER fail_breaks;")
        .unwrap();

    assert!(matches!(
        engine.handle_interaction("cb-r", 1, "read|1|1").unwrap(),
        InteractionOutcome::Read { .. }
    ));
    assert!(matches!(
        engine.handle_interaction("cb-b", 1, "break|1|2").unwrap(),
        InteractionOutcome::Break { decision: BreakDecision::Recorded(_) }
    ));
    let stats = engine.stats(1).unwrap();
    assert_eq!(stats.total_completed, 1);
    assert_eq!(stats.breaks_used, 1);
}
