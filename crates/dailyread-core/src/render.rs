//! Plain-text message bodies for cards, nudges and interaction replies.

use chrono::{DateTime, Utc};

use crate::engine::{BreakDecision, DailyCard, Stats};
use crate::plan::PlanEntry;

/// Streak lengths that are a multiple of this get a celebration.
pub const MILESTONE_DAYS: u32 = 7;

fn days(n: u32) -> &'static str {
    if n == 1 {
        "day"
    } else {
        "days"
    }
}

pub fn entry_text(entry: &PlanEntry) -> String {
    format!(
        "Day {} - Month {}\n\nNew Testament:\n- {}\n- {}\n\nOld Testament:\n- {}\n- {}",
        entry.day, entry.month, entry.new_a, entry.new_b, entry.old_a, entry.old_b
    )
}

pub fn daily_card(card: &DailyCard) -> String {
    let stats = &card.stats;
    format!(
        "Day {} - Month {}\n\nCurrent streak: {} {}\nBreaks left: {}/{}\n\nNew Testament:\n- {}\n- {}\n\nOld Testament:\n- {}\n- {}",
        card.entry.day,
        card.entry.month,
        stats.streak,
        days(stats.streak),
        stats.breaks_left,
        stats.break_cap,
        card.entry.new_a,
        card.entry.new_b,
        card.entry.old_a,
        card.entry.old_b,
    )
}

pub fn nudge() -> &'static str {
    "Quick nudge: remember to read today! You've got this."
}

pub fn no_reading() -> &'static str {
    "No reading is available for your position yet."
}

pub fn stats(stats: &Stats) -> String {
    let last = match stats.last_completed {
        Some(pos) => format!("Day {} - Month {}", pos.day, pos.month),
        None => "none yet".to_string(),
    };
    format!(
        "Current streak: {} {}\nBreaks used: {}/{}\nNext reading: Day {} - Month {}\nLast completed: {}\nTotal completed: {}",
        stats.streak,
        days(stats.streak),
        stats.breaks_used,
        stats.break_cap,
        stats.current.day,
        stats.current.month,
        last,
        stats.total_completed,
    )
}

/// Reply after a reading is recorded. Every seventh consecutive day is a milestone.
pub fn celebration(streak: u32) -> String {
    if streak > 0 && streak % MILESTONE_DAYS == 0 {
        format!("{streak}-day streak! Treat yourself today, you've earned it.")
    } else {
        format!(
            "Well done! See you at the next reading.\nStreak: {streak} {} in a row.",
            days(streak)
        )
    }
}

fn release_hint(next_release: Option<DateTime<Utc>>) -> String {
    match next_release {
        Some(at) => format!(" A break frees up at {}.", at.format("%Y-%m-%d %H:%M UTC")),
        None => String::new(),
    }
}

pub fn break_decision(decision: &BreakDecision) -> String {
    match decision {
        BreakDecision::Recorded(stats) => format!(
            "Break recorded. Rest well, the same reading will be waiting tomorrow.\nBreaks left: {}/{}",
            stats.breaks_left, stats.break_cap
        ),
        BreakDecision::Rejected {
            breaks_used,
            cap,
            next_release,
        } => format!(
            "Sorry, you've used {breaks_used} of {cap} breaks in the current window.{}",
            release_hint(*next_release)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Position, Reading};
    use chrono::TimeZone;

    fn sample_stats(streak: u32) -> Stats {
        Stats {
            streak,
            breaks_used: 2,
            breaks_left: 3,
            break_cap: 5,
            current: Position::new(2, 4),
            next: Position::new(2, 5),
            total_completed: 28,
            last_completed: Some(Position::new(2, 3)),
        }
    }

    #[test]
    fn celebrates_every_seventh_day() {
        assert!(celebration(7).starts_with("7-day streak!"));
        assert!(celebration(14).starts_with("14-day streak!"));
        assert!(celebration(8).starts_with("Well done!"));
        assert!(celebration(0).starts_with("Well done!"));
        assert!(celebration(1).ends_with("1 day in a row."));
    }

    #[test]
    fn card_lists_all_readings() {
        let card = DailyCard {
            entry: PlanEntry {
                month: 2,
                day: 4,
                new_a: Reading::new("Matthew", "4"),
                new_b: Reading::new("Acts", "2:1-21"),
                old_a: Reading::new("Genesis", "29-30"),
                old_b: Reading::new("Psalm", "19"),
            },
            stats: sample_stats(3),
        };
        let text = daily_card(&card);
        assert!(text.starts_with("Day 4 - Month 2"));
        assert!(text.contains("Current streak: 3 days"));
        assert!(text.contains("Breaks left: 3/5"));
        for reading in ["Matthew 4", "Acts 2:1-21", "Genesis 29-30", "Psalm 19"] {
            assert!(text.contains(reading), "{reading}");
        }
    }

    #[test]
    fn stats_text_reports_next_and_totals() {
        let text = stats(&sample_stats(1));
        assert!(text.contains("Current streak: 1 day\n"));
        assert!(text.contains("Next reading: Day 4 - Month 2"));
        assert!(text.contains("Total completed: 28"));
    }

    #[test]
    fn rejected_break_mentions_release() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let text = break_decision(&BreakDecision::Rejected {
            breaks_used: 5,
            cap: 5,
            next_release: Some(at),
        });
        assert!(text.contains("5 of 5"));
        assert!(text.contains("2024-05-01 08:00 UTC"));
    }
}
