//! Reading plan grid.
//!
//! The plan is a fixed grid of `months_per_cycle` x `days_per_month`
//! positions. Advancing past the last position wraps back to (1, 1), so a
//! user's cursor always has a next pending position.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// A (month, day) position in the plan grid. Both components are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub month: u32,
    pub day: u32,
}

impl Position {
    pub const fn new(month: u32, day: u32) -> Self {
        Self { month, day }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Day {} / Month {}", self.day, self.month)
    }
}

/// Grid bounds of the reading plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanBounds {
    pub days_per_month: u32,
    pub months_per_cycle: u32,
}

impl Default for PlanBounds {
    fn default() -> Self {
        Self {
            days_per_month: 25,
            months_per_cycle: 12,
        }
    }
}

impl PlanBounds {
    pub fn new(days_per_month: u32, months_per_cycle: u32) -> Self {
        Self {
            days_per_month,
            months_per_cycle,
        }
    }

    /// The position after `pos`.
    ///
    /// Day rolls over into the next month after `days_per_month`; month rolls
    /// over to 1 after `months_per_cycle`. Total for any positive input.
    pub fn advance(&self, pos: Position) -> Position {
        let mut month = pos.month;
        let mut day = pos.day + 1;

        if day > self.days_per_month {
            day = 1;
            month += 1;
            if month > self.months_per_cycle {
                month = 1;
            }
        }

        Position { month, day }
    }

    /// Number of positions in one full cycle.
    pub fn cycle_len(&self) -> u32 {
        self.days_per_month * self.months_per_cycle
    }

    pub fn contains(&self, pos: Position) -> bool {
        (1..=self.months_per_cycle).contains(&pos.month)
            && (1..=self.days_per_month).contains(&pos.day)
    }

    /// Reject positions that fall outside the grid.
    pub fn check(&self, pos: Position) -> Result<Position, ValidationError> {
        if self.contains(pos) {
            Ok(pos)
        } else {
            Err(ValidationError::PositionOutOfBounds {
                month: pos.month,
                day: pos.day,
                months: self.months_per_cycle,
                days: self.days_per_month,
            })
        }
    }
}

/// One reading reference: a book and the passage within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub book: String,
    pub passage: String,
}

impl Reading {
    pub fn new(book: impl Into<String>, passage: impl Into<String>) -> Self {
        Self {
            book: book.into(),
            passage: passage.into(),
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.book, self.passage)
    }
}

/// The four readings assigned to a plan position: two from the new
/// collection and two from the old.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub month: u32,
    pub day: u32,
    pub new_a: Reading,
    pub new_b: Reading,
    pub old_a: Reading,
    pub old_b: Reading,
}

impl PlanEntry {
    pub fn position(&self) -> Position {
        Position::new(self.month, self.day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn advance_within_month() {
        let bounds = PlanBounds::default();
        assert_eq!(bounds.advance(Position::new(3, 7)), Position::new(3, 8));
    }

    #[test]
    fn advance_rolls_into_next_month() {
        let bounds = PlanBounds::default();
        assert_eq!(bounds.advance(Position::new(1, 25)), Position::new(2, 1));
        assert_eq!(bounds.advance(Position::new(11, 25)), Position::new(12, 1));
    }

    #[test]
    fn advance_wraps_cycle() {
        let bounds = PlanBounds::default();
        assert_eq!(bounds.advance(Position::new(12, 25)), Position::new(1, 1));
    }

    #[test]
    fn single_position_grid_is_a_fixed_point() {
        let bounds = PlanBounds::new(1, 1);
        assert_eq!(bounds.advance(Position::new(1, 1)), Position::new(1, 1));
    }

    #[test]
    fn check_rejects_out_of_grid() {
        let bounds = PlanBounds::default();
        assert!(bounds.check(Position::new(1, 1)).is_ok());
        assert!(bounds.check(Position::new(0, 1)).is_err());
        assert!(bounds.check(Position::new(1, 26)).is_err());
        assert!(bounds.check(Position::new(13, 1)).is_err());
    }

    proptest! {
        #[test]
        fn full_cycle_returns_to_start(
            days in 1u32..40,
            months in 1u32..15,
            month_seed in 0u32..1000,
            day_seed in 0u32..1000,
        ) {
            let bounds = PlanBounds::new(days, months);
            let start = Position::new(month_seed % months + 1, day_seed % days + 1);
            let mut pos = start;
            for _ in 0..bounds.cycle_len() {
                pos = bounds.advance(pos);
                prop_assert!(bounds.contains(pos));
            }
            prop_assert_eq!(pos, start);
        }

        #[test]
        fn last_day_of_month_moves_to_next_month(days in 1u32..40, months in 2u32..15, m in 0u32..100) {
            let bounds = PlanBounds::new(days, months);
            let month = m % (months - 1) + 1;
            prop_assert_eq!(bounds.advance(Position::new(month, days)), Position::new(month + 1, 1));
        }
    }
}
