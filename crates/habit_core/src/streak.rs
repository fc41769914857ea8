//! Streak computation over a [`CompletionLedger`].
//!
//! `longest_streak` is always derived from scratch by scanning the ledger, so
//! it cannot drift from the recorded days however they were added or removed.
//! The current streak is the run of completed days that ends on "today".

use crate::{day::DateKey, habit::Habit, ledger::CompletionLedger};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreakStats {
    pub current: u32,
    pub longest: u32,
}

/// Longest run of consecutive completed days anywhere in the ledger. Zero only
/// for an empty ledger.
pub fn recompute_longest(ledger: &CompletionLedger) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<DateKey> = None;

    for day in ledger.completed_days() {
        run = match previous {
            Some(prev) if prev.day_after() == day => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }

    longest
}

/// Length of the completed run ending exactly on `today`.
pub fn current_streak(ledger: &CompletionLedger, today: DateKey) -> u32 {
    let mut count = 0;
    let mut day = today;
    while ledger.is_completed(day) {
        count += 1;
        let before = day.day_before();
        if before == day {
            break;
        }
        day = before;
    }
    count
}

pub fn stats(ledger: &CompletionLedger, today: DateKey) -> StreakStats {
    StreakStats {
        current: current_streak(ledger, today),
        longest: recompute_longest(ledger),
    }
}

/// Marks or unmarks `today` on the habit and brings its cached counters up to
/// date.
pub fn apply_toggle(habit: &mut Habit, today: DateKey, mark_completed: bool) {
    if mark_completed {
        habit.completed.set_completed(today);
        let yesterday = today.day_before();
        habit.streak = if yesterday != today && habit.completed.is_completed(yesterday) {
            current_streak(&habit.completed, yesterday) + 1
        } else {
            1
        };
    } else {
        habit.completed.unset_completed(today);
        habit.streak = 0;
    }
    habit.longest_streak = recompute_longest(&habit.completed);
}
