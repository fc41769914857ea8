use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};
use habit_core::streak::{apply_toggle, current_streak, recompute_longest, stats};
use habit_core::{CompletionLedger, DateKey, Habit, HabitId};
use proptest::prelude::*;

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 11, 20).expect("valid base date")
}

fn day(offset: u32) -> DateKey {
    DateKey::from_date(base() + Days::new(u64::from(offset)))
}

fn ledger_of(offsets: &BTreeSet<u32>) -> CompletionLedger {
    offsets.iter().map(|offset| day(*offset)).collect()
}

/// Brute force: from every completed day, walk forward while days stay
/// completed.
fn oracle_longest(offsets: &BTreeSet<u32>) -> u32 {
    offsets
        .iter()
        .map(|start| {
            let mut length = 0;
            while offsets.contains(&(start + length)) {
                length += 1;
            }
            length
        })
        .max()
        .unwrap_or(0)
}

fn oracle_current(offsets: &BTreeSet<u32>, today: u32) -> u32 {
    let mut length = 0;
    while length <= today && offsets.contains(&(today - length)) {
        length += 1;
    }
    length
}

fn arb_offsets() -> impl Strategy<Value = BTreeSet<u32>> {
    // clustered offsets so that long runs actually show up
    prop::collection::btree_set(0u32..90, 0..60)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn longest_matches_brute_force(offsets in arb_offsets()) {
        let ledger = ledger_of(&offsets);
        prop_assert_eq!(recompute_longest(&ledger), oracle_longest(&offsets));
    }

    #[test]
    fn longest_is_zero_only_for_empty_ledger(offsets in arb_offsets()) {
        let longest = recompute_longest(&ledger_of(&offsets));
        prop_assert_eq!(longest == 0, offsets.is_empty());
    }

    #[test]
    fn current_matches_brute_force(offsets in arb_offsets(), today in 0u32..100) {
        let ledger = ledger_of(&offsets);
        prop_assert_eq!(current_streak(&ledger, day(today)), oracle_current(&offsets, today));
    }

    #[test]
    fn set_and_unset_are_idempotent(offsets in arb_offsets(), target in 0u32..90) {
        let mut once = ledger_of(&offsets);
        once.set_completed(day(target));
        let mut twice = once.clone();
        twice.set_completed(day(target));
        prop_assert_eq!(&once, &twice);

        once.unset_completed(day(target));
        twice.unset_completed(day(target));
        twice.unset_completed(day(target));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn mark_then_unmark_round_trips(offsets in arb_offsets(), today in 0u32..100) {
        let mut offsets = offsets;
        offsets.remove(&today);
        let today = day(today);

        let mut before = Habit::new(HabitId::new(1), "Practice").expect("valid name");
        before.completed = ledger_of(&offsets);
        let summary = stats(&before.completed, today);
        before.streak = summary.current;
        before.longest_streak = summary.longest;

        let mut habit = before.clone();
        apply_toggle(&mut habit, today, true);
        prop_assert!(habit.completed.is_completed(today));
        prop_assert!(habit.streak >= 1);
        prop_assert!(habit.longest_streak >= habit.streak);
        prop_assert_eq!(habit.longest_streak, recompute_longest(&habit.completed));

        apply_toggle(&mut habit, today, false);
        prop_assert!(!habit.completed.is_completed(today));
        prop_assert_eq!(habit.streak, before.streak);
        prop_assert!(habit.longest_streak >= before.longest_streak);
        prop_assert_eq!(habit, before);
    }
}
