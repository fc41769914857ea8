use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::day::DateKey;

/// Which days a habit was done on.
///
/// A missing key means "not completed". Entries stored as `false` are
/// tolerated and read as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionLedger {
    days: BTreeMap<DateKey, bool>,
}

impl CompletionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_completed(&self, day: DateKey) -> bool {
        self.days.get(&day).copied().unwrap_or(false)
    }

    pub fn set_completed(&mut self, day: DateKey) {
        self.days.insert(day, true);
    }

    pub fn unset_completed(&mut self, day: DateKey) {
        self.days.remove(&day);
    }

    /// Completed days, oldest first.
    pub fn completed_keys_sorted(&self) -> Vec<DateKey> {
        self.completed_days().collect()
    }

    pub fn completed_days(&self) -> impl DoubleEndedIterator<Item = DateKey> + '_ {
        self.days
            .iter()
            .filter(|(_, done)| **done)
            .map(|(day, _)| *day)
    }

    pub fn len(&self) -> usize {
        self.completed_days().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<DateKey> for CompletionLedger {
    fn from_iter<I: IntoIterator<Item = DateKey>>(iter: I) -> Self {
        let mut ledger = Self::new();
        for day in iter {
            ledger.set_completed(day);
        }
        ledger
    }
}
