use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ledger::CompletionLedger;

/// Opaque habit identifier, unique within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(u64);

impl HabitId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for HabitId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A tracked daily habit as persisted in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    pub completed: CompletionLedger,
    pub streak: u32,
    pub longest_streak: u32,
}

impl Habit {
    /// A fresh habit with an empty ledger. Returns `None` when the name is
    /// blank.
    pub fn new(id: HabitId, name: &str) -> Option<Self> {
        let name = normalize_name(name)?;
        Some(Self {
            id,
            name,
            completed: CompletionLedger::new(),
            streak: 0,
            longest_streak: 0,
        })
    }
}

/// Trimmed name, or `None` if nothing is left.
pub fn normalize_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
