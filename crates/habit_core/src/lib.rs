//! Daily habit tracking: a per-habit completion ledger, streak computation
//! over it, and a store that keeps the habit list persisted.

pub mod clock;
pub mod day;
pub mod habit;
pub mod ledger;
pub mod sanitize;
pub mod storage;
pub mod store;
pub mod streak;
pub mod view;

pub use crate::clock::{Clock, FixedClock, SystemClock};
pub use crate::day::DateKey;
pub use crate::habit::{Habit, HabitId};
pub use crate::ledger::CompletionLedger;
pub use crate::storage::{JsonFileStorage, MemoryStorage, Storage, StorageError};
pub use crate::store::{ConfirmationToken, HabitStore, HabitStoreBuilder};
