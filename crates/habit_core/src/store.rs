use tracing::{debug, info, instrument, warn};

use crate::{
    clock::{Clock, SystemClock},
    day::DateKey,
    habit::{normalize_name, Habit, HabitId},
    sanitize::sanitize_snapshot,
    storage::{MemoryStorage, Storage, StorageError},
    streak::{self, current_streak},
    view::{self, TrackerView},
};

/// Proof that a deletion was requested. Only the most recently issued token
/// can be confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationToken {
    habit_id: HabitId,
    serial: u64,
}

impl ConfirmationToken {
    pub fn habit_id(&self) -> HabitId {
        self.habit_id
    }
}

/// Owns the habit list and keeps the persisted snapshot in step with it.
///
/// Invalid requests (blank names, unknown ids, stale tokens) leave the store
/// untouched and are reported through the return value only. Every committed
/// change rewrites the whole snapshot.
pub struct HabitStore {
    habits: Vec<Habit>,
    storage: Box<dyn Storage>,
    clock: Box<dyn Clock>,
    pending_delete: Option<ConfirmationToken>,
    next_serial: u64,
}

pub struct HabitStoreBuilder {
    storage: Option<Box<dyn Storage>>,
    clock: Option<Box<dyn Clock>>,
}

impl HabitStoreBuilder {
    pub fn new() -> Self {
        Self {
            storage: None,
            clock: None,
        }
    }

    pub fn with_storage(mut self, storage: impl Storage + 'static) -> Self {
        self.storage = Some(Box::new(storage));
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Loads and sanitizes the snapshot, then brings cached streaks up to
    /// date for today. Fails only if the storage cannot be read at all.
    pub fn build(self) -> Result<HabitStore, StorageError> {
        let storage = self
            .storage
            .unwrap_or_else(|| Box::new(MemoryStorage::new()));
        let clock = self.clock.unwrap_or_else(|| Box::new(SystemClock));

        let habits = sanitize_snapshot(storage.load_snapshot()?);
        info!(habit_count = habits.len(), "habit store opened");

        let mut store = HabitStore {
            habits,
            storage,
            clock,
            pending_delete: None,
            next_serial: 1,
        };
        store.refresh();
        Ok(store)
    }
}

impl Default for HabitStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HabitStore {
    pub fn builder() -> HabitStoreBuilder {
        HabitStoreBuilder::new()
    }

    pub fn open(
        storage: impl Storage + 'static,
        clock: impl Clock + 'static,
    ) -> Result<Self, StorageError> {
        Self::builder()
            .with_storage(storage)
            .with_clock(clock)
            .build()
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn get(&self, id: HabitId) -> Option<&Habit> {
        self.habits.iter().find(|habit| habit.id == id)
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    pub fn today(&self) -> DateKey {
        self.clock.today_key()
    }

    #[instrument(skip(self))]
    pub fn add_habit(&mut self, name: &str) -> Option<&Habit> {
        let Some(name) = normalize_name(name) else {
            debug!("rejected blank habit name");
            return None;
        };
        let id = self.fresh_id();
        let habit = Habit::new(id, &name)?;
        info!(habit_id = %id, name = %habit.name, "habit added");
        self.habits.push(habit);
        self.persist();
        self.habits.last()
    }

    /// Flips completion of `today` for the habit. Returns the new state, or
    /// `None` when the id is unknown.
    #[instrument(skip(self))]
    pub fn toggle_completion(&mut self, id: HabitId, today: DateKey) -> Option<bool> {
        let Some(habit) = self.habits.iter_mut().find(|habit| habit.id == id) else {
            debug!(habit_id = %id, "toggle for unknown habit ignored");
            return None;
        };
        let mark = !habit.completed.is_completed(today);
        streak::apply_toggle(habit, today, mark);
        info!(
            habit_id = %id,
            day = %today,
            completed = mark,
            streak = habit.streak,
            longest_streak = habit.longest_streak,
            "completion toggled"
        );
        self.persist();
        Some(mark)
    }

    pub fn toggle_today(&mut self, id: HabitId) -> Option<bool> {
        let today = self.today();
        self.toggle_completion(id, today)
    }

    #[instrument(skip(self))]
    pub fn rename_habit(&mut self, id: HabitId, new_name: &str) -> bool {
        let Some(name) = normalize_name(new_name) else {
            debug!(habit_id = %id, "rejected blank rename");
            return false;
        };
        let Some(habit) = self.habits.iter_mut().find(|habit| habit.id == id) else {
            debug!(habit_id = %id, "rename for unknown habit ignored");
            return false;
        };
        info!(habit_id = %id, from = %habit.name, to = %name, "habit renamed");
        habit.name = name;
        self.persist();
        true
    }

    #[instrument(skip(self))]
    pub fn delete_habit(&mut self, id: HabitId) -> Option<Habit> {
        let Some(index) = self.habits.iter().position(|habit| habit.id == id) else {
            debug!(habit_id = %id, "delete for unknown habit ignored");
            return None;
        };
        let removed = self.habits.remove(index);
        if self
            .pending_delete
            .is_some_and(|token| token.habit_id == id)
        {
            self.pending_delete = None;
        }
        info!(habit_id = %id, name = %removed.name, "habit deleted");
        self.persist();
        Some(removed)
    }

    /// First half of a confirmed delete. Replaces any earlier pending request.
    pub fn request_delete(&mut self, id: HabitId) -> Option<ConfirmationToken> {
        self.get(id)?;
        let token = ConfirmationToken {
            habit_id: id,
            serial: self.next_serial,
        };
        self.next_serial += 1;
        self.pending_delete = Some(token);
        debug!(habit_id = %id, serial = token.serial, "delete requested");
        Some(token)
    }

    pub fn confirm_delete(&mut self, token: ConfirmationToken) -> Option<Habit> {
        if self.pending_delete != Some(token) {
            debug!(habit_id = %token.habit_id, "stale delete confirmation ignored");
            return None;
        }
        self.pending_delete = None;
        self.delete_habit(token.habit_id)
    }

    pub fn cancel_delete(&mut self, token: ConfirmationToken) {
        if self.pending_delete == Some(token) {
            self.pending_delete = None;
        }
    }

    pub fn longest_streak_across_all(&self) -> u32 {
        view::longest_streak_across_all(&self.habits)
    }

    pub fn completions_on(&self, day: DateKey) -> usize {
        view::completions_on(&self.habits, day)
    }

    /// Re-derives each cached current streak for today's date. Needed after
    /// loading and whenever the calendar day may have rolled over. Returns how
    /// many habits changed.
    pub fn refresh(&mut self) -> usize {
        let today = self.today();
        let mut changed = 0;
        for habit in &mut self.habits {
            let streak = current_streak(&habit.completed, today);
            let longest = habit.longest_streak.max(streak);
            if habit.streak != streak || habit.longest_streak != longest {
                debug!(habit_id = %habit.id, from = habit.streak, to = streak, "streak refreshed");
                habit.streak = streak;
                habit.longest_streak = longest;
                changed += 1;
            }
        }
        if changed > 0 {
            self.persist();
        }
        changed
    }

    pub fn view(&self) -> TrackerView {
        view::project(&self.habits, self.today())
    }

    /// Ids are millisecond timestamps, bumped past any id already in use.
    fn fresh_id(&self) -> HabitId {
        let now = u64::try_from(self.clock.now().and_utc().timestamp_millis()).unwrap_or(0);
        let after_existing = self
            .habits
            .iter()
            .map(|habit| habit.id.get().saturating_add(1))
            .max()
            .unwrap_or(0);
        HabitId::new(now.max(after_existing))
    }

    fn persist(&self) {
        if let Err(err) = self.storage.save_snapshot(&self.habits) {
            warn!(%err, "failed to persist habits");
        }
    }
}
