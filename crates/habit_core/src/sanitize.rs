//! Turns whatever was found in the persisted snapshot into well-formed habits.
//!
//! This is the only place input is validated. Records that cannot be salvaged
//! are dropped with a warning. Salvageable records get defaults for the
//! fields that are missing or have the wrong type.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    day::DateKey,
    habit::{normalize_name, Habit, HabitId},
    ledger::CompletionLedger,
};

/// Date format written by the earlier tracker in `lastCompleted`.
const LEGACY_DATE_FORMAT: &str = "%a %b %d %Y";
/// Upper bound on a rebuilt legacy run, about a century of days.
const MAX_LEGACY_RUN: u32 = 36_600;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("record is not an object")]
    NotAnObject,
    #[error("record has no usable id")]
    MissingId,
    #[error("record has no usable name")]
    MissingName,
    #[error("id {0} already used by an earlier record")]
    DuplicateId(HabitId),
}

/// Sanitizes a loaded snapshot, keeping survivors in their original order.
pub fn sanitize_snapshot(records: Vec<Value>) -> Vec<Habit> {
    let mut seen: HashSet<HabitId> = HashSet::new();
    let mut habits = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let outcome = sanitize_record(record).and_then(|habit| {
            if seen.insert(habit.id) {
                Ok(habit)
            } else {
                Err(Rejection::DuplicateId(habit.id))
            }
        });
        match outcome {
            Ok(habit) => habits.push(habit),
            Err(reason) => warn!(index, %reason, "dropping persisted habit record"),
        }
    }

    debug!(
        loaded = records.len(),
        kept = habits.len(),
        "sanitized habit snapshot"
    );
    habits
}

pub fn sanitize_record(record: &Value) -> Result<Habit, Rejection> {
    let fields = record.as_object().ok_or(Rejection::NotAnObject)?;
    let id = fields.get("id").and_then(parse_id).ok_or(Rejection::MissingId)?;
    let name = fields
        .get("name")
        .and_then(Value::as_str)
        .and_then(normalize_name)
        .ok_or(Rejection::MissingName)?;

    let streak = parse_counter(fields.get("streak"));
    let completed = match fields.get("completed") {
        Some(Value::Object(entries)) => parse_ledger(entries),
        Some(_) => CompletionLedger::new(),
        None => legacy_ledger(fields, streak),
    };
    let longest_streak = parse_counter(fields.get("longestStreak")).max(streak);

    Ok(Habit {
        id,
        name,
        completed,
        streak,
        longest_streak,
    })
}

fn parse_id(value: &Value) -> Option<HabitId> {
    match value {
        Value::Number(number) => number.as_u64().map(HabitId::new),
        Value::String(raw) => raw.parse().ok(),
        _ => None,
    }
}

fn parse_ledger(entries: &Map<String, Value>) -> CompletionLedger {
    entries
        .iter()
        .filter(|(_, done)| done.as_bool() == Some(true))
        .filter_map(|(raw, _)| match raw.parse::<DateKey>() {
            Ok(day) => Some(day),
            Err(err) => {
                debug!(%err, "skipping malformed ledger key");
                None
            }
        })
        .collect()
}

/// Older snapshots only remember the last completion day and the length of
/// the run ending there. The run is rebuilt so that recomputing streaks from
/// the ledger gives the same numbers back.
fn legacy_ledger(fields: &Map<String, Value>, streak: u32) -> CompletionLedger {
    let Some(raw) = fields.get("lastCompleted").and_then(Value::as_str) else {
        return CompletionLedger::new();
    };
    let raw = raw.trim();
    let parsed = NaiveDate::parse_from_str(raw, LEGACY_DATE_FORMAT)
        .ok()
        .map(DateKey::from_date)
        .or_else(|| raw.parse::<DateKey>().ok());
    let Some(last) = parsed else {
        return CompletionLedger::new();
    };

    let mut ledger = CompletionLedger::new();
    let mut day = last;
    for _ in 0..streak.clamp(1, MAX_LEGACY_RUN) {
        ledger.set_completed(day);
        let before = day.day_before();
        if before == day {
            break;
        }
        day = before;
    }
    ledger
}

fn parse_counter(value: Option<&Value>) -> u32 {
    let Some(Value::Number(number)) = value else {
        return 0;
    };
    if let Some(whole) = number.as_u64() {
        return u32::try_from(whole).unwrap_or(u32::MAX);
    }
    match number.as_f64() {
        // `as` saturates for values past u32::MAX
        Some(float) if float.is_finite() && float >= 0.0 => float.trunc() as u32,
        _ => 0,
    }
}
