use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::clock::Clock;

const KEY_FORMAT: &str = "%Y-%m-%d";

/// A local calendar day, written as `YYYY-MM-DD`.
///
/// The textual form is fixed width, so ordering keys lexically and ordering
/// them chronologically agree. `Ord` on the key is the chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{input}` is not a YYYY-MM-DD date")]
pub struct DateKeyError {
    pub input: String,
}

impl DateKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Day key of a local wall-clock instant.
    pub fn from_instant(instant: NaiveDateTime) -> Self {
        Self(instant.date())
    }

    pub fn today(clock: &dyn Clock) -> Self {
        Self::from_instant(clock.now())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The previous calendar day. Saturates at the first representable date.
    pub fn day_before(&self) -> Self {
        Self(self.0.pred_opt().unwrap_or(self.0))
    }

    /// The next calendar day. Saturates at the last representable date.
    pub fn day_after(&self) -> Self {
        Self(self.0.succ_opt().unwrap_or(self.0))
    }

    /// Signed number of days from `self` to `other`.
    pub fn days_until(&self, other: DateKey) -> i64 {
        other.0.signed_duration_since(self.0).num_days()
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(KEY_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = DateKeyError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        // chrono accepts unpadded fields, keys must stay fixed width
        let well_shaped = input.len() == 10
            && input
                .char_indices()
                .all(|(idx, c)| if idx == 4 || idx == 7 { c == '-' } else { c.is_ascii_digit() });
        if !well_shaped {
            return Err(DateKeyError {
                input: input.to_string(),
            });
        }
        NaiveDate::parse_from_str(input, KEY_FORMAT)
            .map(Self)
            .map_err(|_| DateKeyError {
                input: input.to_string(),
            })
    }
}

impl Serialize for DateKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
