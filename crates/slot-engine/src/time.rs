//! Wall-clock time-of-day arithmetic shared by every scheduling computation.
//!
//! Availability windows are same-day blocks, so a [`TimeOfDay`] never wraps
//! past midnight: advancing beyond `23:59` yields `None` instead of rolling over.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// A wall-clock time of day with minute precision (`00:00 ..= 23:59`).
///
/// Ordering matches the lexical ordering of the `"HH:MM"` rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);

    /// Build a time of day from an hour (0-23) and minute (0-59).
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(SlotError::InvalidTime(format!("{:02}:{:02}", hour, minute)));
        }
        Ok(TimeOfDay((hour * 60 + minute) as u16))
    }

    pub fn hour(self) -> u32 {
        u32::from(self.0) / 60
    }

    pub fn minute(self) -> u32 {
        u32::from(self.0) % 60
    }

    pub fn minutes_since_midnight(self) -> u32 {
        u32::from(self.0)
    }

    /// Advance by `minutes`, carrying overflow minutes into hours.
    ///
    /// Returns `None` when the result would fall on the next day.
    pub fn advance(self, minutes: u32) -> Option<TimeOfDay> {
        let total = self.minutes_since_midnight().checked_add(minutes)?;
        if total >= MINUTES_PER_DAY {
            return None;
        }
        Some(TimeOfDay(total as u16))
    }

    /// Half-open containment: `start <= self < end`.
    pub fn is_within(self, start: TimeOfDay, end: TimeOfDay) -> bool {
        start <= self && self < end
    }

    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0).unwrap_or_default()
    }
}

impl From<NaiveTime> for TimeOfDay {
    /// Seconds and sub-second precision are discarded.
    fn from(t: NaiveTime) -> Self {
        TimeOfDay((t.hour() * 60 + t.minute()) as u16)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = SlotError;

    /// Parse `"HH:MM"` or `"HH:MM:SS"`. Storage rows carry seconds; they are
    /// validated and then dropped.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || SlotError::InvalidTime(s.to_string());
        let parts: Vec<&str> = s.trim().split(':').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(invalid());
        }

        let mut fields = [0u32; 3];
        for (field, part) in fields.iter_mut().zip(&parts) {
            if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            *field = part.parse().map_err(|_| invalid())?;
        }

        if fields[2] > 59 {
            return Err(invalid());
        }
        TimeOfDay::new(fields[0], fields[1]).map_err(|_| invalid())
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = SlotError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

/// Combine a calendar date and a time of day into an absolute instant in `tz`.
///
/// There is no timezone anchor beyond the zone the caller passes in (typically
/// the viewer's). A local time that falls into a DST gap has no instant and
/// yields `None`; an ambiguous local time resolves to the earliest instant.
pub fn combine<Tz: TimeZone>(date: NaiveDate, time: TimeOfDay, tz: &Tz) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&date.and_time(time.to_naive_time()))
        .earliest()
}
