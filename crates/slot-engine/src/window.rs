//! Recurring weekly availability windows and the coercion boundary for
//! loosely typed storage rows.
//!
//! Storage hands the engine rows shaped like
//! `{"provider_id": "...", "day_of_week": 1, "start_time": "09:00:00", "end_time": "17:00:00", "is_active": true}`.
//! Those rows are validated once, here, into [`AvailabilityWindow`] values; every
//! computation downstream works on the narrow typed form only.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize, Serializer};
use tracing::warn;

use crate::error::{Result, SlotError};
use crate::time::TimeOfDay;

/// One recurring weekly block during which a provider accepts sessions.
///
/// The engine only ever reads windows; creation and editing belong to the
/// provider's management UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAvailabilityWindow")]
pub struct AvailabilityWindow {
    pub provider_id: String,
    /// Serialized as `0 = Sunday .. 6 = Saturday`.
    #[serde(serialize_with = "serialize_day_index")]
    pub day_of_week: Weekday,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    /// Inactive windows are kept for history but never produce slots.
    pub is_active: bool,
}

impl AvailabilityWindow {
    /// Create an active window, enforcing `start_time < end_time`.
    pub fn new(
        provider_id: impl Into<String>,
        day_of_week: Weekday,
        start_time: TimeOfDay,
        end_time: TimeOfDay,
    ) -> Result<Self> {
        if start_time >= end_time {
            return Err(SlotError::InvalidWindow {
                start: start_time.to_string(),
                end: end_time.to_string(),
            });
        }
        Ok(Self {
            provider_id: provider_id.into(),
            day_of_week,
            start_time,
            end_time,
            is_active: true,
        })
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Fields are public, so a window built by hand can still violate
    /// `start_time < end_time`. Such a window produces no slots.
    pub fn is_well_formed(&self) -> bool {
        self.start_time < self.end_time
    }

    /// True when this window contributes slots to `date`: active, well formed,
    /// and recurring on `date`'s weekday.
    pub fn applies_to(&self, date: NaiveDate) -> bool {
        self.is_active && self.is_well_formed() && self.day_of_week == date.weekday()
    }

    pub fn duration_minutes(&self) -> u32 {
        self.end_time
            .minutes_since_midnight()
            .saturating_sub(self.start_time.minutes_since_midnight())
    }
}

/// Map a storage day index (`0 = Sunday .. 6 = Saturday`) to a [`Weekday`].
pub fn day_of_week_from_index(index: i64) -> Result<Weekday> {
    match index {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        other => Err(SlotError::InvalidDayOfWeek(other)),
    }
}

fn serialize_day_index<S: Serializer>(day: &Weekday, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u32(day.num_days_from_sunday())
}

/// An availability row as storage returns it, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAvailabilityWindow {
    #[serde(default, alias = "therapist_id")]
    pub provider_id: String,
    pub day_of_week: i64,
    pub start_time: String,
    pub end_time: String,
    /// Missing means active.
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl TryFrom<RawAvailabilityWindow> for AvailabilityWindow {
    type Error = SlotError;

    fn try_from(raw: RawAvailabilityWindow) -> Result<Self> {
        let day_of_week = day_of_week_from_index(raw.day_of_week)?;
        let start_time: TimeOfDay = raw.start_time.parse()?;
        let end_time: TimeOfDay = raw.end_time.parse()?;
        let window = AvailabilityWindow::new(raw.provider_id, day_of_week, start_time, end_time)?;
        Ok(window.with_active(raw.is_active.unwrap_or(true)))
    }
}

/// Validate raw rows, dropping (and logging) the malformed ones.
///
/// A single bad record must not take a provider's whole day off the calendar,
/// so this never fails.
pub fn coerce_windows<I>(rows: I) -> Vec<AvailabilityWindow>
where
    I: IntoIterator<Item = RawAvailabilityWindow>,
{
    rows.into_iter()
        .filter_map(|raw| {
            let provider_id = raw.provider_id.clone();
            match AvailabilityWindow::try_from(raw) {
                Ok(window) => Some(window),
                Err(e) => {
                    warn!(provider_id = %provider_id, error = %e, "dropping malformed availability row");
                    None
                }
            }
        })
        .collect()
}

/// Parse a JSON array of storage rows into validated windows.
///
/// # Errors
/// Returns `SlotError::Json` only when the input is not a JSON array. Rows
/// that are individually malformed (missing fields, bad times, `start >= end`)
/// are dropped.
pub fn parse_windows_json(json: &str) -> Result<Vec<AvailabilityWindow>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)?;

    let raw_rows = values.into_iter().filter_map(|value| {
        match serde_json::from_value::<RawAvailabilityWindow>(value) {
            Ok(raw) => Some(raw),
            Err(e) => {
                warn!(error = %e, "dropping unreadable availability row");
                None
            }
        }
    });

    Ok(coerce_windows(raw_rows))
}

/// The windows that contribute slots on `date`.
pub fn windows_for_day(
    windows: &[AvailabilityWindow],
    date: NaiveDate,
) -> impl Iterator<Item = &AvailabilityWindow> {
    windows.iter().filter(move |w| w.applies_to(date))
}

/// Group a flat list of windows by owning provider, ordered by provider id.
pub fn group_by_provider(windows: Vec<AvailabilityWindow>) -> BTreeMap<String, Vec<AvailabilityWindow>> {
    let mut grouped: BTreeMap<String, Vec<AvailabilityWindow>> = BTreeMap::new();
    for window in windows {
        grouped.entry(window.provider_id.clone()).or_default().push(window);
    }
    grouped
}
