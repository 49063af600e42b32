//! Calendar-feed expansion: render a weekly window as an RFC 5545 rule and
//! expand it into concrete occurrences.
//!
//! Wraps the `rrule` crate (v0.13) and `chrono-tz` so a provider's recurring
//! availability can be published to an external calendar with correct DST
//! handling: occurrences keep their wall-clock time when the offset changes.

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, Utc, Weekday};
use rrule::RRuleSet;
use serde::Serialize;

use crate::error::{Result, SlotError};
use crate::window::AvailabilityWindow;

/// One concrete instance of a recurring availability window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowOccurrence {
    pub provider_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

fn byday(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// The RRULE body for a window, e.g. `"FREQ=WEEKLY;BYDAY=MO"`.
pub fn window_rrule(window: &AvailabilityWindow) -> String {
    format!("FREQ=WEEKLY;BYDAY={}", byday(window.day_of_week))
}

/// First date on or after `from` that falls on `day`.
fn first_on_or_after(from: NaiveDate, day: Weekday) -> Option<NaiveDate> {
    let ahead = (7 + day.num_days_from_monday() - from.weekday().num_days_from_monday()) % 7;
    from.checked_add_days(Days::new(u64::from(ahead)))
}

/// Expand a window into `count` weekly occurrences, starting from the first
/// matching date on or after `from`, with wall-clock times in `timezone`.
///
/// # Arguments
/// - `window` -- the weekly availability block
/// - `from` -- first date to consider
/// - `timezone` -- IANA timezone the window's times are expressed in (e.g., "Europe/Berlin")
/// - `count` -- number of occurrences to produce
///
/// # Errors
/// Returns `SlotError::InvalidTimezone` if `timezone` is not a valid IANA identifier,
/// `SlotError::InvalidWindow` for a window with `start_time >= end_time`, and
/// `SlotError::InvalidRule` if the generated rule cannot be expanded.
pub fn window_occurrences(
    window: &AvailabilityWindow,
    from: NaiveDate,
    timezone: &str,
    count: u32,
) -> Result<Vec<WindowOccurrence>> {
    // Validate timezone by parsing it as a chrono-tz Tz.
    let _tz: chrono_tz::Tz = timezone
        .parse()
        .map_err(|_| SlotError::InvalidTimezone(timezone.to_string()))?;

    if !window.is_well_formed() {
        return Err(SlotError::InvalidWindow {
            start: window.start_time.to_string(),
            end: window.end_time.to_string(),
        });
    }

    if count == 0 {
        return Ok(Vec::new());
    }

    let first = first_on_or_after(from, window.day_of_week)
        .ok_or_else(|| SlotError::InvalidRule(format!("no {} on or after {}", window.day_of_week, from)))?;
    let dtstart = first
        .and_time(window.start_time.to_naive_time())
        .format("%Y%m%dT%H%M%S");

    let rrule_text = format!(
        "DTSTART;TZID={}:{}\nRRULE:{};COUNT={}",
        timezone,
        dtstart,
        window_rrule(window),
        count
    );

    let rrule_set: RRuleSet = rrule_text
        .parse()
        .map_err(|e| SlotError::InvalidRule(format!("{}", e)))?;

    let limit = u16::try_from(count).unwrap_or(u16::MAX);
    let length = Duration::minutes(i64::from(window.duration_minutes()));

    Ok(rrule_set
        .all(limit)
        .dates
        .into_iter()
        .map(|dt| {
            let start = dt.with_timezone(&Utc);
            WindowOccurrence {
                provider_id: window.provider_id.clone(),
                start,
                end: start + length,
            }
        })
        .collect())
}
