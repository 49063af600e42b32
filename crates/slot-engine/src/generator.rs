//! Slot generation: expand a provider's windows for one calendar day into
//! discrete, fixed-length session start times.
//!
//! Each window is walked from its `start_time` in steps of the session
//! duration. Under the default [`SlotBoundary::StartBeforeEnd`] policy a slot is
//! emitted while it starts before `end_time`, so the final session may run past
//! the window's end. Overlapping windows are not deduplicated.

use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::policy::{SessionPolicy, SlotBoundary};
use crate::time::{combine, TimeOfDay};
use crate::window::{windows_for_day, AvailabilityWindow};

/// A computed, bookable start time. Never persisted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateSlot {
    pub provider_id: String,
    pub date: NaiveDate,
    pub start_time: TimeOfDay,
}

impl CandidateSlot {
    /// The absolute start instant in `tz`, or `None` if the wall-clock time
    /// does not exist there (DST gap).
    pub fn starts_at<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Tz>> {
        combine(self.date, self.start_time, tz)
    }

    pub fn ends_at<Tz: TimeZone>(&self, tz: &Tz, duration_minutes: u32) -> Option<DateTime<Tz>> {
        self.starts_at(tz)
            .map(|start| start + Duration::minutes(i64::from(duration_minutes)))
    }
}

/// Expand a single window into its stepped start times, ascending.
fn expand_window(window: &AvailabilityWindow, policy: &SessionPolicy) -> Vec<TimeOfDay> {
    let step = policy.duration_minutes;
    let mut slots = Vec::new();
    let mut current = Some(window.start_time);

    while let Some(t) = current {
        if t >= window.end_time {
            break;
        }
        if policy.boundary == SlotBoundary::FitWithinWindow {
            match t.advance(step) {
                Some(session_end) if session_end <= window.end_time => {}
                _ => break,
            }
        }
        slots.push(t);
        current = t.advance(step);
    }

    slots
}

/// True when `window` offers at least one session under `policy`.
///
/// Agrees with [`expand_window`] being non-empty without building the list.
pub(crate) fn opens_a_slot(window: &AvailabilityWindow, policy: &SessionPolicy) -> bool {
    if policy.duration_minutes == 0 || window.start_time >= window.end_time {
        return false;
    }
    match policy.boundary {
        SlotBoundary::StartBeforeEnd => true,
        SlotBoundary::FitWithinWindow => window
            .start_time
            .advance(policy.duration_minutes)
            .is_some_and(|session_end| session_end <= window.end_time),
    }
}

fn usable(policy: &SessionPolicy) -> bool {
    if policy.duration_minutes == 0 {
        warn!("session duration is zero; no slots can be generated");
        return false;
    }
    true
}

/// Generate the ordered start times offered on `date`.
///
/// Windows for other weekdays, inactive windows, and malformed windows
/// (`start_time >= end_time`) are skipped. A zero-minute session yields no
/// slots. Identical inputs always produce identical output.
pub fn generate_slots(
    windows: &[AvailabilityWindow],
    date: NaiveDate,
    policy: &SessionPolicy,
) -> Vec<TimeOfDay> {
    if !usable(policy) {
        return Vec::new();
    }

    let mut slots: Vec<TimeOfDay> = windows_for_day(windows, date)
        .flat_map(|w| expand_window(w, policy))
        .collect();
    slots.sort();
    slots
}

/// Like [`generate_slots`], but keeps the owning provider with each start time.
///
/// Ordered by start time; slots sharing a start time keep window order.
pub fn candidate_slots(
    windows: &[AvailabilityWindow],
    date: NaiveDate,
    policy: &SessionPolicy,
) -> Vec<CandidateSlot> {
    if !usable(policy) {
        return Vec::new();
    }

    let mut slots: Vec<CandidateSlot> = windows_for_day(windows, date)
        .flat_map(move |w| {
            expand_window(w, policy)
                .into_iter()
                .map(move |start_time| CandidateSlot {
                    provider_id: w.provider_id.clone(),
                    date,
                    start_time,
                })
        })
        .collect();
    slots.sort_by_key(|s| s.start_time);
    slots
}

/// The slots on `date` that are still in the future relative to `now`.
///
/// Start instants are computed in `now`'s timezone; a slot starting exactly at
/// `now` is already gone.
pub fn upcoming_slots<Tz: TimeZone>(
    windows: &[AvailabilityWindow],
    date: NaiveDate,
    policy: &SessionPolicy,
    now: &DateTime<Tz>,
) -> Vec<CandidateSlot> {
    let tz = now.timezone();
    candidate_slots(windows, date, policy)
        .into_iter()
        .filter(|slot| slot.starts_at(&tz).is_some_and(|start| start > *now))
        .collect()
}
