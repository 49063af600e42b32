//! Horizon scanning: find a provider's earliest future opening within a
//! bounded lookahead.
//!
//! The scan walks `from`'s local date forward one day at a time and stops after
//! `horizon_days` days, so a provider with no active windows costs exactly
//! `horizon_days` empty iterations and never loops unboundedly.

use std::cmp::Ordering;

use chrono::{DateTime, Days, NaiveDate, TimeZone};
use tracing::debug;

use crate::generator::{upcoming_slots, CandidateSlot};
use crate::policy::SessionPolicy;
use crate::time::combine;
use crate::window::{windows_for_day, AvailabilityWindow};

fn scan_dates<Tz: TimeZone>(
    from: &DateTime<Tz>,
    horizon_days: u32,
) -> impl Iterator<Item = NaiveDate> {
    let start = from.date_naive();
    (0..u64::from(horizon_days)).map_while(move |day| start.checked_add_days(Days::new(day)))
}

/// Find the earliest window *opening* strictly after `from`.
///
/// Only each window's `start_time` is considered, not the stepped slots inside
/// it: a window that opened earlier today is skipped even if later slots in it
/// remain. The first scanned day with a future opening wins; within that day
/// the earliest opening wins. Instants are computed in `from`'s timezone.
///
/// Returns `None` when nothing opens within `horizon_days` days (including
/// `horizon_days == 0`).
pub fn find_next_available<Tz: TimeZone>(
    windows: &[AvailabilityWindow],
    from: &DateTime<Tz>,
    horizon_days: u32,
) -> Option<DateTime<Tz>> {
    let tz = from.timezone();

    for date in scan_dates(from, horizon_days) {
        let earliest = windows_for_day(windows, date)
            .filter_map(|w| combine(date, w.start_time, &tz))
            .filter(|opening| opening > from)
            .min();

        if earliest.is_some() {
            debug!(%date, "next available opening found");
            return earliest;
        }
    }

    debug!(horizon_days, "no opening within horizon");
    None
}

/// Find the earliest bookable slot strictly after `from`, considering every
/// stepped slot produced by the slot generator rather than only window openings.
pub fn find_next_slot<Tz: TimeZone>(
    windows: &[AvailabilityWindow],
    from: &DateTime<Tz>,
    horizon_days: u32,
    policy: &SessionPolicy,
) -> Option<CandidateSlot> {
    scan_dates(from, horizon_days)
        .find_map(|date| upcoming_slots(windows, date, policy, from).into_iter().next())
}

/// One row of a provider directory, sorted by availability.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderAvailability<Tz: TimeZone> {
    pub provider_id: String,
    pub next_available: Option<DateTime<Tz>>,
}

/// Compute next-available for each provider and order the directory by it:
/// soonest first, providers with nothing in the horizon last, ties broken by
/// provider id.
pub fn rank_by_next_available<'a, Tz, I>(
    providers: I,
    from: &DateTime<Tz>,
    horizon_days: u32,
) -> Vec<ProviderAvailability<Tz>>
where
    Tz: TimeZone,
    I: IntoIterator<Item = (&'a str, &'a [AvailabilityWindow])>,
{
    let mut ranked: Vec<ProviderAvailability<Tz>> = providers
        .into_iter()
        .map(|(provider_id, windows)| ProviderAvailability {
            provider_id: provider_id.to_string(),
            next_available: find_next_available(windows, from, horizon_days),
        })
        .collect();

    ranked.sort_by(|a, b| match (&a.next_available, &b.next_available) {
        (Some(x), Some(y)) => x.cmp(y).then_with(|| a.provider_id.cmp(&b.provider_id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.provider_id.cmp(&b.provider_id),
    });
    ranked
}
