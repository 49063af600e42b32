//! Date-picker predicate: which calendar days a patient may pick at all.

use chrono::{Days, NaiveDate};

use crate::generator::opens_a_slot;
use crate::policy::SessionPolicy;
use crate::window::{windows_for_day, AvailabilityWindow};

/// Decide whether `date` should be enabled in a date picker.
///
/// A date is disabled when it is before `today`, more than `horizon_days`
/// after `today`, or when none of the provider's active windows on its weekday
/// offers a session under `policy`. `today + horizon_days` itself is still
/// selectable. For any date in range the answer matches
/// `!generate_slots(windows, date, policy).is_empty()`.
pub fn is_date_selectable(
    windows: &[AvailabilityWindow],
    date: NaiveDate,
    today: NaiveDate,
    horizon_days: u32,
    policy: &SessionPolicy,
) -> bool {
    if date < today {
        return false;
    }
    match today.checked_add_days(Days::new(u64::from(horizon_days))) {
        Some(last) if date <= last => {}
        _ => return false,
    }
    windows_for_day(windows, date).any(|w| opens_a_slot(w, policy))
}

/// Every selectable date from `today` through `today + horizon_days`, ascending.
pub fn selectable_dates(
    windows: &[AvailabilityWindow],
    today: NaiveDate,
    horizon_days: u32,
    policy: &SessionPolicy,
) -> Vec<NaiveDate> {
    (0..=u64::from(horizon_days))
        .map_while(|day| today.checked_add_days(Days::new(day)))
        .filter(|date| is_date_selectable(windows, *date, today, horizon_days, policy))
        .collect()
}
