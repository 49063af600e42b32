//! Property-based tests for slot generation, horizon scanning, and the
//! date-picker predicate using proptest.
//!
//! These tests verify invariants that should hold for *any* set of windows,
//! not just the fixed scenarios in the per-module test files.

use chrono::{Datelike, Days, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use slot_engine::window::day_of_week_from_index;
use slot_engine::{
    find_next_available, generate_slots, is_date_selectable, AvailabilityWindow, SessionPolicy,
    SlotBoundary, TimeOfDay,
};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn minutes_to_time(minutes: u32) -> TimeOfDay {
    TimeOfDay::new(minutes / 60, minutes % 60).unwrap()
}

/// A well-formed window: `start < end`, both within the same day.
fn arb_window() -> impl Strategy<Value = AvailabilityWindow> {
    (0i64..7, 0u32..1439, any::<bool>())
        .prop_flat_map(|(day, start, active)| (Just(day), Just(start), (start + 1)..1440, Just(active)))
        .prop_map(|(day, start, end, active)| {
            AvailabilityWindow::new(
                "provider",
                day_of_week_from_index(day).unwrap(),
                minutes_to_time(start),
                minutes_to_time(end),
            )
            .unwrap()
            .with_active(active)
        })
}

fn arb_windows() -> impl Strategy<Value = Vec<AvailabilityWindow>> {
    prop::collection::vec(arb_window(), 0..6)
}

/// Dates in 2025-2027. Day is capped at 28 to avoid invalid month/day combos.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2025i32..=2027, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn arb_policy() -> impl Strategy<Value = SessionPolicy> {
    (
        15u32..=120,
        prop_oneof![Just(SlotBoundary::StartBeforeEnd), Just(SlotBoundary::FitWithinWindow)],
    )
        .prop_map(|(minutes, boundary)| SessionPolicy::new(minutes).with_boundary(boundary))
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Identical inputs always produce identical, identically ordered output.
    #[test]
    fn generation_is_deterministic(windows in arb_windows(), date in arb_date(), policy in arb_policy()) {
        let first = generate_slots(&windows, date, &policy);
        let second = generate_slots(&windows, date, &policy);
        prop_assert_eq!(first, second);
    }

    /// Output is sorted ascending.
    #[test]
    fn slots_are_sorted(windows in arb_windows(), date in arb_date(), policy in arb_policy()) {
        let slots = generate_slots(&windows, date, &policy);
        prop_assert!(slots.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    /// Every slot starts inside some active window for the date's weekday.
    #[test]
    fn every_slot_lies_in_a_matching_window(windows in arb_windows(), date in arb_date(), policy in arb_policy()) {
        for slot in generate_slots(&windows, date, &policy) {
            prop_assert!(
                windows.iter().any(|w| w.applies_to(date) && slot.is_within(w.start_time, w.end_time)),
                "slot {} is outside every matching window", slot
            );
        }
    }

    /// Under the fit-within-window policy the whole session ends by the window's close.
    #[test]
    fn fitted_sessions_end_inside_their_window(windows in arb_windows(), date in arb_date(), minutes in 15u32..=120) {
        let policy = SessionPolicy::new(minutes).with_boundary(SlotBoundary::FitWithinWindow);
        for slot in generate_slots(&windows, date, &policy) {
            let end = slot.advance(minutes);
            prop_assert!(end.is_some());
            let end = end.unwrap();
            prop_assert!(windows.iter().any(|w| w.applies_to(date) && w.start_time <= slot && end <= w.end_time));
        }
    }

    /// Windows recurring on other weekdays never contribute.
    #[test]
    fn other_weekdays_yield_nothing(windows in arb_windows(), date in arb_date(), policy in arb_policy()) {
        let elsewhere: Vec<AvailabilityWindow> = windows
            .into_iter()
            .filter(|w| w.day_of_week != date.weekday())
            .collect();
        prop_assert!(generate_slots(&elsewhere, date, &policy).is_empty());
    }

    /// Inactive windows never contribute.
    #[test]
    fn inactive_windows_yield_nothing(windows in arb_windows(), date in arb_date(), policy in arb_policy()) {
        let inactive: Vec<AvailabilityWindow> = windows.into_iter().map(|w| w.with_active(false)).collect();
        prop_assert!(generate_slots(&inactive, date, &policy).is_empty());
    }

    /// The scan never reports anything beyond its horizon, and an all-inactive
    /// provider has nothing at all.
    #[test]
    fn next_available_stays_within_horizon(
        windows in arb_windows(),
        date in arb_date(),
        hour in 0u32..24,
        horizon in 0u32..=45,
    ) {
        let from = Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap());

        if let Some(next) = find_next_available(&windows, &from, horizon) {
            prop_assert!(next > from);
            let last_day = date.checked_add_days(Days::new(u64::from(horizon))).unwrap();
            prop_assert!(next.date_naive() < last_day);
        }

        let inactive: Vec<AvailabilityWindow> = windows.into_iter().map(|w| w.with_active(false)).collect();
        prop_assert_eq!(find_next_available(&inactive, &from, horizon), None);
    }

    /// Rescanning from a found opening never goes backwards.
    #[test]
    fn next_available_is_monotonic(windows in arb_windows(), date in arb_date(), hour in 0u32..24) {
        let from = Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap());

        if let Some(found) = find_next_available(&windows, &from, 30) {
            if let Some(again) = find_next_available(&windows, &found, 30) {
                prop_assert!(again >= found);
            }
        }
    }

    /// Under either boundary policy a date within the horizon is selectable
    /// exactly when it has at least one slot.
    #[test]
    fn selectable_matches_slot_availability(
        windows in arb_windows(),
        today in arb_date(),
        offset in 0u64..=60,
        policy in arb_policy(),
    ) {
        let date = today.checked_add_days(Days::new(offset)).unwrap();
        let has_slots = !generate_slots(&windows, date, &policy).is_empty();
        prop_assert_eq!(is_date_selectable(&windows, date, today, 60, &policy), has_slots);
    }
}
