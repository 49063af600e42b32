//! Tests for the date-picker predicate.

use chrono::{Days, NaiveDate, Weekday};
use slot_engine::policy::DATE_PICKER_HORIZON_DAYS;
use slot_engine::{
    generate_slots, is_date_selectable, selectable_dates, AvailabilityWindow, SessionPolicy, SlotBoundary,
};

fn window(provider: &str, day: Weekday, start: &str, end: &str) -> AvailabilityWindow {
    AvailabilityWindow::new(provider, day, start.parse().unwrap(), end.parse().unwrap()).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Monday, 2026-03-16.
fn today() -> NaiveDate {
    date(2026, 3, 16)
}

fn tuesday_afternoons() -> Vec<AvailabilityWindow> {
    vec![window("dr-lee", Weekday::Tue, "14:00", "15:00")]
}

#[test]
fn coming_wednesday_is_disabled() {
    assert!(!is_date_selectable(
        &tuesday_afternoons(),
        date(2026, 3, 18),
        today(),
        DATE_PICKER_HORIZON_DAYS,
        &SessionPolicy::default()
    ));
}

#[test]
fn coming_tuesday_is_enabled() {
    assert!(is_date_selectable(
        &tuesday_afternoons(),
        date(2026, 3, 17),
        today(),
        DATE_PICKER_HORIZON_DAYS,
        &SessionPolicy::default()
    ));
}

#[test]
fn tuesday_ninety_days_out_is_beyond_the_cap() {
    // 2026-06-16 is a Tuesday, 92 days after today.
    assert!(!is_date_selectable(
        &tuesday_afternoons(),
        date(2026, 6, 16),
        today(),
        DATE_PICKER_HORIZON_DAYS,
        &SessionPolicy::default()
    ));
}

#[test]
fn last_day_of_the_horizon_is_still_selectable() {
    let windows = vec![window("dr-lee", Weekday::Fri, "09:00", "10:00")];
    // 2026-05-15 is a Friday, exactly 60 days after today.
    let last = today().checked_add_days(Days::new(60)).unwrap();
    assert_eq!(last, date(2026, 5, 15));

    assert!(is_date_selectable(&windows, last, today(), 60, &SessionPolicy::default()));
    assert!(!is_date_selectable(&windows, last, today(), 59, &SessionPolicy::default()));
}

#[test]
fn past_dates_are_disabled() {
    let windows = vec![window("dr-lee", Weekday::Mon, "09:00", "10:00")];

    assert!(!is_date_selectable(&windows, date(2026, 3, 9), today(), 60, &SessionPolicy::default()));
    assert!(is_date_selectable(&windows, today(), today(), 60, &SessionPolicy::default()));
}

#[test]
fn inactive_windows_do_not_enable_a_day() {
    let windows = vec![window("dr-lee", Weekday::Tue, "14:00", "15:00").with_active(false)];

    assert!(!is_date_selectable(&windows, date(2026, 3, 17), today(), 60, &SessionPolicy::default()));
}

#[test]
fn selectable_dates_lists_every_matching_day_in_range() {
    let dates = selectable_dates(&tuesday_afternoons(), today(), 22, &SessionPolicy::default());

    assert_eq!(
        dates,
        vec![date(2026, 3, 17), date(2026, 3, 24), date(2026, 3, 31), date(2026, 4, 7)]
    );
}

#[test]
fn selectable_dates_agree_with_slot_generation() {
    let windows = vec![
        window("dr-lee", Weekday::Tue, "14:00", "15:00"),
        window("dr-lee", Weekday::Sat, "10:00", "10:20"),
    ];
    let policy = SessionPolicy::default();

    for offset in 0..=60u64 {
        let day = today().checked_add_days(Days::new(offset)).unwrap();
        let has_slots = !generate_slots(&windows, day, &policy).is_empty();
        assert_eq!(is_date_selectable(&windows, day, today(), 60, &policy), has_slots, "{day}");
    }
}

#[test]
fn short_window_is_disabled_when_sessions_must_fit() {
    // 40 minutes cannot hold a 50-minute session that has to end inside it.
    let windows = vec![window("dr-lee", Weekday::Mon, "09:00", "09:40")];
    let fitted = SessionPolicy::new(50).with_boundary(SlotBoundary::FitWithinWindow);

    assert!(generate_slots(&windows, today(), &fitted).is_empty());
    assert!(!is_date_selectable(&windows, today(), today(), 60, &fitted));
    assert!(selectable_dates(&windows, today(), 14, &fitted).is_empty());

    let overrun = SessionPolicy::new(50);
    assert_eq!(generate_slots(&windows, today(), &overrun).len(), 1);
    assert!(is_date_selectable(&windows, today(), today(), 60, &overrun));
}

#[test]
fn zero_minute_sessions_enable_nothing() {
    let policy = SessionPolicy::new(0);

    assert!(!is_date_selectable(&tuesday_afternoons(), date(2026, 3, 17), today(), 60, &policy));
}

#[test]
fn fitted_selection_agrees_with_fitted_generation() {
    let windows = vec![
        window("dr-lee", Weekday::Tue, "14:00", "15:00"),
        window("dr-lee", Weekday::Wed, "09:00", "09:30"),
        window("dr-okafor", Weekday::Wed, "16:00", "16:45"),
        window("dr-okafor", Weekday::Sat, "10:00", "10:20"),
    ];

    for minutes in [20, 30, 45, 50, 60] {
        let policy = SessionPolicy::new(minutes).with_boundary(SlotBoundary::FitWithinWindow);
        for offset in 0..=14u64 {
            let day = today().checked_add_days(Days::new(offset)).unwrap();
            let has_slots = !generate_slots(&windows, day, &policy).is_empty();
            assert_eq!(
                is_date_selectable(&windows, day, today(), 60, &policy),
                has_slots,
                "{day} with {minutes}-minute sessions"
            );
        }
    }
}
