//! WASM bindings for slot-engine.
//!
//! Exposes slot generation, next-available scanning, and the date-picker
//! predicate to the browser via `wasm-bindgen`. All complex types are passed
//! as JSON strings. Instants are RFC 3339 strings; the offset they carry is
//! taken as the viewer's timezone for every wall-clock computation.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p slot-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir packages/slot-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/slot_engine_wasm.wasm
//! ```

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Serialize;
use slot_engine::{Appointment, AvailabilityWindow, CandidateSlot, SessionPolicy, SlotBoundary};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct UpcomingSlotDto {
    provider_id: String,
    date: String,
    start_time: String,
    starts_at: String,
}

// ---------------------------------------------------------------------------
// Helpers: parse boundary values
// ---------------------------------------------------------------------------

/// Parse an ISO 8601 datetime string, keeping its offset.
///
/// Accepts RFC 3339 (e.g., "2026-03-16T09:00:00+01:00") and naive local time
/// (e.g., "2026-03-16T09:00:00"), which is interpreted as UTC.
fn parse_instant(s: &str) -> Result<DateTime<FixedOffset>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }
    let utc = FixedOffset::east_opt(0).ok_or_else(|| "UTC offset unavailable".to_string())?;
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|ndt| ndt.and_utc().with_timezone(&utc))
        .map_err(|e| format!("Invalid datetime '{}': {}", s, e))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("Invalid date '{}': {}", s, e))
}

fn parse_windows(json: &str) -> Result<Vec<AvailabilityWindow>, String> {
    slot_engine::parse_windows_json(json).map_err(|e| format!("Invalid windows JSON: {}", e))
}

fn policy(duration_minutes: u32, boundary: Option<&str>) -> Result<SessionPolicy, String> {
    let boundary = match boundary {
        Some(b) => b.parse::<SlotBoundary>().map_err(|e| e.to_string())?,
        None => SlotBoundary::default(),
    };
    Ok(SessionPolicy::new(duration_minutes).with_boundary(boundary))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

// ---------------------------------------------------------------------------
// Implementations (plain Rust errors, testable off-wasm)
// ---------------------------------------------------------------------------

fn generate_slots_impl(
    windows_json: &str,
    date: &str,
    duration_minutes: u32,
    boundary: Option<&str>,
) -> Result<String, String> {
    let windows = parse_windows(windows_json)?;
    let date = parse_date(date)?;
    let policy = policy(duration_minutes, boundary)?;

    let slots: Vec<String> = slot_engine::generate_slots(&windows, date, &policy)
        .iter()
        .map(|t| t.to_string())
        .collect();
    to_json(&slots)
}

fn upcoming_slots_impl(
    windows_json: &str,
    date: &str,
    duration_minutes: u32,
    now: &str,
) -> Result<String, String> {
    let windows = parse_windows(windows_json)?;
    let date = parse_date(date)?;
    let now = parse_instant(now)?;
    let policy = policy(duration_minutes, None)?;
    let tz = now.timezone();

    let dtos: Vec<UpcomingSlotDto> = slot_engine::upcoming_slots(&windows, date, &policy, &now)
        .into_iter()
        .filter_map(|slot| {
            let starts_at = slot.starts_at(&tz)?.to_rfc3339();
            Some(UpcomingSlotDto {
                provider_id: slot.provider_id,
                date: slot.date.to_string(),
                start_time: slot.start_time.to_string(),
                starts_at,
            })
        })
        .collect();
    to_json(&dtos)
}

fn find_next_available_impl(
    windows_json: &str,
    from: &str,
    horizon_days: u32,
) -> Result<Option<String>, String> {
    let windows = parse_windows(windows_json)?;
    let from = parse_instant(from)?;

    Ok(slot_engine::find_next_available(&windows, &from, horizon_days).map(|dt| dt.to_rfc3339()))
}

fn is_date_selectable_impl(
    windows_json: &str,
    date: &str,
    today: &str,
    horizon_days: u32,
    duration_minutes: u32,
    boundary: Option<&str>,
) -> Result<bool, String> {
    let windows = parse_windows(windows_json)?;
    let policy = policy(duration_minutes, boundary)?;
    Ok(slot_engine::is_date_selectable(
        &windows,
        parse_date(date)?,
        parse_date(today)?,
        horizon_days,
        &policy,
    ))
}

fn selectable_dates_impl(
    windows_json: &str,
    today: &str,
    horizon_days: u32,
    duration_minutes: u32,
    boundary: Option<&str>,
) -> Result<String, String> {
    let windows = parse_windows(windows_json)?;
    let policy = policy(duration_minutes, boundary)?;
    let dates: Vec<String> =
        slot_engine::selectable_dates(&windows, parse_date(today)?, horizon_days, &policy)
            .iter()
            .map(|d| d.to_string())
            .collect();
    to_json(&dates)
}

fn remove_booked_slots_impl(
    slots_json: &str,
    appointments_json: &str,
    duration_minutes: u32,
    now: &str,
) -> Result<String, String> {
    let slots: Vec<CandidateSlot> =
        serde_json::from_str(slots_json).map_err(|e| format!("Invalid slots JSON: {}", e))?;
    let appointments: Vec<Appointment> = serde_json::from_str(appointments_json)
        .map_err(|e| format!("Invalid appointments JSON: {}", e))?;
    let tz = parse_instant(now)?.timezone();

    let open = slot_engine::remove_booked_slots(slots, &appointments, duration_minutes, &tz);
    to_json(&open)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Generate the ordered session start times offered on a date.
///
/// `windows_json` is a JSON array of availability rows
/// (`{provider_id, day_of_week, start_time, end_time, is_active}`); malformed rows
/// are skipped. `date` is `YYYY-MM-DD`. `boundary` is `"start-before-end"`
/// (default) or `"fit-within-window"`. Returns a JSON array of `"HH:MM"` strings.
#[wasm_bindgen(js_name = "generateSlots")]
pub fn generate_slots(
    windows_json: &str,
    date: &str,
    duration_minutes: u32,
    boundary: Option<String>,
) -> Result<String, JsValue> {
    generate_slots_impl(windows_json, date, duration_minutes, boundary.as_deref())
        .map_err(|e| JsValue::from_str(&e))
}

/// Slots on `date` that start strictly after `now` (RFC 3339).
///
/// Returns a JSON array of `{provider_id, date, start_time, starts_at}` objects.
#[wasm_bindgen(js_name = "upcomingSlots")]
pub fn upcoming_slots(
    windows_json: &str,
    date: &str,
    duration_minutes: u32,
    now: &str,
) -> Result<String, JsValue> {
    upcoming_slots_impl(windows_json, date, duration_minutes, now).map_err(|e| JsValue::from_str(&e))
}

/// The earliest window opening strictly after `from`, as RFC 3339 in `from`'s
/// offset, or `undefined` when nothing opens within `horizon_days`.
#[wasm_bindgen(js_name = "findNextAvailable")]
pub fn find_next_available(
    windows_json: &str,
    from: &str,
    horizon_days: u32,
) -> Result<Option<String>, JsValue> {
    find_next_available_impl(windows_json, from, horizon_days).map_err(|e| JsValue::from_str(&e))
}

/// Whether a date picker should enable `date` (both dates `YYYY-MM-DD`).
///
/// `duration_minutes` and `boundary` must match what `generateSlots` is called
/// with, so an enabled date always has at least one slot.
#[wasm_bindgen(js_name = "isDateSelectable")]
pub fn is_date_selectable(
    windows_json: &str,
    date: &str,
    today: &str,
    horizon_days: u32,
    duration_minutes: u32,
    boundary: Option<String>,
) -> Result<bool, JsValue> {
    is_date_selectable_impl(
        windows_json,
        date,
        today,
        horizon_days,
        duration_minutes,
        boundary.as_deref(),
    )
    .map_err(|e| JsValue::from_str(&e))
}

/// Every selectable date from `today` through `today + horizon_days`, as a
/// JSON array of `YYYY-MM-DD` strings.
#[wasm_bindgen(js_name = "selectableDates")]
pub fn selectable_dates(
    windows_json: &str,
    today: &str,
    horizon_days: u32,
    duration_minutes: u32,
    boundary: Option<String>,
) -> Result<String, JsValue> {
    selectable_dates_impl(windows_json, today, horizon_days, duration_minutes, boundary.as_deref())
        .map_err(|e| JsValue::from_str(&e))
}

/// Filter candidate slots (`{provider_id, date, start_time}`) against existing
/// appointments. Wall-clock slot times are read in `now`'s offset.
#[wasm_bindgen(js_name = "removeBookedSlots")]
pub fn remove_booked_slots(
    slots_json: &str,
    appointments_json: &str,
    duration_minutes: u32,
    now: &str,
) -> Result<String, JsValue> {
    remove_booked_slots_impl(slots_json, appointments_json, duration_minutes, now)
        .map_err(|e| JsValue::from_str(&e))
}
