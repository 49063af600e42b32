//! # slot-engine
//!
//! Deterministic appointment-slot generation from weekly provider availability.
//!
//! A provider publishes recurring weekly windows ("Mondays 08:00-12:00"). The
//! engine turns those windows into the discrete, fixed-length session start
//! times a patient can book, finds a provider's next opening for directory
//! listings, and decides which days a date picker should enable. Every
//! computation is pure: "now" and "today" are parameters, never read from the
//! host clock.
//!
//! ## Modules
//!
//! - [`time`] — `TimeOfDay` arithmetic and date + time → instant conversion
//! - [`window`] — `AvailabilityWindow` and coercion of loosely typed storage rows
//! - [`policy`] — Session length, slot boundary, and horizon configuration
//! - [`generator`] — Windows + date → ordered slot start times
//! - [`horizon`] — Next available opening within a bounded lookahead
//! - [`selectable`] — Date-picker enable/disable predicate
//! - [`booking`] — Appointments and the double-booking guard
//! - [`recurrence`] — RRULE rendering and expansion for calendar feeds
//! - [`error`] — Error types

pub mod booking;
pub mod error;
pub mod generator;
pub mod horizon;
pub mod policy;
pub mod recurrence;
pub mod selectable;
pub mod time;
pub mod window;

pub use booking::{
    find_booking_conflicts, remove_booked_slots, Appointment, AppointmentStatus, BookingRequest,
    BookingStore, InMemoryBookingStore,
};
pub use error::SlotError;
pub use generator::{candidate_slots, generate_slots, upcoming_slots, CandidateSlot};
pub use horizon::{find_next_available, find_next_slot, rank_by_next_available, ProviderAvailability};
pub use policy::{SchedulingConfig, SessionPolicy, SlotBoundary};
pub use recurrence::{window_occurrences, window_rrule};
pub use selectable::{is_date_selectable, selectable_dates};
pub use time::{combine, TimeOfDay};
pub use window::{coerce_windows, parse_windows_json, AvailabilityWindow, RawAvailabilityWindow};
