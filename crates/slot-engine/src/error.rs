//! Error types for slot-engine operations.
//!
//! The pure computations (slot generation, horizon scanning, date selectability)
//! never fail: malformed input degrades to an empty result. Errors surface only
//! at the boundaries where loosely typed rows are coerced, configuration is
//! loaded, recurrence rules are expanded, or a booking is written.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlotError {
    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Invalid day of week: {0} (expected 0 = Sunday .. 6 = Saturday)")]
    InvalidDayOfWeek(i64),

    #[error("Invalid availability window: start {start} is not before end {end}")]
    InvalidWindow { start: String, end: String },

    #[error("Invalid scheduling configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid recurrence rule: {0}")]
    InvalidRule(String),

    #[error("Invalid session duration: {0} minutes (must be at least 1)")]
    InvalidDuration(u32),

    #[error("Slot already booked for provider {provider_id} at {scheduled_at}")]
    SlotTaken {
        provider_id: String,
        scheduled_at: String,
    },

    #[error("Appointment already exists: {0}")]
    DuplicateAppointment(String),

    #[error("Appointment not found: {0}")]
    NotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SlotError>;
