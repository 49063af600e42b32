//! Appointments and the double-booking guard.
//!
//! The slot generator only offers candidates; it cannot stop two patients from
//! picking the same slot at the same moment. Exclusivity has to be enforced
//! where appointments are written, which is what [`BookingStore`] models: an
//! implementation must reject a booking that overlaps a non-cancelled
//! appointment of the same provider. A hosted database gets the same guarantee
//! from a uniqueness constraint on `(provider_id, scheduled_at)` over
//! non-cancelled rows, or from a conditional insert.
//!
//! Two appointments overlap when `a.start < b.end && b.start < a.end`.
//! Back-to-back appointments (one ends exactly when the next starts) do not.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Result, SlotError};
use crate::generator::CandidateSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Cancelled appointments free their time; every other status holds it.
    pub fn blocks_calendar(self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }
}

/// A persisted booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    #[serde(alias = "therapist_id")]
    pub provider_id: String,
    #[serde(default)]
    pub patient_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: u32,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub meeting_room_id: Option<String>,
}

impl Appointment {
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.scheduled_at + Duration::minutes(i64::from(self.duration_minutes))
    }

    /// True when this appointment holds time in `[start, end)`.
    pub fn occupies(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.status.blocks_calendar() && self.scheduled_at < end && start < self.ends_at()
    }

    /// Both appointments hold time for the same provider and their intervals intersect.
    pub fn overlaps(&self, other: &Appointment) -> bool {
        self.provider_id == other.provider_id
            && other.status.blocks_calendar()
            && self.occupies(other.scheduled_at, other.ends_at())
    }
}

/// Two existing appointments that double-book a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingConflict {
    pub first: Appointment,
    pub second: Appointment,
    pub overlap_minutes: i64,
}

/// Audit a set of stored appointments for double bookings.
///
/// Every overlapping pair is reported once, in input order.
pub fn find_booking_conflicts(appointments: &[Appointment]) -> Vec<BookingConflict> {
    let mut conflicts = Vec::new();

    for (i, a) in appointments.iter().enumerate() {
        for b in &appointments[i + 1..] {
            if a.overlaps(b) {
                let overlap_start = a.scheduled_at.max(b.scheduled_at);
                let overlap_end = a.ends_at().min(b.ends_at());
                conflicts.push(BookingConflict {
                    first: a.clone(),
                    second: b.clone(),
                    overlap_minutes: (overlap_end - overlap_start).num_minutes(),
                });
            }
        }
    }

    conflicts
}

/// Drop candidate slots whose session would overlap an existing appointment
/// of the same provider.
///
/// `tz` is the zone the slots' wall-clock times are expressed in. Slots that
/// have no instant in `tz` (DST gap) are dropped as well.
pub fn remove_booked_slots<Tz: TimeZone>(
    slots: Vec<CandidateSlot>,
    appointments: &[Appointment],
    duration_minutes: u32,
    tz: &Tz,
) -> Vec<CandidateSlot> {
    let session = Duration::minutes(i64::from(duration_minutes));

    slots
        .into_iter()
        .filter(|slot| {
            let Some(start) = slot.starts_at(tz) else {
                return false;
            };
            let start = start.with_timezone(&Utc);
            let end = start + session;
            !appointments
                .iter()
                .any(|appt| appt.provider_id == slot.provider_id && appt.occupies(start, end))
        })
        .collect()
}

/// A patient's choice of slot, not yet persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub patient_id: String,
    pub slot: CandidateSlot,
    #[serde(default)]
    pub is_online: bool,
}

impl BookingRequest {
    /// Turn the chosen slot into a pending appointment.
    ///
    /// Online sessions get a fresh meeting room id.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidDuration` for a zero-minute session and
    /// `SlotError::InvalidTime` when the slot's wall-clock time does not exist
    /// in `tz`.
    pub fn into_appointment<Tz: TimeZone>(self, duration_minutes: u32, tz: &Tz) -> Result<Appointment> {
        if duration_minutes == 0 {
            return Err(SlotError::InvalidDuration(duration_minutes));
        }

        let scheduled_at = self
            .slot
            .starts_at(tz)
            .ok_or_else(|| {
                SlotError::InvalidTime(format!("{} {}", self.slot.date, self.slot.start_time))
            })?
            .with_timezone(&Utc);

        Ok(Appointment {
            id: Uuid::new_v4().to_string(),
            provider_id: self.slot.provider_id,
            patient_id: self.patient_id,
            scheduled_at,
            duration_minutes,
            status: AppointmentStatus::Pending,
            is_online: self.is_online,
            meeting_room_id: self.is_online.then(|| Uuid::new_v4().to_string()),
        })
    }
}

/// Where appointments are written. Implementations own the no-overlap rule.
pub trait BookingStore {
    /// Persist `appointment` unless it overlaps a blocking appointment of the
    /// same provider. Appointment ids are unique within a store.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidDuration` for a zero-minute appointment,
    /// `SlotError::DuplicateAppointment` when the id is already stored, and
    /// `SlotError::SlotTaken` when the time is already held.
    fn book(&mut self, appointment: Appointment) -> Result<Appointment>;

    /// Mark an appointment cancelled, releasing its time.
    ///
    /// # Errors
    /// Returns `SlotError::NotFound` for an unknown id.
    fn cancel(&mut self, appointment_id: &str) -> Result<Appointment>;

    /// All appointments for a provider, ordered by start.
    fn appointments_for(&self, provider_id: &str) -> Vec<Appointment>;
}

/// A [`BookingStore`] held in memory. The check and the insert happen under
/// one `&mut self` borrow, so they cannot interleave with another booking.
#[derive(Debug, Default)]
pub struct InMemoryBookingStore {
    appointments: Vec<Appointment>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }
}

impl BookingStore for InMemoryBookingStore {
    fn book(&mut self, appointment: Appointment) -> Result<Appointment> {
        if appointment.duration_minutes == 0 {
            return Err(SlotError::InvalidDuration(appointment.duration_minutes));
        }
        if self.appointments.iter().any(|existing| existing.id == appointment.id) {
            return Err(SlotError::DuplicateAppointment(appointment.id));
        }
        if appointment.status.blocks_calendar()
            && self.appointments.iter().any(|existing| existing.overlaps(&appointment))
        {
            warn!(
                provider_id = %appointment.provider_id,
                scheduled_at = %appointment.scheduled_at,
                "rejected double booking"
            );
            return Err(SlotError::SlotTaken {
                provider_id: appointment.provider_id,
                scheduled_at: appointment.scheduled_at.to_rfc3339(),
            });
        }

        debug!(id = %appointment.id, provider_id = %appointment.provider_id, "appointment booked");
        self.appointments.push(appointment.clone());
        Ok(appointment)
    }

    fn cancel(&mut self, appointment_id: &str) -> Result<Appointment> {
        let appointment = self
            .appointments
            .iter_mut()
            .find(|a| a.id == appointment_id)
            .ok_or_else(|| SlotError::NotFound(appointment_id.to_string()))?;
        appointment.status = AppointmentStatus::Cancelled;
        Ok(appointment.clone())
    }

    fn appointments_for(&self, provider_id: &str) -> Vec<Appointment> {
        let mut found: Vec<Appointment> = self
            .appointments
            .iter()
            .filter(|a| a.provider_id == provider_id)
            .cloned()
            .collect();
        found.sort_by_key(|a| a.scheduled_at);
        found
    }
}
