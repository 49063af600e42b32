//! Session and horizon configuration shared by every scheduling call site.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};

/// Default length of one therapy session, in minutes.
pub const DEFAULT_SESSION_MINUTES: u32 = 50;

/// Lookahead used when searching for a provider's next available slot.
pub const NEXT_AVAILABLE_HORIZON_DAYS: u32 = 30;

/// Lookahead used when deciding which dates a date picker offers.
pub const DATE_PICKER_HORIZON_DAYS: u32 = 60;

/// How the last slot of a window relates to the window's end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotBoundary {
    /// Emit a slot whenever it *starts* before the window ends; the session
    /// itself may run past `end_time`.
    #[default]
    StartBeforeEnd,
    /// Emit a slot only when the whole session fits inside the window.
    FitWithinWindow,
}

impl std::str::FromStr for SlotBoundary {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "start_before_end" => Ok(SlotBoundary::StartBeforeEnd),
            "fit_within_window" => Ok(SlotBoundary::FitWithinWindow),
            other => Err(SlotError::InvalidConfig(format!(
                "unknown slot boundary '{}' (expected start-before-end or fit-within-window)",
                other
            ))),
        }
    }
}

/// Fixed-length sessions, stepped back to back through each window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPolicy {
    #[serde(default = "default_session_minutes")]
    pub duration_minutes: u32,
    #[serde(default)]
    pub boundary: SlotBoundary,
}

impl SessionPolicy {
    pub fn new(duration_minutes: u32) -> Self {
        Self {
            duration_minutes,
            boundary: SlotBoundary::default(),
        }
    }

    pub fn with_boundary(mut self, boundary: SlotBoundary) -> Self {
        self.boundary = boundary;
        self
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_MINUTES)
    }
}

/// Every scheduling constant in one place, so the booking wizard, the
/// directory dialog, and the next-available calculator cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingConfig {
    #[serde(default)]
    pub session: SessionPolicy,
    #[serde(default = "default_next_available_horizon")]
    pub next_available_horizon_days: u32,
    #[serde(default = "default_date_picker_horizon")]
    pub date_picker_horizon_days: u32,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            session: SessionPolicy::default(),
            next_available_horizon_days: NEXT_AVAILABLE_HORIZON_DAYS,
            date_picker_horizon_days: DATE_PICKER_HORIZON_DAYS,
        }
    }
}

impl SchedulingConfig {
    /// Parse a JSON config document. Missing fields take their defaults.
    ///
    /// # Errors
    /// Returns `SlotError::Json` for malformed JSON and `SlotError::InvalidConfig`
    /// when [`validate`](Self::validate) rejects the values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SchedulingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.session.duration_minutes == 0 {
            return Err(SlotError::InvalidConfig(
                "session duration must be at least one minute".to_string(),
            ));
        }
        if self.next_available_horizon_days == 0 {
            return Err(SlotError::InvalidConfig(
                "next-available horizon must be at least one day".to_string(),
            ));
        }
        if self.date_picker_horizon_days == 0 {
            return Err(SlotError::InvalidConfig(
                "date-picker horizon must be at least one day".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_session_minutes() -> u32 {
    DEFAULT_SESSION_MINUTES
}

fn default_next_available_horizon() -> u32 {
    NEXT_AVAILABLE_HORIZON_DAYS
}

fn default_date_picker_horizon() -> u32 {
    DATE_PICKER_HORIZON_DAYS
}
