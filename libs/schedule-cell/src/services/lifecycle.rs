// libs/schedule-cell/src/services/lifecycle.rs
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::models::{AppointmentStatus, ScheduleError};

/// Owns the appointment state machine: which edges exist, and the timing
/// guards layered on top of them. Pure rules, no store access.
pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// All valid next statuses for a given current status.
    pub fn valid_transitions(&self, current: &AppointmentStatus) -> Vec<AppointmentStatus> {
        match current {
            AppointmentStatus::Requested => vec![
                AppointmentStatus::Confirmed,
                AppointmentStatus::Cancelled,
            ],
            AppointmentStatus::Confirmed => vec![
                AppointmentStatus::CheckedIn,
                AppointmentStatus::Cancelled,
                AppointmentStatus::NoShow,
            ],
            AppointmentStatus::CheckedIn => vec![
                AppointmentStatus::InProgress,
                AppointmentStatus::Cancelled,
            ],
            AppointmentStatus::InProgress => vec![AppointmentStatus::Completed],
            // Terminal states - no transitions allowed
            AppointmentStatus::Completed => vec![],
            AppointmentStatus::Cancelled => vec![],
            AppointmentStatus::NoShow => vec![],
        }
    }

    /// Validate that a status transition is allowed by the edge table.
    pub fn validate_transition(
        &self,
        current: &AppointmentStatus,
        target: &AppointmentStatus,
    ) -> Result<(), ScheduleError> {
        debug!("Validating status transition from {} to {}", current, target);

        if !self.valid_transitions(current).contains(target) {
            warn!("Invalid status transition attempted: {} -> {}", current, target);
            return Err(ScheduleError::InvalidTransition {
                from: *current,
                to: *target,
            });
        }

        Ok(())
    }

    /// No-show is a time-guarded edge: the scheduled start has to have
    /// passed before a patient can be marked as absent.
    pub fn validate_no_show_timing(
        &self,
        start: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), ScheduleError> {
        if now <= start {
            warn!("No-show attempted before scheduled start {}", start);
            return Err(ScheduleError::TooEarly { start });
        }
        Ok(())
    }

    /// Booking-time window validation: the visit must lie in the future
    /// and run for a positive number of minutes.
    pub fn validate_booking_window(
        &self,
        start: DateTime<Utc>,
        duration_minutes: i32,
        now: DateTime<Utc>,
    ) -> Result<(), ScheduleError> {
        if duration_minutes <= 0 {
            return Err(ScheduleError::InvalidWindow(
                "Appointment duration must be positive".to_string(),
            ));
        }

        if start <= now {
            return Err(ScheduleError::InvalidWindow(
                "Appointment must be scheduled for a future time".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for AppointmentLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}
