use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_store::Table;

use crate::models::{Appointment, ScheduleError};

/// Scans a provider's calendar for double-bookings. Conflicts are decided
/// purely by the current status of overlapping records, so a cancelled
/// appointment frees its window with no release step.
pub struct ConflictDetectionService {
    appointments: Arc<Table<Appointment>>,
}

impl ConflictDetectionService {
    pub fn new(appointments: Arc<Table<Appointment>>) -> Self {
        Self { appointments }
    }

    /// Slot-holding appointments for `provider_id` overlapping
    /// `[start, end)`, excluding `exclude_appointment_id` when checking an
    /// existing record against its own calendar.
    pub async fn find_conflicts(
        &self,
        provider_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_appointment_id: Option<Uuid>,
    ) -> Vec<Appointment> {
        debug!(
            "Checking conflicts for provider {} from {} to {}",
            provider_id, start, end
        );

        self.appointments
            .filter(|apt| {
                apt.provider_id == provider_id
                    && apt.status.holds_slot()
                    && Some(apt.id) != exclude_appointment_id
                    && Self::windows_overlap(start, end, apt.start, apt.scheduled_end_time())
            })
            .await
    }

    /// Fails with `SlotConflict` when the window is already taken.
    pub async fn assert_slot_free(
        &self,
        provider_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<(), ScheduleError> {
        let conflicts = self
            .find_conflicts(provider_id, start, end, exclude_appointment_id)
            .await;

        if !conflicts.is_empty() {
            warn!(
                "Conflict detected for provider {} - {} overlapping appointments",
                provider_id,
                conflicts.len()
            );
            return Err(ScheduleError::SlotConflict);
        }

        Ok(())
    }

    /// Half-open interval overlap: start1 < end2 AND start2 < end1.
    pub fn windows_overlap(
        start1: DateTime<Utc>,
        end1: DateTime<Utc>,
        start2: DateTime<Utc>,
        end2: DateTime<Utc>,
    ) -> bool {
        start1 < end2 && start2 < end1
    }
}
