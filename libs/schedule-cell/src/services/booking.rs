// libs/schedule-cell/src/services/booking.rs
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use notification_cell::NotificationDispatchService;
use shared_models::events::{DomainEvent, EventActor};
use shared_store::{LockMap, Table};

use crate::models::{
    Appointment, AppointmentStatus, BookAppointmentRequest, CancelAppointmentRequest,
    ScheduleError,
};
use crate::services::conflict::ConflictDetectionService;
use crate::services::lifecycle::AppointmentLifecycleService;

/// Owns the appointment aggregate: booking, the status state machine, and
/// the per-provider no-overlap invariant. Every command validates first
/// and mutates second, so a failed call leaves the store untouched.
pub struct AppointmentSchedulingService {
    appointments: Arc<Table<Appointment>>,
    provider_locks: LockMap,
    conflict_service: ConflictDetectionService,
    lifecycle_service: AppointmentLifecycleService,
    dispatcher: Arc<NotificationDispatchService>,
}

impl AppointmentSchedulingService {
    pub fn new(dispatcher: Arc<NotificationDispatchService>) -> Self {
        let appointments = Arc::new(Table::new());
        let conflict_service = ConflictDetectionService::new(Arc::clone(&appointments));

        Self {
            appointments,
            provider_locks: LockMap::new(),
            conflict_service,
            lifecycle_service: AppointmentLifecycleService::new(),
            dispatcher,
        }
    }

    /// Book a new appointment in `Requested` status. The provider lock is
    /// held across the conflict check and the insert so two concurrent
    /// requests for the same window cannot both pass the check.
    pub async fn request_appointment(
        &self,
        request: BookAppointmentRequest,
        now: DateTime<Utc>,
    ) -> Result<Appointment, ScheduleError> {
        info!(
            "Booking requested for patient {} with provider {} at {}",
            request.patient_id, request.provider_id, request.start
        );

        self.lifecycle_service
            .validate_booking_window(request.start, request.duration_minutes, now)?;

        let end = request.start + ChronoDuration::minutes(request.duration_minutes as i64);

        let _guard = self.provider_locks.acquire(request.provider_id).await;

        self.conflict_service
            .assert_slot_free(request.provider_id, request.start, end, None)
            .await?;

        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            provider_id: request.provider_id,
            start: request.start,
            duration_minutes: request.duration_minutes,
            location: if request.modality.is_remote() {
                None
            } else {
                request.location
            },
            modality: request.modality,
            reason: request.reason,
            status: AppointmentStatus::Requested,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        };

        self.appointments
            .insert(appointment.id, appointment.clone())
            .await;

        info!("Appointment {} created in requested status", appointment.id);
        Ok(appointment)
    }

    /// Move an appointment along the lifecycle state machine. Emits the
    /// matching domain event once the new status is stored.
    pub async fn transition(
        &self,
        appointment_id: Uuid,
        target: AppointmentStatus,
        actor: EventActor,
        now: DateTime<Utc>,
    ) -> Result<Appointment, ScheduleError> {
        self.apply_transition(appointment_id, target, actor, None, now)
            .await
    }

    /// Cancellation wrapper over the lifecycle edge table, carrying the
    /// reason and the cancelling party. The vacated window is bookable
    /// immediately: conflict detection only looks at current statuses.
    pub async fn cancel(
        &self,
        appointment_id: Uuid,
        request: CancelAppointmentRequest,
        now: DateTime<Utc>,
    ) -> Result<Appointment, ScheduleError> {
        self.apply_transition(
            appointment_id,
            AppointmentStatus::Cancelled,
            request.cancelled_by,
            Some(request.reason),
            now,
        )
        .await
    }

    pub async fn get(&self, appointment_id: Uuid) -> Result<Appointment, ScheduleError> {
        self.appointments
            .get(appointment_id)
            .await
            .ok_or(ScheduleError::NotFound)
    }

    /// Provider calendar, ascending by start time.
    pub async fn provider_schedule(&self, provider_id: Uuid) -> Vec<Appointment> {
        let mut items = self
            .appointments
            .filter(|apt| apt.provider_id == provider_id)
            .await;
        items.sort_by_key(|apt| apt.start);
        items
    }

    /// A patient's appointments across providers, ascending by start time.
    pub async fn patient_appointments(&self, patient_id: Uuid) -> Vec<Appointment> {
        let mut items = self
            .appointments
            .filter(|apt| apt.patient_id == patient_id)
            .await;
        items.sort_by_key(|apt| apt.start);
        items
    }

    async fn apply_transition(
        &self,
        appointment_id: Uuid,
        target: AppointmentStatus,
        actor: EventActor,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Appointment, ScheduleError> {
        let peek = self
            .appointments
            .get(appointment_id)
            .await
            .ok_or(ScheduleError::NotFound)?;

        // Transitions serialize per provider so confirmation cannot race
        // a booking (or another confirmation) past the overlap check.
        let _guard = self.provider_locks.acquire(peek.provider_id).await;

        // Re-read under the lock; a concurrent command may have landed.
        let current = self
            .appointments
            .get(appointment_id)
            .await
            .ok_or(ScheduleError::NotFound)?;

        self.lifecycle_service
            .validate_transition(&current.status, &target)?;

        if target == AppointmentStatus::NoShow {
            self.lifecycle_service
                .validate_no_show_timing(current.start, now)?;
        }

        // Two overlapping requests can coexist, but only one of them may
        // confirm into the slot.
        if target == AppointmentStatus::Confirmed {
            self.conflict_service
                .assert_slot_free(
                    current.provider_id,
                    current.start,
                    current.scheduled_end_time(),
                    Some(current.id),
                )
                .await?;
        }

        let stored_reason = reason.clone();
        let updated = self
            .appointments
            .update(appointment_id, |apt| {
                apt.status = target;
                apt.updated_at = now;
                if stored_reason.is_some() {
                    apt.cancellation_reason = stored_reason.clone();
                }
            })
            .await
            .ok_or(ScheduleError::NotFound)?;

        info!(
            "Appointment {} transitioned {} -> {} by {}",
            appointment_id, current.status, target, actor
        );

        match target {
            AppointmentStatus::Confirmed => {
                self.dispatcher
                    .observe(
                        &DomainEvent::AppointmentConfirmed {
                            appointment_id: updated.id,
                            patient_id: updated.patient_id,
                            provider_id: updated.provider_id,
                            start: updated.start,
                        },
                        now,
                    )
                    .await;
            }
            AppointmentStatus::Cancelled => {
                self.dispatcher
                    .observe(
                        &DomainEvent::AppointmentCancelled {
                            appointment_id: updated.id,
                            patient_id: updated.patient_id,
                            provider_id: updated.provider_id,
                            start: updated.start,
                            cancelled_by: actor,
                            reason,
                        },
                        now,
                    )
                    .await;
            }
            _ => {}
        }

        Ok(updated)
    }
}
