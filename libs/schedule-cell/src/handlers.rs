// libs/schedule-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{
    BookAppointmentRequest, CancelAppointmentRequest, ScheduleError, TransitionRequest,
};
use crate::services::booking::AppointmentSchedulingService;

fn map_schedule_error(e: ScheduleError) -> AppError {
    match e {
        ScheduleError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        ScheduleError::InvalidWindow(msg) => AppError::ValidationError(msg),
        ScheduleError::InvalidTransition { .. } => AppError::BadRequest(e.to_string()),
        ScheduleError::TooEarly { .. } => AppError::BadRequest(e.to_string()),
        ScheduleError::SlotConflict => {
            AppError::Conflict("Appointment slot conflicts with an existing booking".to_string())
        }
    }
}

#[axum::debug_handler]
pub async fn request_appointment(
    State(service): State<Arc<AppointmentSchedulingService>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = service
        .request_appointment(request, Utc::now())
        .await
        .map_err(map_schedule_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn transition_appointment(
    State(service): State<Arc<AppointmentSchedulingService>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = service
        .transition(appointment_id, request.target_status, request.actor, Utc::now())
        .await
        .map_err(map_schedule_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(service): State<Arc<AppointmentSchedulingService>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = service
        .cancel(appointment_id, request, Utc::now())
        .await
        .map_err(map_schedule_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(service): State<Arc<AppointmentSchedulingService>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = service
        .get(appointment_id)
        .await
        .map_err(map_schedule_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn get_provider_schedule(
    State(service): State<Arc<AppointmentSchedulingService>>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointments = service.provider_schedule(provider_id).await;
    let count = appointments.len();

    Ok(Json(json!({
        "success": true,
        "appointments": appointments,
        "count": count
    })))
}

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(service): State<Arc<AppointmentSchedulingService>>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointments = service.patient_appointments(patient_id).await;
    let count = appointments.len();

    Ok(Json(json!({
        "success": true,
        "appointments": appointments,
        "count": count
    })))
}
