// libs/schedule-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::services::booking::AppointmentSchedulingService;

pub fn schedule_routes(service: Arc<AppointmentSchedulingService>) -> Router {
    Router::new()
        .route("/", post(handlers::request_appointment))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/transition", post(handlers::transition_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .route("/providers/{provider_id}", get(handlers::get_provider_schedule))
        .route("/patients/{patient_id}", get(handlers::get_patient_appointments))
        .with_state(service)
}
