// libs/worklist-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::services::queue::ProviderWorklistService;

pub fn worklist_routes(service: Arc<ProviderWorklistService>) -> Router {
    Router::new()
        .route("/", post(handlers::enqueue_task))
        .route("/{task_id}", get(handlers::get_task))
        .route("/{task_id}/defer", post(handlers::defer_task))
        .route("/{task_id}/complete", post(handlers::complete_task))
        .route("/providers/{provider_id}/actionable", get(handlers::list_actionable_tasks))
        .with_state(service)
}
