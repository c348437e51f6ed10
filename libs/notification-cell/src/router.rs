// libs/notification-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers;
use crate::services::dispatch::NotificationDispatchService;

pub fn notification_routes(service: Arc<NotificationDispatchService>) -> Router {
    Router::new()
        .route("/recipients/{recipient_id}", get(handlers::list_notifications))
        .route("/recipients/{recipient_id}/unread-count", get(handlers::unread_count))
        .route("/recipients/{recipient_id}/read-all", post(handlers::mark_all_read))
        .route("/{notification_id}/read", post(handlers::mark_read))
        .route("/{notification_id}", delete(handlers::delete_notification))
        .with_state(service)
}
