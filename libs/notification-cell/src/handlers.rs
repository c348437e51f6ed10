// libs/notification-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::NotificationError;
use crate::services::dispatch::NotificationDispatchService;

#[derive(Debug, Deserialize)]
pub struct ListQueryParams {
    pub unread_only: Option<bool>,
}

#[axum::debug_handler]
pub async fn list_notifications(
    State(service): State<Arc<NotificationDispatchService>>,
    Path(recipient_id): Path<Uuid>,
    Query(params): Query<ListQueryParams>,
) -> Result<Json<Value>, AppError> {
    let notifications = service
        .list_for_recipient(recipient_id, params.unread_only.unwrap_or(false))
        .await;
    let count = notifications.len();

    Ok(Json(json!({
        "success": true,
        "notifications": notifications,
        "count": count
    })))
}

#[axum::debug_handler]
pub async fn unread_count(
    State(service): State<Arc<NotificationDispatchService>>,
    Path(recipient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let count = service.unread_count(recipient_id).await;

    Ok(Json(json!({
        "success": true,
        "unread_count": count
    })))
}

#[axum::debug_handler]
pub async fn mark_read(
    State(service): State<Arc<NotificationDispatchService>>,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let notification = service.mark_read(notification_id).await.map_err(|e| match e {
        NotificationError::NotFound => AppError::NotFound("Notification not found".to_string()),
    })?;

    Ok(Json(json!({
        "success": true,
        "notification": notification
    })))
}

#[axum::debug_handler]
pub async fn mark_all_read(
    State(service): State<Arc<NotificationDispatchService>>,
    Path(recipient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let marked = service.mark_all_read(recipient_id).await;

    Ok(Json(json!({
        "success": true,
        "marked": marked
    })))
}

#[axum::debug_handler]
pub async fn delete_notification(
    State(service): State<Arc<NotificationDispatchService>>,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    service.delete(notification_id).await.map_err(|e| match e {
        NotificationError::NotFound => AppError::NotFound("Notification not found".to_string()),
    })?;

    Ok(Json(json!({
        "success": true
    })))
}
