// libs/worklist-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::error::WorklistError;
use crate::models::{CompleteTaskRequest, DeferTaskRequest, EnqueueTaskRequest};
use crate::services::queue::ProviderWorklistService;

fn map_worklist_error(e: WorklistError) -> AppError {
    match e {
        WorklistError::NotFound => AppError::NotFound("Task not found".to_string()),
        WorklistError::NotOpen { .. } => AppError::Conflict(e.to_string()),
        WorklistError::NotActionable => AppError::Conflict(e.to_string()),
        WorklistError::InvalidDeferral(msg) => AppError::ValidationError(msg),
    }
}

#[derive(Debug, Deserialize)]
pub struct ActionableQueryParams {
    /// Caller clock for wake-on-read; defaults to the server's now.
    pub as_of: Option<DateTime<Utc>>,
}

#[axum::debug_handler]
pub async fn enqueue_task(
    State(service): State<Arc<ProviderWorklistService>>,
    Json(request): Json<EnqueueTaskRequest>,
) -> Result<Json<Value>, AppError> {
    let task = service
        .enqueue(request, Utc::now())
        .await
        .map_err(map_worklist_error)?;

    Ok(Json(json!({
        "success": true,
        "task": task
    })))
}

#[axum::debug_handler]
pub async fn defer_task(
    State(service): State<Arc<ProviderWorklistService>>,
    Path(task_id): Path<Uuid>,
    Json(request): Json<DeferTaskRequest>,
) -> Result<Json<Value>, AppError> {
    let task = service
        .defer(task_id, request, Utc::now())
        .await
        .map_err(map_worklist_error)?;

    Ok(Json(json!({
        "success": true,
        "task": task
    })))
}

#[axum::debug_handler]
pub async fn complete_task(
    State(service): State<Arc<ProviderWorklistService>>,
    Path(task_id): Path<Uuid>,
    Json(request): Json<CompleteTaskRequest>,
) -> Result<Json<Value>, AppError> {
    let task = service
        .complete(task_id, request, Utc::now())
        .await
        .map_err(map_worklist_error)?;

    Ok(Json(json!({
        "success": true,
        "task": task
    })))
}

#[axum::debug_handler]
pub async fn get_task(
    State(service): State<Arc<ProviderWorklistService>>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let task = service.get(task_id).await.map_err(map_worklist_error)?;

    Ok(Json(json!({
        "success": true,
        "task": task
    })))
}

#[axum::debug_handler]
pub async fn list_actionable_tasks(
    State(service): State<Arc<ProviderWorklistService>>,
    Path(provider_id): Path<Uuid>,
    Query(params): Query<ActionableQueryParams>,
) -> Result<Json<Value>, AppError> {
    let now = params.as_of.unwrap_or_else(Utc::now);
    let tasks = service.list_actionable(provider_id, now).await;
    let count = tasks.len();

    Ok(Json(json!({
        "success": true,
        "tasks": tasks,
        "count": count
    })))
}
