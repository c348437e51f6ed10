// libs/worklist-cell/src/services/queue.rs
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use notification_cell::NotificationDispatchService;
use shared_models::events::DomainEvent;
use shared_store::{LockMap, Table};

use crate::error::WorklistError;
use crate::models::{
    CompleteTaskRequest, DeferTaskRequest, EnqueueTaskRequest, ProviderTask, TaskStatus,
};

/// Clinician-facing action items: lab reviews, message responses,
/// prescription approvals, visit prep. Commands serialize per provider so
/// idempotent creation holds under concurrent triggers.
pub struct ProviderWorklistService {
    tasks: Table<ProviderTask>,
    provider_locks: LockMap,
    dispatcher: Arc<NotificationDispatchService>,
}

impl ProviderWorklistService {
    pub fn new(dispatcher: Arc<NotificationDispatchService>) -> Self {
        Self {
            tasks: Table::new(),
            provider_locks: LockMap::new(),
            dispatcher,
        }
    }

    /// Create a task for a triggering event. Idempotent: while an open or
    /// deferred task exists for the same (provider, subject type, subject)
    /// it is returned unchanged and nothing is emitted.
    pub async fn enqueue(
        &self,
        request: EnqueueTaskRequest,
        now: DateTime<Utc>,
    ) -> Result<ProviderTask, WorklistError> {
        let _guard = self.provider_locks.acquire(request.provider_id).await;

        if let Some(existing) = self
            .tasks
            .find(|t| {
                t.matches_subject(request.provider_id, request.subject_type, request.subject_id)
                    && t.status != TaskStatus::Completed
            })
            .await
        {
            debug!(
                "Task already queued for provider {} subject {} {}, returning existing",
                request.provider_id, request.subject_type, request.subject_id
            );
            return Ok(existing);
        }

        let task = ProviderTask {
            id: Uuid::new_v4(),
            provider_id: request.provider_id,
            subject_type: request.subject_type,
            subject_id: request.subject_id,
            priority: request.priority,
            due_at: request.due_at,
            status: TaskStatus::Open,
            deferred_until: None,
            defer_reason: None,
            resolution_notes: None,
            created_at: now,
            updated_at: now,
        };

        self.tasks.insert(task.id, task.clone()).await;

        info!(
            "Task {} ({}, {}) enqueued for provider {}",
            task.id, task.subject_type, task.priority, task.provider_id
        );

        // The dispatcher decides whether this priority warrants a
        // notification.
        self.dispatcher
            .observe(
                &DomainEvent::TaskEnqueued {
                    task_id: task.id,
                    provider_id: task.provider_id,
                    subject: task.subject_type.to_string(),
                    priority: task.priority.as_urgency(),
                    due_at: task.due_at,
                },
                now,
            )
            .await;

        Ok(task)
    }

    /// Push an open task out of the worklist until `now + duration_hours`.
    pub async fn defer(
        &self,
        task_id: Uuid,
        request: DeferTaskRequest,
        now: DateTime<Utc>,
    ) -> Result<ProviderTask, WorklistError> {
        if request.duration_hours <= 0 {
            return Err(WorklistError::InvalidDeferral(
                "Deferral duration must be a positive number of hours".to_string(),
            ));
        }

        let task = self.tasks.get(task_id).await.ok_or(WorklistError::NotFound)?;
        let _guard = self.provider_locks.acquire(task.provider_id).await;

        let task = self.tasks.get(task_id).await.ok_or(WorklistError::NotFound)?;
        if task.status != TaskStatus::Open {
            warn!("Defer attempted on task {} in status {}", task_id, task.status);
            return Err(WorklistError::NotOpen { status: task.status });
        }

        let deferred_until = now + ChronoDuration::hours(request.duration_hours);
        let updated = self
            .tasks
            .update(task_id, |t| {
                t.status = TaskStatus::Deferred;
                t.deferred_until = Some(deferred_until);
                t.defer_reason = request.reason.clone();
                t.updated_at = now;
            })
            .await
            .ok_or(WorklistError::NotFound)?;

        info!("Task {} deferred until {}", task_id, deferred_until);
        Ok(updated)
    }

    /// Complete by explicit provider action. Allowed from open or
    /// deferred; completing twice is a state error.
    pub async fn complete(
        &self,
        task_id: Uuid,
        request: CompleteTaskRequest,
        now: DateTime<Utc>,
    ) -> Result<ProviderTask, WorklistError> {
        let task = self.tasks.get(task_id).await.ok_or(WorklistError::NotFound)?;
        let _guard = self.provider_locks.acquire(task.provider_id).await;

        let task = self.tasks.get(task_id).await.ok_or(WorklistError::NotFound)?;
        if task.status == TaskStatus::Completed {
            warn!("Complete attempted on already completed task {}", task_id);
            return Err(WorklistError::NotActionable);
        }

        let updated = self
            .tasks
            .update(task_id, |t| {
                t.status = TaskStatus::Completed;
                t.deferred_until = None;
                t.resolution_notes = request.resolution_notes.clone();
                t.updated_at = now;
            })
            .await
            .ok_or(WorklistError::NotFound)?;

        info!("Task {} completed", task_id);
        Ok(updated)
    }

    pub async fn get(&self, task_id: Uuid) -> Result<ProviderTask, WorklistError> {
        self.tasks.get(task_id).await.ok_or(WorklistError::NotFound)
    }

    /// Everything the provider can act on at `now`: open tasks plus
    /// deferred tasks whose deadline has elapsed. Elapsed deferrals are
    /// woken back to open as part of this read; there is no background
    /// timer. Ordered by priority descending, then due date ascending.
    pub async fn list_actionable(&self, provider_id: Uuid, now: DateTime<Utc>) -> Vec<ProviderTask> {
        let _guard = self.provider_locks.acquire(provider_id).await;

        let due_back = self
            .tasks
            .filter(|t| {
                t.provider_id == provider_id
                    && t.status == TaskStatus::Deferred
                    && t.deferred_until.is_some_and(|until| until <= now)
            })
            .await;

        for task in due_back {
            let woken = self
                .tasks
                .update(task.id, |t| {
                    t.status = TaskStatus::Open;
                    t.deferred_until = None;
                    t.updated_at = now;
                })
                .await;

            if let Some(woken) = woken {
                info!("Task {} woke from deferral", woken.id);
                self.dispatcher
                    .observe(
                        &DomainEvent::TaskReopened {
                            task_id: woken.id,
                            provider_id: woken.provider_id,
                            subject: woken.subject_type.to_string(),
                            due_at: woken.due_at,
                        },
                        now,
                    )
                    .await;
            }
        }

        let mut actionable = self
            .tasks
            .filter(|t| t.provider_id == provider_id && t.status == TaskStatus::Open)
            .await;

        actionable.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.due_at.cmp(&b.due_at)));
        actionable
    }
}
