use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use notification_cell::{NotificationDispatchService, NotificationKind};
use shared_models::identity::{DirectoryReader, InMemoryDirectory};
use worklist_cell::models::{
    CompleteTaskRequest, DeferTaskRequest, EnqueueTaskRequest, TaskPriority, TaskStatus,
    TaskSubject,
};
use worklist_cell::services::queue::ProviderWorklistService;
use worklist_cell::WorklistError;

fn test_service() -> (Arc<ProviderWorklistService>, Arc<NotificationDispatchService>) {
    let directory: Arc<dyn DirectoryReader> = Arc::new(InMemoryDirectory::new());
    let dispatcher = Arc::new(NotificationDispatchService::new(directory));
    let service = Arc::new(ProviderWorklistService::new(Arc::clone(&dispatcher)));
    (service, dispatcher)
}

fn enqueue_request(
    provider_id: Uuid,
    subject_type: TaskSubject,
    subject_id: Uuid,
    priority: TaskPriority,
    due_at: DateTime<Utc>,
) -> EnqueueTaskRequest {
    EnqueueTaskRequest {
        provider_id,
        subject_type,
        subject_id,
        priority,
        due_at,
    }
}

#[tokio::test]
async fn test_enqueue_creates_open_task() {
    let (service, _) = test_service();
    let now = Utc::now();
    let provider_id = Uuid::new_v4();

    let task = service
        .enqueue(
            enqueue_request(provider_id, TaskSubject::LabReview, Uuid::new_v4(), TaskPriority::Medium, now),
            now,
        )
        .await
        .expect("Enqueue should succeed");

    assert_eq!(task.status, TaskStatus::Open);
    assert_eq!(task.provider_id, provider_id);
    assert!(task.deferred_until.is_none());
}

#[tokio::test]
async fn test_enqueue_is_idempotent_per_subject() {
    let (service, _) = test_service();
    let now = Utc::now();
    let provider_id = Uuid::new_v4();
    let subject_id = Uuid::new_v4();

    let first = service
        .enqueue(
            enqueue_request(provider_id, TaskSubject::LabReview, subject_id, TaskPriority::Medium, now),
            now,
        )
        .await
        .expect("First enqueue should succeed");

    let second = service
        .enqueue(
            enqueue_request(provider_id, TaskSubject::LabReview, subject_id, TaskPriority::Urgent, now),
            now,
        )
        .await
        .expect("Second enqueue should succeed");

    assert_eq!(first.id, second.id, "Duplicate trigger should return the existing task");
    assert_eq!(second.priority, TaskPriority::Medium, "Existing task is returned unchanged");
}

#[tokio::test]
async fn test_enqueue_while_deferred_returns_existing() {
    let (service, _) = test_service();
    let now = Utc::now();
    let provider_id = Uuid::new_v4();
    let subject_id = Uuid::new_v4();

    let task = service
        .enqueue(
            enqueue_request(provider_id, TaskSubject::MessageResponse, subject_id, TaskPriority::Low, now),
            now,
        )
        .await
        .expect("Enqueue should succeed");

    service
        .defer(task.id, DeferTaskRequest { duration_hours: 4, reason: None }, now)
        .await
        .expect("Defer should succeed");

    let again = service
        .enqueue(
            enqueue_request(provider_id, TaskSubject::MessageResponse, subject_id, TaskPriority::Low, now),
            now,
        )
        .await
        .expect("Enqueue should succeed");

    assert_eq!(again.id, task.id);
    assert_eq!(again.status, TaskStatus::Deferred);
}

#[tokio::test]
async fn test_enqueue_after_completion_creates_new_task() {
    let (service, _) = test_service();
    let now = Utc::now();
    let provider_id = Uuid::new_v4();
    let subject_id = Uuid::new_v4();

    let task = service
        .enqueue(
            enqueue_request(provider_id, TaskSubject::PrescriptionApproval, subject_id, TaskPriority::High, now),
            now,
        )
        .await
        .expect("Enqueue should succeed");

    service
        .complete(task.id, CompleteTaskRequest { resolution_notes: None }, now)
        .await
        .expect("Complete should succeed");

    // The subject key only blocks while a task is live.
    let reissued = service
        .enqueue(
            enqueue_request(provider_id, TaskSubject::PrescriptionApproval, subject_id, TaskPriority::High, now),
            now,
        )
        .await
        .expect("Enqueue should succeed");

    assert_ne!(reissued.id, task.id);
    assert_eq!(reissued.status, TaskStatus::Open);
}

#[tokio::test]
async fn test_urgent_enqueue_notifies_provider_once() {
    let (service, dispatcher) = test_service();
    let now = Utc::now();
    let provider_id = Uuid::new_v4();
    let subject_id = Uuid::new_v4();

    for _ in 0..2 {
        service
            .enqueue(
                enqueue_request(provider_id, TaskSubject::LabReview, subject_id, TaskPriority::Urgent, now),
                now,
            )
            .await
            .expect("Enqueue should succeed");
    }

    let inbox = dispatcher.list_for_recipient(provider_id, false).await;
    let urgent: Vec<_> = inbox
        .iter()
        .filter(|n| n.kind == NotificationKind::TaskUrgent)
        .collect();
    assert_eq!(urgent.len(), 1, "Idempotent enqueue must not duplicate the urgent notice");
}

#[tokio::test]
async fn test_low_priority_enqueue_does_not_notify() {
    let (service, dispatcher) = test_service();
    let now = Utc::now();
    let provider_id = Uuid::new_v4();

    for priority in [TaskPriority::Low, TaskPriority::Medium] {
        service
            .enqueue(
                enqueue_request(provider_id, TaskSubject::AppointmentPrep, Uuid::new_v4(), priority, now),
                now,
            )
            .await
            .expect("Enqueue should succeed");
    }

    let inbox = dispatcher.list_for_recipient(provider_id, false).await;
    assert!(inbox.is_empty(), "Only high/urgent tasks produce notifications");
}

#[tokio::test]
async fn test_defer_requires_positive_duration() {
    let (service, _) = test_service();
    let now = Utc::now();

    let task = service
        .enqueue(
            enqueue_request(Uuid::new_v4(), TaskSubject::LabReview, Uuid::new_v4(), TaskPriority::Medium, now),
            now,
        )
        .await
        .expect("Enqueue should succeed");

    for bad_hours in [0, -3] {
        let result = service
            .defer(task.id, DeferTaskRequest { duration_hours: bad_hours, reason: None }, now)
            .await;
        assert_matches!(result.unwrap_err(), WorklistError::InvalidDeferral(_));
    }
}

#[tokio::test]
async fn test_defer_sets_deadline_and_rejects_non_open_tasks() {
    let (service, _) = test_service();
    let now = Utc::now();

    let task = service
        .enqueue(
            enqueue_request(Uuid::new_v4(), TaskSubject::LabReview, Uuid::new_v4(), TaskPriority::Medium, now),
            now,
        )
        .await
        .expect("Enqueue should succeed");

    let deferred = service
        .defer(task.id, DeferTaskRequest { duration_hours: 6, reason: Some("end of shift".to_string()) }, now)
        .await
        .expect("Defer should succeed");
    assert_eq!(deferred.status, TaskStatus::Deferred);
    assert_eq!(deferred.deferred_until, Some(now + Duration::hours(6)));
    assert_eq!(deferred.defer_reason, Some("end of shift".to_string()));

    // Deferring a task that is already deferred is a state error.
    let result = service
        .defer(task.id, DeferTaskRequest { duration_hours: 2, reason: None }, now)
        .await;
    assert_matches!(
        result.unwrap_err(),
        WorklistError::NotOpen { status: TaskStatus::Deferred }
    );
}

#[tokio::test]
async fn test_deferred_task_excluded_until_deadline_elapses() {
    let (service, _) = test_service();
    let now = Utc::now();
    let provider_id = Uuid::new_v4();

    let task = service
        .enqueue(
            enqueue_request(provider_id, TaskSubject::LabReview, Uuid::new_v4(), TaskPriority::High, now),
            now,
        )
        .await
        .expect("Enqueue should succeed");

    service
        .defer(task.id, DeferTaskRequest { duration_hours: 2, reason: None }, now)
        .await
        .expect("Defer should succeed");
    let deadline = now + Duration::hours(2);

    // One second before the deadline: hidden.
    let before = service.list_actionable(provider_id, deadline - Duration::seconds(1)).await;
    assert!(before.is_empty(), "Deferred task must stay hidden before its deadline");

    // One second after: back, and open again.
    let after = service.list_actionable(provider_id, deadline + Duration::seconds(1)).await;
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].id, task.id);
    assert_eq!(after[0].status, TaskStatus::Open);
    assert!(after[0].deferred_until.is_none());
}

#[tokio::test]
async fn test_wake_emits_reopened_notification_once() {
    let (service, dispatcher) = test_service();
    let now = Utc::now();
    let provider_id = Uuid::new_v4();

    let task = service
        .enqueue(
            enqueue_request(provider_id, TaskSubject::MessageResponse, Uuid::new_v4(), TaskPriority::Low, now),
            now,
        )
        .await
        .expect("Enqueue should succeed");

    service
        .defer(task.id, DeferTaskRequest { duration_hours: 1, reason: None }, now)
        .await
        .expect("Defer should succeed");

    let later = now + Duration::hours(1) + Duration::seconds(1);
    service.list_actionable(provider_id, later).await;
    // A second read must not wake (or notify) again.
    service.list_actionable(provider_id, later + Duration::minutes(5)).await;

    let inbox = dispatcher.list_for_recipient(provider_id, false).await;
    let reopened: Vec<_> = inbox
        .iter()
        .filter(|n| n.kind == NotificationKind::TaskReopened)
        .collect();
    assert_eq!(reopened.len(), 1, "Wake-on-read fires exactly once per deferral");
}

#[tokio::test]
async fn test_complete_deferred_task_allowed_and_complete_is_final() {
    let (service, _) = test_service();
    let now = Utc::now();

    let task = service
        .enqueue(
            enqueue_request(Uuid::new_v4(), TaskSubject::LabReview, Uuid::new_v4(), TaskPriority::Medium, now),
            now,
        )
        .await
        .expect("Enqueue should succeed");

    service
        .defer(task.id, DeferTaskRequest { duration_hours: 2, reason: None }, now)
        .await
        .expect("Defer should succeed");

    let completed = service
        .complete(
            task.id,
            CompleteTaskRequest { resolution_notes: Some("Reviewed and signed".to_string()) },
            now,
        )
        .await
        .expect("Completing a deferred task is allowed");
    assert_eq!(completed.status, TaskStatus::Completed);
    assert_eq!(completed.resolution_notes, Some("Reviewed and signed".to_string()));

    let result = service
        .complete(task.id, CompleteTaskRequest { resolution_notes: None }, now)
        .await;
    assert_matches!(result.unwrap_err(), WorklistError::NotActionable);
}

#[tokio::test]
async fn test_list_actionable_orders_by_priority_then_due_date() {
    let (service, _) = test_service();
    let now = Utc::now();
    let provider_id = Uuid::new_v4();

    let soon = now + Duration::hours(1);
    let later = now + Duration::hours(8);

    // Insert out of order on purpose.
    let medium_soon = service
        .enqueue(enqueue_request(provider_id, TaskSubject::MessageResponse, Uuid::new_v4(), TaskPriority::Medium, soon), now)
        .await
        .unwrap();
    let urgent_later = service
        .enqueue(enqueue_request(provider_id, TaskSubject::LabReview, Uuid::new_v4(), TaskPriority::Urgent, later), now)
        .await
        .unwrap();
    let urgent_soon = service
        .enqueue(enqueue_request(provider_id, TaskSubject::PrescriptionApproval, Uuid::new_v4(), TaskPriority::Urgent, soon), now)
        .await
        .unwrap();
    let low_soon = service
        .enqueue(enqueue_request(provider_id, TaskSubject::AppointmentPrep, Uuid::new_v4(), TaskPriority::Low, soon), now)
        .await
        .unwrap();

    let listed = service.list_actionable(provider_id, now).await;
    let ids: Vec<_> = listed.iter().map(|t| t.id).collect();
    assert_eq!(
        ids,
        vec![urgent_soon.id, urgent_later.id, medium_soon.id, low_soon.id],
        "Expected priority-descending, due-ascending order"
    );
}

#[tokio::test]
async fn test_urgent_deferral_scenario() {
    let (service, _) = test_service();
    let now = Utc::now();
    let provider_id = Uuid::new_v4();

    // Urgent lab review due now.
    let task = service
        .enqueue(
            enqueue_request(provider_id, TaskSubject::LabReview, Uuid::new_v4(), TaskPriority::Urgent, now),
            now,
        )
        .await
        .expect("Enqueue should succeed");

    // Defer two hours.
    service
        .defer(task.id, DeferTaskRequest { duration_hours: 2, reason: None }, now)
        .await
        .expect("Defer should succeed");

    // One hour in: nothing actionable.
    let midway = service.list_actionable(provider_id, now + Duration::hours(1)).await;
    assert!(midway.is_empty());

    // Just past two hours: the task is back and open.
    let woken = service
        .list_actionable(provider_id, now + Duration::hours(2) + Duration::seconds(1))
        .await;
    assert_eq!(woken.len(), 1);
    assert_eq!(woken[0].id, task.id);
    assert_eq!(woken[0].status, TaskStatus::Open);
}

#[tokio::test]
async fn test_get_unknown_task_not_found() {
    let (service, _) = test_service();

    let result = service.get(Uuid::new_v4()).await;
    assert_matches!(result.unwrap_err(), WorklistError::NotFound);
}

#[tokio::test]
async fn test_concurrent_enqueues_create_single_task() {
    let (service, _) = test_service();
    let now = Utc::now();
    let provider_id = Uuid::new_v4();
    let subject_id = Uuid::new_v4();

    let mut handles = vec![];
    for _ in 0..8 {
        let service = Arc::clone(&service);
        let request = enqueue_request(provider_id, TaskSubject::LabReview, subject_id, TaskPriority::High, now);
        handles.push(tokio::spawn(async move { service.enqueue(request, now).await }));
    }

    let mut ids = vec![];
    for handle in handles {
        let task = handle.await.expect("Task should join").expect("Enqueue should succeed");
        ids.push(task.id);
    }

    ids.dedup();
    assert_eq!(ids.len(), 1, "Concurrent duplicate triggers must map to one task");
}
