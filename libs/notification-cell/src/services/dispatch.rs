// libs/notification-cell/src/services/dispatch.rs
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_models::events::{DomainEvent, EventActor};
use shared_models::identity::DirectoryReader;
use shared_store::Table;

use crate::models::{
    ActionRef, Notification, NotificationError, NotificationKind, NotificationPayload,
};

/// Maps lifecycle/worklist transition events to notification records and
/// owns their read/delete state. Append-only apart from explicit deletes;
/// deleted ids are tombstoned so nothing can bring them back.
pub struct NotificationDispatchService {
    notifications: Table<Notification>,
    deleted: RwLock<HashSet<Uuid>>,
    directory: Arc<dyn DirectoryReader>,
}

impl NotificationDispatchService {
    pub fn new(directory: Arc<dyn DirectoryReader>) -> Self {
        Self {
            notifications: Table::new(),
            deleted: RwLock::new(HashSet::new()),
            directory,
        }
    }

    /// Consume one transition event. Returns the created notification, or
    /// `None` for events the mapping table does not cover. Called by the
    /// mutating service after its own state change commits, so each
    /// qualifying transition produces exactly one record.
    pub async fn observe(&self, event: &DomainEvent, now: DateTime<Utc>) -> Option<Notification> {
        let notification = match event {
            DomainEvent::AppointmentConfirmed {
                appointment_id,
                patient_id,
                provider_id,
                start,
            } => {
                let provider = self.display_name(*provider_id).await;
                self.build(
                    *patient_id,
                    NotificationKind::AppointmentConfirmed,
                    NotificationPayload {
                        title: "Appointment confirmed".to_string(),
                        body: format!(
                            "Your appointment with {} on {} is confirmed",
                            provider,
                            start.format("%Y-%m-%d %H:%M UTC")
                        ),
                    },
                    ActionRef::appointment(*appointment_id),
                    now,
                )
            }
            DomainEvent::AppointmentCancelled {
                appointment_id,
                patient_id,
                provider_id,
                start,
                cancelled_by,
                reason,
            } => {
                // Notify the other party. System cancellations go to the
                // patient, who loses the visit.
                let (recipient, counterparty) = match cancelled_by {
                    EventActor::Patient => (*provider_id, *patient_id),
                    EventActor::Provider | EventActor::System => (*patient_id, *provider_id),
                };
                let counterparty_name = self.display_name(counterparty).await;
                let mut body = format!(
                    "{} cancelled the appointment scheduled for {}",
                    counterparty_name,
                    start.format("%Y-%m-%d %H:%M UTC")
                );
                if let Some(reason) = reason {
                    body.push_str(&format!(" ({})", reason));
                }
                self.build(
                    recipient,
                    NotificationKind::AppointmentCancelled,
                    NotificationPayload {
                        title: "Appointment cancelled".to_string(),
                        body,
                    },
                    ActionRef::appointment(*appointment_id),
                    now,
                )
            }
            DomainEvent::TaskEnqueued {
                task_id,
                provider_id,
                subject,
                priority,
                due_at,
            } => {
                if !priority.is_escalated() {
                    debug!("Task {} enqueued below escalation threshold, no notification", task_id);
                    return None;
                }
                self.build(
                    *provider_id,
                    NotificationKind::TaskUrgent,
                    NotificationPayload {
                        title: "Urgent task assigned".to_string(),
                        body: format!(
                            "A {} task needs your attention by {}",
                            subject,
                            due_at.format("%Y-%m-%d %H:%M UTC")
                        ),
                    },
                    ActionRef::task(*task_id),
                    now,
                )
            }
            DomainEvent::TaskReopened {
                task_id,
                provider_id,
                subject,
                due_at,
            } => self.build(
                *provider_id,
                NotificationKind::TaskReopened,
                NotificationPayload {
                    title: "Deferred task reopened".to_string(),
                    body: format!(
                        "The deferred {} task is back in your worklist (due {})",
                        subject,
                        due_at.format("%Y-%m-%d %H:%M UTC")
                    ),
                },
                ActionRef::task(*task_id),
                now,
            ),
        };

        self.notifications
            .insert(notification.id, notification.clone())
            .await;

        info!(
            "Notification {} ({}) created for recipient {}",
            notification.id, notification.kind, notification.recipient_id
        );

        Some(notification)
    }

    pub async fn mark_read(&self, id: Uuid) -> Result<Notification, NotificationError> {
        if self.deleted.read().await.contains(&id) {
            warn!("Attempt to mark deleted notification {} as read", id);
            return Err(NotificationError::NotFound);
        }

        self.notifications
            .update(id, |n| n.read = true)
            .await
            .ok_or(NotificationError::NotFound)
    }

    /// Marks every unread notification for `recipient_id`, returning how
    /// many were flipped.
    pub async fn mark_all_read(&self, recipient_id: Uuid) -> usize {
        let touched = self
            .notifications
            .update_where(
                |n| n.recipient_id == recipient_id && !n.read,
                |n| n.read = true,
            )
            .await;

        debug!("Marked {} notifications read for recipient {}", touched, recipient_id);
        touched
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), NotificationError> {
        match self.notifications.remove(id).await {
            Some(_) => {
                self.deleted.write().await.insert(id);
                info!("Notification {} deleted", id);
                Ok(())
            }
            None => Err(NotificationError::NotFound),
        }
    }

    /// Newest-first listing for a recipient's notification tray.
    pub async fn list_for_recipient(
        &self,
        recipient_id: Uuid,
        unread_only: bool,
    ) -> Vec<Notification> {
        let mut items = self
            .notifications
            .filter(|n| n.recipient_id == recipient_id && (!unread_only || !n.read))
            .await;
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items
    }

    pub async fn unread_count(&self, recipient_id: Uuid) -> usize {
        self.notifications
            .filter(|n| n.recipient_id == recipient_id && !n.read)
            .await
            .len()
    }

    fn build(
        &self,
        recipient_id: Uuid,
        kind: NotificationKind,
        payload: NotificationPayload,
        action_ref: ActionRef,
        now: DateTime<Utc>,
    ) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            recipient_id,
            kind,
            payload,
            created_at: now,
            read: false,
            action_ref: Some(action_ref),
        }
    }

    async fn display_name(&self, id: Uuid) -> String {
        match self.directory.profile(id).await {
            Some(profile) => profile.display_name,
            None => id.to_string(),
        }
    }
}
