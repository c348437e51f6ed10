// libs/notification-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub kind: NotificationKind,
    pub payload: NotificationPayload,
    pub created_at: DateTime<Utc>,
    pub read: bool,
    pub action_ref: Option<ActionRef>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    AppointmentConfirmed,
    AppointmentCancelled,
    TaskUrgent,
    TaskReopened,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::AppointmentConfirmed => write!(f, "appointment_confirmed"),
            NotificationKind::AppointmentCancelled => write!(f, "appointment_cancelled"),
            NotificationKind::TaskUrgent => write!(f, "task_urgent"),
            NotificationKind::TaskReopened => write!(f, "task_reopened"),
        }
    }
}

/// Display fields rendered by the host UI. Plain text only; routing to a
/// screen happens through `action_ref`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
}

/// Opaque pointer to the entity that caused the notification. The host
/// decides how (or whether) to turn this into a link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRef {
    pub entity: String,
    pub id: Uuid,
}

impl ActionRef {
    pub fn appointment(id: Uuid) -> Self {
        Self {
            entity: "appointment".to_string(),
            id,
        }
    }

    pub fn task(id: Uuid) -> Self {
        Self {
            entity: "task".to_string(),
            id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum NotificationError {
    #[error("Notification not found")]
    NotFound,
}
