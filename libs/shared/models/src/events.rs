use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Who performed a lifecycle action. Used to pick the notification
/// counterparty on cancellation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventActor {
    Patient,
    Provider,
    System,
}

impl fmt::Display for EventActor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventActor::Patient => write!(f, "patient"),
            EventActor::Provider => write!(f, "provider"),
            EventActor::System => write!(f, "system"),
        }
    }
}

/// Transition events emitted by the schedule and worklist cells after a
/// successful mutation. Carries the ids and display fields the
/// notification dispatcher needs; no entity ownership.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum DomainEvent {
    AppointmentConfirmed {
        appointment_id: Uuid,
        patient_id: Uuid,
        provider_id: Uuid,
        start: DateTime<Utc>,
    },
    AppointmentCancelled {
        appointment_id: Uuid,
        patient_id: Uuid,
        provider_id: Uuid,
        start: DateTime<Utc>,
        cancelled_by: EventActor,
        reason: Option<String>,
    },
    TaskEnqueued {
        task_id: Uuid,
        provider_id: Uuid,
        subject: String,
        priority: TaskUrgency,
        due_at: DateTime<Utc>,
    },
    TaskReopened {
        task_id: Uuid,
        provider_id: Uuid,
        subject: String,
        due_at: DateTime<Utc>,
    },
}

/// Priority as seen by the dispatcher. Mirrors the worklist priority
/// levels without depending on the worklist crate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskUrgency {
    Low,
    Medium,
    High,
    Urgent,
}

impl TaskUrgency {
    pub fn is_escalated(&self) -> bool {
        matches!(self, TaskUrgency::High | TaskUrgency::Urgent)
    }
}
