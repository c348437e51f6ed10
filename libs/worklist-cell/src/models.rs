// libs/worklist-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use shared_models::events::TaskUrgency;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderTask {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub subject_type: TaskSubject,
    pub subject_id: Uuid,
    pub priority: TaskPriority,
    pub due_at: DateTime<Utc>,
    pub status: TaskStatus,
    pub deferred_until: Option<DateTime<Utc>>,
    pub defer_reason: Option<String>,
    pub resolution_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProviderTask {
    /// Idempotency key: one live task per subject per provider.
    pub fn matches_subject(&self, provider_id: Uuid, subject_type: TaskSubject, subject_id: Uuid) -> bool {
        self.provider_id == provider_id
            && self.subject_type == subject_type
            && self.subject_id == subject_id
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskSubject {
    LabReview,
    MessageResponse,
    PrescriptionApproval,
    AppointmentPrep,
}

impl fmt::Display for TaskSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskSubject::LabReview => write!(f, "lab review"),
            TaskSubject::MessageResponse => write!(f, "message response"),
            TaskSubject::PrescriptionApproval => write!(f, "prescription approval"),
            TaskSubject::AppointmentPrep => write!(f, "appointment prep"),
        }
    }
}

/// Variant order is the sort order: urgent work floats to the top of the
/// worklist.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_urgency(&self) -> TaskUrgency {
        match self {
            TaskPriority::Low => TaskUrgency::Low,
            TaskPriority::Medium => TaskUrgency::Medium,
            TaskPriority::High => TaskUrgency::High,
            TaskPriority::Urgent => TaskUrgency::Urgent,
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskPriority::Low => write!(f, "low"),
            TaskPriority::Medium => write!(f, "medium"),
            TaskPriority::High => write!(f, "high"),
            TaskPriority::Urgent => write!(f, "urgent"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Open,
    Deferred,
    Completed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Open => write!(f, "open"),
            TaskStatus::Deferred => write!(f, "deferred"),
            TaskStatus::Completed => write!(f, "completed"),
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueTaskRequest {
    pub provider_id: Uuid,
    pub subject_type: TaskSubject,
    pub subject_id: Uuid,
    pub priority: TaskPriority,
    pub due_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeferTaskRequest {
    pub duration_hours: i64,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteTaskRequest {
    pub resolution_notes: Option<String>,
}
