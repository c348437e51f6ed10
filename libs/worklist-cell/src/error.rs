use thiserror::Error;

use crate::models::TaskStatus;

#[derive(Error, Debug, Clone)]
pub enum WorklistError {
    #[error("Task not found")]
    NotFound,

    #[error("Task is not open (current status: {status})")]
    NotOpen { status: TaskStatus },

    #[error("Task has already been completed")]
    NotActionable,

    #[error("Invalid deferral: {0}")]
    InvalidDeferral(String),
}
