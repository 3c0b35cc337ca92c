use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Unique identifier for an uploaded task (canonical hyphenated UUID v4).
pub type TaskId = String;

/// Lifecycle state of a task.
///
/// `Pending` is the only non-terminal state; a task leaves it exactly once.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskStatus {
    /// Accepted and queued or running.
    Pending,
    /// Result spreadsheet written.
    Success,
    /// Transformation failed; see the task's error.
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Pending)
    }
}

/// Errors produced by the runtime layer.
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    /// The dispatch loop has stopped; no more jobs are accepted.
    #[error("task dispatcher is closed")]
    DispatcherClosed,

    /// The blocking worker running a job panicked.
    #[error("worker for task {task_id} panicked")]
    WorkerPanicked { task_id: TaskId },
}
