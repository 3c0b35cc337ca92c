use serde::{Deserialize, Serialize};
use tally_core::{TaskRecord, TaskStatus};
use utoipa::ToSchema;

/// Multipart body of `POST /upload`.
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct UploadRequest {
    /// Spreadsheet (`.xlsx`) to build the report from.
    #[schema(value_type = String)]
    pub file: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub task_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskStatusResponse {
    pub task_id: String,
    /// One of `pending`, `success`, `failed`.
    #[schema(value_type = String, example = "pending")]
    pub status: TaskStatus,
    /// Failure message; `null` unless the task failed.
    pub error: Option<String>,
}

impl From<&TaskRecord> for TaskStatusResponse {
    fn from(record: &TaskRecord) -> Self {
        Self {
            task_id: record.task_id().to_owned(),
            status: record.status(),
            error: record.error().map(str::to_owned),
        }
    }
}
