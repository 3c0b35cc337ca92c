use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::runtime::types::{TaskId, TaskStatus};

/// The in-memory record for a single uploaded task.
///
/// Fields are private so the only way to change them is through
/// [`TaskRegistry`], which keeps `result_path` set exactly when the task
/// succeeded and `error` set exactly when it failed.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    task_id: TaskId,
    status: TaskStatus,
    file_path: PathBuf,
    result_path: Option<PathBuf>,
    error: Option<String>,
}

impl TaskRecord {
    fn pending(task_id: TaskId, file_path: PathBuf) -> Self {
        Self {
            task_id,
            status: TaskStatus::Pending,
            file_path,
            result_path: None,
            error: None,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Location the upload was written to (removed once processed).
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn result_path(&self) -> Option<&Path> {
        self.result_path.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Process-lifetime registry of every task accepted by the server.
///
/// Cloning is cheap; all clones share the same map. Entries are never evicted.
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    inner: Arc<RwLock<HashMap<TaskId, TaskRecord>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a `Pending` record for a freshly uploaded file.
    pub async fn create_pending(&self, task_id: impl Into<TaskId>, file_path: impl Into<PathBuf>) {
        let task_id = task_id.into();
        let record = TaskRecord::pending(task_id.clone(), file_path.into());
        debug!(task_id = %task_id, "task registered");
        self.inner.write().await.insert(task_id, record);
    }

    /// Move a pending task to `Success`. Returns `false` if the task is
    /// unknown or already terminal.
    pub async fn mark_succeeded(&self, task_id: &str, result_path: impl Into<PathBuf>) -> bool {
        let result_path = result_path.into();
        self.finish(task_id, |record| {
            record.status = TaskStatus::Success;
            record.result_path = Some(result_path);
        })
        .await
    }

    /// Move a pending task to `Failed`. Returns `false` if the task is
    /// unknown or already terminal.
    pub async fn mark_failed(&self, task_id: &str, error: impl Into<String>) -> bool {
        let error = error.into();
        self.finish(task_id, |record| {
            record.status = TaskStatus::Failed;
            record.error = Some(error);
        })
        .await
    }

    async fn finish(&self, task_id: &str, apply: impl FnOnce(&mut TaskRecord)) -> bool {
        let mut guard = self.inner.write().await;
        match guard.get_mut(task_id) {
            Some(record) if !record.status.is_terminal() => {
                apply(record);
                true
            }
            Some(record) => {
                warn!(task_id, status = %record.status, "ignoring second terminal transition");
                false
            }
            None => {
                warn!(task_id, "terminal transition for unknown task");
                false
            }
        }
    }

    /// Return a snapshot of the task.
    pub async fn get(&self, task_id: &str) -> Option<TaskRecord> {
        self.inner.read().await.get(task_id).cloned()
    }

    /// Number of tasks tracked since start-up.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
