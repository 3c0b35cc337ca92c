use std::path::PathBuf;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::files::FileArea;
use crate::runtime::admission::WorkerSlots;
use crate::runtime::storage::TaskRegistry;
use crate::runtime::types::{RuntimeError, TaskId};
use crate::sheet::{ReportSummary, TransformError, build_discrepancy_report};

/// A queued report job.
#[derive(Debug)]
struct Job {
    task_id: TaskId,
    input_path: PathBuf,
}

/// Background worker pool that turns uploads into reports.
///
/// Accepts jobs on an unbounded queue, runs at most `workers` of them at a
/// time on the blocking thread pool, and records each outcome in the
/// [`TaskRegistry`]. Jobs for different tasks may finish in any order.
///
/// ```rust,ignore
/// let dispatcher = TaskDispatcher::start(registry.clone(), files.clone(), 4);
/// dispatcher.submit(task_id, files.upload_path(&task_id))?;
/// ```
#[derive(Debug, Clone)]
pub struct TaskDispatcher {
    submit_tx: mpsc::UnboundedSender<Job>,
    slots: WorkerSlots,
}

impl TaskDispatcher {
    /// Spawn the dispatch loop. Must be called inside a tokio runtime.
    pub fn start(registry: TaskRegistry, files: FileArea, workers: usize) -> Self {
        let (submit_tx, submit_rx) = mpsc::unbounded_channel::<Job>();
        let slots = WorkerSlots::new(workers);

        let loop_slots = slots.clone();
        tokio::spawn(async move {
            Self::run_loop(submit_rx, registry, files, loop_slots).await;
        });

        Self { submit_tx, slots }
    }

    /// Queue the report for `task_id`. Never waits for a free worker.
    pub fn submit(
        &self,
        task_id: impl Into<TaskId>,
        input_path: impl Into<PathBuf>,
    ) -> Result<(), RuntimeError> {
        let job = Job {
            task_id: task_id.into(),
            input_path: input_path.into(),
        };
        self.submit_tx
            .send(job)
            .map_err(|_| RuntimeError::DispatcherClosed)
    }

    pub fn workers(&self) -> usize {
        self.slots.capacity()
    }

    /// Workers not running a job right now.
    pub fn idle_workers(&self) -> usize {
        self.slots.available()
    }

    async fn run_loop(
        mut rx: mpsc::UnboundedReceiver<Job>,
        registry: TaskRegistry,
        files: FileArea,
        slots: WorkerSlots,
    ) {
        while let Some(job) = rx.recv().await {
            let Some(permit) = slots.acquire().await else {
                warn!("worker pool closed; stopping dispatch loop");
                return;
            };
            let registry = registry.clone();
            let files = files.clone();
            tokio::spawn(async move {
                Self::execute(job, registry, files).await;
                drop(permit);
            });
        }
        debug!("dispatch queue closed");
    }

    /// Run one job to completion and record its terminal state.
    async fn execute(job: Job, registry: TaskRegistry, files: FileArea) {
        let Job {
            task_id,
            input_path,
        } = job;
        let result_path = files.result_path(&task_id);
        let started = Instant::now();
        info!(task_id = %task_id, input = %input_path.display(), "report started");

        let work_input = input_path.clone();
        let work_output = result_path.clone();
        let outcome = tokio::task::spawn_blocking(move || process_upload(&work_input, &work_output))
            .await;

        match outcome {
            Ok(Ok(summary)) => {
                info!(
                    task_id = %task_id,
                    rows_read = summary.rows_read,
                    rows_retained = summary.rows_retained,
                    elapsed_ms = started.elapsed().as_millis(),
                    "report succeeded"
                );
                registry.mark_succeeded(&task_id, result_path).await;
            }
            Ok(Err(err)) => {
                warn!(task_id = %task_id, error = %err, "report failed");
                registry.mark_failed(&task_id, err.to_string()).await;
            }
            Err(join_err) => {
                error!(task_id = %task_id, error = %join_err, "report worker panicked");
                // The worker never reached its cleanup step.
                remove_upload(&input_path);
                let err = RuntimeError::WorkerPanicked {
                    task_id: task_id.clone(),
                };
                registry.mark_failed(&task_id, err.to_string()).await;
            }
        }
    }
}

/// Build the report for one upload, then delete the upload whatever the
/// outcome.
pub fn process_upload(
    input_path: &std::path::Path,
    result_path: &std::path::Path,
) -> Result<ReportSummary, TransformError> {
    let outcome = build_discrepancy_report(input_path, result_path);
    remove_upload(input_path);
    outcome
}

fn remove_upload(path: &std::path::Path) {
    if let Err(e) = std::fs::remove_file(path) {
        warn!(path = %path.display(), error = %e, "failed to remove processed upload");
    }
}
