//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use tally_core::{FileArea, TaskDispatcher, TaskRegistry};

use crate::config::Config;

/// State shared across all HTTP handlers.
///
/// Created once at startup; the registry lives as long as the process.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Status of every task accepted since startup.
    pub tasks: TaskRegistry,
    /// Worker pool building reports in the background.
    pub dispatcher: TaskDispatcher,
    /// Directory holding uploads and reports.
    pub files: FileArea,
}

impl AppState {
    /// Wire the registry, storage area and worker pool from `config`.
    ///
    /// Spawns the dispatch loop, so it must run inside a tokio runtime.
    pub fn new(config: Config) -> Self {
        let tasks = TaskRegistry::new();
        let files = FileArea::new(&config.upload_dir);
        let dispatcher = TaskDispatcher::start(tasks.clone(), files.clone(), config.workers);
        Self {
            config: Arc::new(config),
            tasks,
            dispatcher,
            files,
        }
    }
}
