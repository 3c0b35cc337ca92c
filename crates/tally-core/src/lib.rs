pub mod files;
pub mod runtime;
pub mod sheet;

pub use files::FileArea;
pub use runtime::dispatcher::TaskDispatcher;
pub use runtime::storage::{TaskRecord, TaskRegistry};
pub use runtime::types::{RuntimeError, TaskId, TaskStatus};
pub use sheet::{ReportSummary, TransformError, build_discrepancy_report};
