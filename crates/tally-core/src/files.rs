//! Storage area for uploaded and generated spreadsheets.
//!
//! Every task owns two files in one directory, both named after the task id:
//! `upload_{id}.xlsx` (removed after processing) and `result_{id}.xlsx`.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FileArea {
    root: PathBuf,
}

impl FileArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the directory (and parents) if it does not exist yet.
    pub async fn ensure_exists(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn upload_path(&self, task_id: &str) -> PathBuf {
        self.root.join(format!("upload_{task_id}.xlsx"))
    }

    pub fn result_path(&self, task_id: &str) -> PathBuf {
        self.root.join(format!("result_{task_id}.xlsx"))
    }
}

/// File name offered to clients when they download a result.
pub fn result_file_name(task_id: &str) -> String {
    format!("result_{task_id}.xlsx")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn paths_are_derived_from_task_id() {
        let area = FileArea::new("uploads");
        assert_eq!(area.upload_path("abc"), Path::new("uploads/upload_abc.xlsx"));
        assert_eq!(area.result_path("abc"), Path::new("uploads/result_abc.xlsx"));
        assert_eq!(result_file_name("abc"), "result_abc.xlsx");
    }

    #[tokio::test]
    async fn ensure_exists_creates_nested_directories() {
        let root = std::env::temp_dir()
            .join(format!("tally-files-{}", uuid::Uuid::new_v4()))
            .join("nested");
        let area = FileArea::new(&root);

        area.ensure_exists().await.expect("create dir");
        assert!(root.is_dir());
        // Idempotent.
        area.ensure_exists().await.expect("create dir again");

        let _ = std::fs::remove_dir_all(root.parent().unwrap_or(&root));
    }
}
