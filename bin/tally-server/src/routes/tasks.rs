//! Upload / poll / download endpoints.
//!
//! `POST /upload` stores the spreadsheet and queues it on the worker pool;
//! the report is built in the background. Clients poll
//! `GET /status/{task_id}` and fetch `GET /result/{task_id}` once the task
//! reports `success`. Report failures never fail the upload itself, they
//! only show up in the polled status.

use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tally_core::TaskStatus;
use tally_core::files::result_file_name;
use tracing::{debug, info, warn};
use utoipa::OpenApi;
use uuid::Uuid;

use crate::error::ServerError;
use crate::schemas::task::{TaskStatusResponse, UploadRequest, UploadResponse};
use crate::state::AppState;

pub const XLSX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(upload, get_status, get_result),
    components(schemas(UploadRequest, UploadResponse, TaskStatusResponse))
)]
pub struct TasksApi;

pub fn router(state: &AppState) -> Router<Arc<AppState>> {
    let upload_limit = state
        .config
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD);
    Router::new()
        .route(
            "/upload",
            post(upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/status/{task_id}", get(get_status))
        .route("/result/{task_id}", get(get_result))
}

/// Upload a spreadsheet (`POST /upload`).
///
/// Stores the file, registers a `pending` task and queues the report.
/// Returns `{"task_id": "..."}` immediately.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "tasks",
    request_body(content = UploadRequest, content_type = "multipart/form-data", description = "Spreadsheet upload"),
    responses(
        (status = 200, description = "Task accepted", body = UploadResponse),
        (status = 400, description = "Missing `file` field or malformed multipart body"),
        (status = 413, description = "File too large"),
        (status = 500, description = "Upload could not be stored"),
    )
)]
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ServerError> {
    let max_bytes = state.config.max_upload_bytes;
    let mut file_bytes: Option<Vec<u8>> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("unknown").to_owned();
        if field_name != "file" {
            debug!(field = %field_name, "ignoring multipart field");
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_owned();
        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            bytes.extend_from_slice(&chunk);
            if bytes.len() > max_bytes {
                return Err(ServerError::PayloadTooLarge(format!(
                    "file exceeds the maximum upload size of {max_bytes} bytes"
                )));
            }
        }

        debug!(file_name = %file_name, size_bytes = bytes.len(), "received file upload");
        file_bytes = Some(bytes);
    }

    let Some(bytes) = file_bytes else {
        return Err(ServerError::BadRequest(
            "no file uploaded; expected multipart field 'file'".into(),
        ));
    };

    let task_id = Uuid::new_v4().to_string();
    let file_path = state.files.upload_path(&task_id);
    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| ServerError::Internal(format!("failed to write upload: {e}")))?;

    state.tasks.create_pending(task_id.clone(), file_path.clone()).await;

    if let Err(e) = state.dispatcher.submit(task_id.clone(), file_path.clone()) {
        warn!(task_id = %task_id, error = %e, "failed to queue report");
        if let Err(rm) = tokio::fs::remove_file(&file_path).await {
            warn!(task_id = %task_id, error = %rm, "failed to remove unqueued upload");
        }
        state.tasks.mark_failed(&task_id, e.to_string()).await;
    } else {
        info!(task_id = %task_id, size_bytes = bytes.len(), "upload accepted");
    }

    Ok(Json(UploadResponse { task_id }))
}

/// Poll a task (`GET /status/{task_id}`).
#[utoipa::path(
    get,
    path = "/status/{task_id}",
    tag = "tasks",
    params(
        ("task_id" = String, Path, description = "ID returned by /upload")
    ),
    responses(
        (status = 200, description = "Task status", body = TaskStatusResponse),
        (status = 404, description = "Task not found"),
    )
)]
pub async fn get_status(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskStatusResponse>, ServerError> {
    let record = state
        .tasks
        .get(&task_id)
        .await
        .ok_or_else(|| ServerError::NotFound(format!("task {task_id} not found")))?;

    Ok(Json(TaskStatusResponse::from(&record)))
}

/// Download a finished report (`GET /result/{task_id}`).
///
/// Pending and failed tasks answer 404 just like unknown ones.
#[utoipa::path(
    get,
    path = "/result/{task_id}",
    tag = "tasks",
    params(
        ("task_id" = String, Path, description = "ID returned by /upload")
    ),
    responses(
        (status = 200, description = "Report spreadsheet", body = Vec<u8>,
            content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 404, description = "Task not found or not completed"),
    )
)]
pub async fn get_result(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Response, ServerError> {
    let record = state
        .tasks
        .get(&task_id)
        .await
        .ok_or_else(|| ServerError::NotFound(format!("task {task_id} not found")))?;

    let result_path = match (record.status(), record.result_path()) {
        (TaskStatus::Success, Some(path)) => path.to_path_buf(),
        _ => {
            return Err(ServerError::NotFound(format!(
                "task {task_id} is not completed"
            )));
        }
    };

    let bytes = tokio::fs::read(&result_path).await?;
    let disposition = format!("attachment; filename=\"{}\"", result_file_name(&task_id));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, XLSX_MEDIA_TYPE.to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

fn multipart_error(e: MultipartError) -> ServerError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge(e.body_text())
    } else {
        ServerError::BadRequest(format!("failed to read multipart body: {}", e.body_text()))
    }
}
