use std::io;

use axum::Json;
use axum::body::Bytes;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::{Stream, TryStreamExt};
use ingest_store::{ErrorKind, ProjectStore, SaveReport, UploadReport, sanitize_project_name};
use serde_json::{Value, json};
use tokio_util::io::StreamReader;
use tracing::warn;

/// Multipart field carrying the archive on upload.
pub const ARCHIVE_FIELD: &str = "archive";

/// Error response: a status code and `{"detail": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl From<ingest_store::Error> for ApiError {
    fn from(e: ingest_store::Error) -> Self {
        let status = match e.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Io => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!(error = %e, "request failed");
        }
        Self {
            status,
            detail: e.to_string(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        Self {
            status: e.status(),
            detail: e.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

/// The field's body as an `AsyncRead`.
fn field_reader(field: Field<'_>) -> StreamReader<impl Stream<Item = io::Result<Bytes>>, Bytes> {
    StreamReader::new(field.map_err(io::Error::other))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn list_projects(
    State(store): State<ProjectStore>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(store.list_projects()?))
}

pub async fn list_files(
    State(store): State<ProjectStore>,
    Path(project): Path<String>,
) -> Json<Vec<String>> {
    Json(store.list_files(&project))
}

pub async fn delete_project(
    State(store): State<ProjectStore>,
    Path(project): Path<String>,
) -> Result<Json<Value>, ApiError> {
    store.delete_project(&project)?;
    Ok(Json(json!({ "message": format!("Project {project} deleted successfully") })))
}

pub async fn delete_file(
    State(store): State<ProjectStore>,
    Path((project, filename)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    store.delete_file(&project, &filename)?;
    Ok(Json(json!({ "message": format!("File {filename} deleted successfully") })))
}

/// Expand the `archive` field into the project. Other fields are ignored.
pub async fn upload_archive(
    State(store): State<ProjectStore>,
    Path(project): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadReport>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(ARCHIVE_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_owned) else {
            return Err(ApiError::bad_request("the archive field has no file name"));
        };

        let reader = field_reader(field);
        tokio::pin!(reader);
        let report = store.upload_archive(&project, &filename, &mut reader).await?;
        return Ok(Json(report));
    }
    Err(ApiError::bad_request(format!("missing multipart field '{ARCHIVE_FIELD}'")))
}

/// Store every file field as-is. Fields without a file name are ignored.
pub async fn save_files(
    State(store): State<ProjectStore>,
    Path(project): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<SaveReport>, ApiError> {
    let project = sanitize_project_name(&project)?;
    let mut report = SaveReport::new(project.clone());

    while let Some(field) = multipart.next_field().await? {
        let Some(filename) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let reader = field_reader(field);
        tokio::pin!(reader);
        let outcome = store.save_file(&project, &filename, &mut reader).await;
        report.record(&filename, outcome);
    }

    Ok(Json(report))
}
