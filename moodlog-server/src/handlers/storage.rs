use crate::authentication::UserSession;
use crate::handlers::{ApiJson, ServerError};
use crate::router::AppState;
use crate::storage::{content_type, StorageError};
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use moodlog_common::api::{RemoveObjectsRequest, UploadResponse};
use tracing::error;

#[derive(Debug, Default, serde::Deserialize)]
pub struct UploadParams {
    #[serde(default)]
    pub upsert: bool,
}

impl From<StorageError> for ServerError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::UnknownBucket => ServerError::NotFound("bucket"),
            StorageError::InvalidPath => ServerError::Validation("Invalid object path"),
            StorageError::Forbidden => ServerError::Forbidden("Object belongs to another user"),
            StorageError::Exists => ServerError::Conflict("The resource already exists"),
            StorageError::NotFound => ServerError::NotFound("object"),
            StorageError::Io(err) => {
                error!("Storage failure: {err}");
                ServerError::UnexpectedError("storage")
            }
        }
    }
}

pub async fn upload(
    session: UserSession,
    state: State<AppState>,
    Path((bucket, path)): Path<(String, String)>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<Json<UploadResponse>, ServerError> {
    state
        .storage
        .put(&bucket, &path, &session.user.id, &body, params.upsert)?;

    Ok(Json(UploadResponse { path }))
}

/// Object reads are public so `public_url` links work without a session.
pub async fn download(
    state: State<AppState>,
    Path((bucket, path)): Path<(String, String)>,
) -> Result<impl IntoResponse, ServerError> {
    let bytes = state.storage.get(&bucket, &path)?;

    Ok(([(CONTENT_TYPE, content_type(&path))], bytes))
}

pub async fn remove(
    session: UserSession,
    state: State<AppState>,
    Path(bucket): Path<String>,
    ApiJson(req): ApiJson<RemoveObjectsRequest>,
) -> Result<StatusCode, ServerError> {
    state.storage.remove(&bucket, &req.paths, &session.user.id)?;

    Ok(StatusCode::NO_CONTENT)
}
