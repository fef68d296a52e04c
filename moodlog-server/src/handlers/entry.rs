use crate::authentication::UserSession;
use crate::database::DbError;
use crate::handlers::{ApiJson, ServerError};
use crate::router::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use moodlog_common::api::{
    EntryPhotoResponse, ListEntriesQuery, NewEntryRequest, UpdateEntryRequest,
};
use moodlog_common::domain::Entry;
use tracing::error;
use uuid::Uuid;

fn photo_owned_by(session: &UserSession, photo_path: Option<&str>) -> Result<(), ServerError> {
    match photo_path {
        Some(p) if !p.starts_with(&format!("{}/", session.user.id)) => {
            Err(ServerError::Forbidden("Photo belongs to another user"))
        }
        _ => Ok(()),
    }
}

pub async fn list(
    session: UserSession,
    state: State<AppState>,
    Query(params): Query<ListEntriesQuery>,
) -> Result<Json<Vec<Entry>>, ServerError> {
    let res = state
        .database
        .list_entries(&session.user.id, params.limit)
        .await
        .map_err(|err| {
            error!("Failed to list entries {err}");
            ServerError::DatabaseError("list entries")
        })?;

    Ok(Json(res))
}

pub async fn add(
    session: UserSession,
    state: State<AppState>,
    ApiJson(req): ApiJson<NewEntryRequest>,
) -> Result<impl IntoResponse, ServerError> {
    photo_owned_by(&session, req.photo_path.as_deref())?;

    let entry = state
        .database
        .add_entry(&session.user.id, &req)
        .await
        .map_err(|err| {
            error!("Failed to add entry {err}");
            ServerError::DatabaseError("add entry")
        })?;

    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update(
    session: UserSession,
    state: State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<UpdateEntryRequest>,
) -> Result<Json<Entry>, ServerError> {
    match state.database.update_entry(&session.user.id, id, &req).await {
        Ok(entry) => Ok(Json(entry)),
        Err(DbError::NotFound) => Err(ServerError::NotFound("entry")),
        Err(DbError::Other(err)) => {
            error!("Failed to update entry {err}");
            Err(ServerError::DatabaseError("update entry"))
        }
    }
}

pub async fn photo(
    session: UserSession,
    state: State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EntryPhotoResponse>, ServerError> {
    let photo_path = state
        .database
        .entry_photo(&session.user.id, id)
        .await
        .map_err(|err| {
            error!("Failed to read entry photo {err}");
            ServerError::DatabaseError("entry photo")
        })?;

    Ok(Json(EntryPhotoResponse { photo_path }))
}

pub async fn delete(
    session: UserSession,
    state: State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    match state.database.delete_entry(&session.user.id, id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(DbError::NotFound) => Err(ServerError::NotFound("entry")),
        Err(DbError::Other(err)) => {
            error!("Failed to delete entry {err}");
            Err(ServerError::DatabaseError("delete entry"))
        }
    }
}
