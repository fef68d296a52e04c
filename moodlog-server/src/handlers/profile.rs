use crate::authentication::UserSession;
use crate::database::DbError;
use crate::handlers::{ApiJson, ServerError};
use crate::router::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use moodlog_common::api::SetAvatarRequest;
use moodlog_common::domain::Profile;
use tracing::error;

pub async fn get(session: UserSession, state: State<AppState>) -> Result<Json<Profile>, ServerError> {
    match state.database.get_profile(&session.user.id).await {
        Ok(p) => Ok(Json(p)),
        Err(DbError::NotFound) => Err(ServerError::NotFound("profile")),
        Err(DbError::Other(err)) => {
            error!("Failed to load profile {err}");
            Err(ServerError::DatabaseError("profile"))
        }
    }
}

pub async fn set_avatar(
    session: UserSession,
    state: State<AppState>,
    ApiJson(req): ApiJson<SetAvatarRequest>,
) -> Result<StatusCode, ServerError> {
    if !req.avatar_path.starts_with(&format!("{}/", session.user.id)) {
        return Err(ServerError::Forbidden("Avatar belongs to another user"));
    }

    match state
        .database
        .set_avatar(&session.user.id, &req.avatar_path)
        .await
    {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(DbError::NotFound) => Err(ServerError::NotFound("profile")),
        Err(DbError::Other(err)) => {
            error!("Failed to update avatar {err}");
            Err(ServerError::DatabaseError("profile"))
        }
    }
}
