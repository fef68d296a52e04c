use crate::authentication::UserSession;
use crate::handlers::{ApiJson, ServerError};
use crate::router::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use moodlog_common::api::{DeactivatePushRequest, PushSubscriptionRequest};
use tracing::error;

pub async fn subscribe(
    session: UserSession,
    state: State<AppState>,
    ApiJson(req): ApiJson<PushSubscriptionRequest>,
) -> Result<StatusCode, ServerError> {
    if req.endpoint.trim().is_empty() || req.p256dh.is_empty() || req.auth.is_empty() {
        return Err(ServerError::Validation("Incomplete push subscription"));
    }

    state
        .database
        .upsert_push_subscription(&session.user.id, &req)
        .await
        .map_err(|err| {
            error!("Failed to save push subscription {err}");
            ServerError::DatabaseError("push subscription")
        })?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn deactivate(
    session: UserSession,
    state: State<AppState>,
    ApiJson(req): ApiJson<DeactivatePushRequest>,
) -> Result<StatusCode, ServerError> {
    state
        .database
        .deactivate_push_subscription(&session.user.id, &req.endpoint)
        .await
        .map_err(|err| {
            error!("Failed to deactivate push subscription {err}");
            ServerError::DatabaseError("push subscription")
        })?;

    Ok(StatusCode::NO_CONTENT)
}
