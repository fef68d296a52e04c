use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use moodlog_common::api::ErrorMessage;
use tracing::debug;

#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    DatabaseError(&'static str),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(&'static str),

    #[error("Incorrect input: {0}")]
    Validation(&'static str),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("Forbidden: {0}")]
    Forbidden(&'static str),

    #[error("Unexpected error: {0}")]
    UnexpectedError(&'static str),

    #[error("Conflict: {0}")]
    Conflict(&'static str),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::InvalidCredentials => StatusCode::BAD_REQUEST,
            ServerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServerError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServerError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ServerError::BadRequest(v) => v.clone(),
            ServerError::NotFound(v)
            | ServerError::Validation(v)
            | ServerError::Conflict(v)
            | ServerError::Unauthorized(v)
            | ServerError::Forbidden(v) => v.to_string(),
            ServerError::InvalidCredentials => "Invalid login credentials".to_string(),
            ServerError::UnexpectedError(_) | ServerError::DatabaseError(_) => {
                "An unexpected error occurred. Please try again later".into()
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        debug!("request failed with {status}: {self}");

        (
            status,
            Json(ErrorMessage {
                value: self.message(),
            }),
        )
            .into_response()
    }
}
