use crate::authentication::{hash_password, session_expires_at, validate_credentials, UserSession};
use crate::database::DbError;
use crate::handlers::{ApiJson, ServerError};
use crate::models::{NewSession, NewUser};
use crate::router::AppState;
use axum::extract::State;
use axum::response::Json;
use moodlog_common::api::{LoginRequest, LogoutResponse, RegisterRequest, SessionResponse};
use moodlog_common::domain::User;
use moodlog_common::utils::crypto_random_string;
use tracing::{error, info};

const MIN_PASSWORD_LEN: usize = 6;

fn valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((name, domain)) => {
            !name.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

async fn new_session(state: &AppState, user: User) -> Result<SessionResponse, ServerError> {
    let token = crypto_random_string::<24>().map_err(|err| {
        error!("Failed to generate session token: {err}");
        ServerError::UnexpectedError("Failed to create session")
    })?;

    let session = NewSession {
        user_id: user.id,
        token: token.clone(),
        expires_at: session_expires_at(),
    };

    state.database.add_session(session).await.map_err(|err| {
        error!("Failed to create session: {err}");
        ServerError::UnexpectedError("Failed to create session")
    })?;

    Ok(SessionResponse {
        session: token,
        user,
    })
}

pub async fn register(
    state: State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Json<SessionResponse>, ServerError> {
    let email = req.email.trim().to_lowercase();
    if !valid_email(&email) {
        return Err(ServerError::Validation("Invalid email address"));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServerError::Validation(
            "Password should be at least 6 characters",
        ));
    }
    if req.first_name.trim().is_empty() || req.last_name.trim().is_empty() {
        return Err(ServerError::Validation("First and last name are required"));
    }

    match state.database.get_user(&email).await {
        Ok(_) => return Err(ServerError::Conflict("User already registered")),
        Err(DbError::NotFound) => {}
        Err(DbError::Other(err)) => {
            error!("Database error: {err}");
            return Err(ServerError::DatabaseError("register"));
        }
    }

    let hashed_password = hash_password(&req.password).map_err(|err| {
        error!("Failed to hash password {err}");
        ServerError::UnexpectedError("Failed to register user")
    })?;

    let new_user = NewUser {
        email,
        password: hashed_password,
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
    };
    let user = state.database.add_user(new_user).await.map_err(|err| {
        error!("Failed saving user: {err}");
        ServerError::UnexpectedError("Failed to register user")
    })?;

    info!("registered user {}", user.id);

    Ok(Json(new_session(&state, user).await?))
}

pub async fn login(
    state: State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<SessionResponse>, ServerError> {
    let email = req.email.trim().to_lowercase();
    let user = validate_credentials(&state.database, &email, &req.password).await?;

    Ok(Json(new_session(&state, user).await?))
}

pub async fn logout(
    session: UserSession,
    state: State<AppState>,
) -> Result<Json<LogoutResponse>, ServerError> {
    state
        .database
        .remove_session(session.token())
        .await
        .map_err(|err| {
            error!("Database error: {err}");
            ServerError::UnexpectedError("Database error")
        })?;

    Ok(Json(LogoutResponse { ok: true }))
}

pub async fn session(session: UserSession) -> Json<SessionResponse> {
    Json(SessionResponse {
        session: session.token().to_string(),
        user: session.user,
    })
}

#[cfg(test)]
mod tests {
    use super::valid_email;

    #[test]
    fn email_validation() {
        assert!(valid_email("a@b.pl"));
        assert!(!valid_email("a@b"));
        assert!(!valid_email("@b.pl"));
        assert!(!valid_email("ab.pl"));
        assert!(!valid_email("a@b."));
    }
}
