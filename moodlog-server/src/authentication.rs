use crate::database::{Database, DbError};
use crate::error::ServerError;
use crate::router::AppState;
use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordVerifier, Version};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use eyre::Context;
use moodlog_common::domain::User;
use time::{Duration, OffsetDateTime};
use tracing::error;

pub(crate) fn hash_password(value: &str) -> eyre::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let params = Params::new(15000, 2, 1, None)
        .map_err(|err| eyre::eyre!("Invalid argon2 params: {err}"))?;
    let password_hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(value.as_bytes(), &salt)
        .map_err(|err| eyre::eyre!("Failed to hash password: {err}"))?
        .to_string();
    Ok(password_hash)
}

pub(crate) fn session_expires_at() -> OffsetDateTime {
    OffsetDateTime::now_utc().saturating_add(Duration::weeks(12))
}

pub(crate) fn verify_password_hash(expected: &str, provided: &str) -> Result<(), ServerError> {
    let expected_password_hash = PasswordHash::new(expected).map_err(|err| {
        error!("Failed to parse hash in PHC string format. {err}");
        ServerError::UnexpectedError("Failed to parse hash")
    })?;

    Argon2::default()
        .verify_password(provided.as_bytes(), &expected_password_hash)
        .context("Invalid password.")
        .map_err(|_| ServerError::InvalidCredentials)
}

/// Checks the password against the stored hash. Unknown emails still go through a hash
/// verification so both failures take about the same time.
pub(crate) async fn validate_credentials(
    db: &Database,
    email: &str,
    password: &str,
) -> Result<User, ServerError> {
    let mut user = None;
    let mut expected_password_hash = "$argon2id$v=19$m=15000,t=2,p=1$\
        gZiV/M1gPc22ElAH/Jh1Hw$\
        CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno"
        .to_string();

    match db.get_user(email).await {
        Ok(u) => {
            expected_password_hash = u.password.clone();
            user = Some(u);
        }
        Err(DbError::NotFound) => {}
        Err(DbError::Other(err)) => {
            error!("failed query {err}");
            return Err(ServerError::UnexpectedError("Failed to execute query"));
        }
    }

    verify_password_hash(&expected_password_hash, password)?;

    user.map(User::from).ok_or(ServerError::InvalidCredentials)
}

/// The caller of a request, resolved from the `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct UserSession {
    token: String,
    pub user: User,
}

impl UserSession {
    pub fn token(&self) -> &str {
        &self.token
    }
}

#[async_trait::async_trait]
impl FromRequestParts<AppState> for UserSession {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|x| x.to_str().ok())
            .and_then(|x| x.strip_prefix("Bearer "))
            .map(|x| x.trim().to_string())
            .ok_or(ServerError::Unauthorized("Missing session token"))?;

        let session = match state.database.get_session(&token).await {
            Ok(s) => s,
            Err(DbError::NotFound) => return Err(ServerError::Unauthorized("Invalid session")),
            Err(DbError::Other(err)) => {
                error!("Failed to load session: {err}");
                return Err(ServerError::DatabaseError("session"));
            }
        };

        if session.expires_at < OffsetDateTime::now_utc() {
            return Err(ServerError::Unauthorized("Session expired"));
        }

        Ok(UserSession {
            token,
            user: session.user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies() {
        let hash = hash_password("secret123").unwrap();
        assert!(verify_password_hash(&hash, "secret123").is_ok());
        assert!(matches!(
            verify_password_hash(&hash, "secret124"),
            Err(ServerError::InvalidCredentials)
        ));
    }
}
