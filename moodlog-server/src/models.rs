use moodlog_common::domain::{User, UserId};
use time::OffsetDateTime;

#[derive(Debug)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// User row together with the password hash. Never leaves the server.
#[derive(Debug)]
pub struct DbUser {
    pub id: UserId,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<DbUser> for User {
    fn from(value: DbUser) -> Self {
        User {
            id: value.id,
            email: value.email,
            first_name: value.first_name,
            last_name: value.last_name,
        }
    }
}

#[derive(Debug)]
pub struct NewSession {
    pub user_id: UserId,
    pub token: String,
    pub expires_at: OffsetDateTime,
}

#[derive(Debug)]
pub struct Session {
    pub user: User,
    pub expires_at: OffsetDateTime,
}
