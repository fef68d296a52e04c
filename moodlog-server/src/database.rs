use crate::models::{DbUser, NewSession, NewUser, Session};
use eyre::Result;
use futures_util::TryStreamExt;
use moodlog_common::api::{NewEntryRequest, PushSubscriptionRequest, UpdateEntryRequest};
use moodlog_common::domain::{format_date, parse_date, Entry, Profile, Rating, User, UserId};
use sql_builder::{quote, SqlBuilder};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

// created_at/expires_at/last_seen_at -> unix timestamp
// entry_date -> "YYYY-MM-DD" text so that it sorts as a date

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("row not found")]
    NotFound,
    #[error(transparent)]
    Other(#[from] eyre::Report),
}

impl From<sqlx::Error> for DbError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::RowNotFound => DbError::NotFound,
            err => DbError::Other(err.into()),
        }
    }
}

fn decode_err<E: std::error::Error + Send + Sync + 'static>(err: E) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}

fn user_id(row: &SqliteRow, column: &str) -> sqlx::Result<UserId> {
    row.try_get(column)
        .and_then(|x: &str| UserId::from_str(x).map_err(decode_err))
}

fn rating(row: &SqliteRow, column: &str) -> sqlx::Result<Option<Rating>> {
    row.try_get(column).and_then(|x: Option<i64>| {
        x.map(|v| Rating::try_from(v).map_err(decode_err))
            .transpose()
    })
}

pub struct DbEntry(pub Entry);

impl<'r> FromRow<'r, SqliteRow> for DbEntry {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self(Entry {
            id: row
                .try_get("id")
                .and_then(|x: &str| Uuid::parse_str(x).map_err(decode_err))?,
            user_id: user_id(row, "user_id")?,
            entry_date: row
                .try_get("entry_date")
                .and_then(|x: &str| parse_date(x).map_err(decode_err))?,
            mood: rating(row, "mood")?,
            energy: rating(row, "energy")?,
            stress: rating(row, "stress")?,
            note: row.try_get("note")?,
            photo_path: row.try_get("photo_path")?,
            created_at: row
                .try_get("created_at")
                .and_then(|x: i64| OffsetDateTime::from_unix_timestamp(x).map_err(decode_err))?,
        }))
    }
}

pub struct DbProfile(pub Profile);

impl<'r> FromRow<'r, SqliteRow> for DbProfile {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self(Profile {
            id: user_id(row, "id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
            avatar_path: row.try_get("avatar_path")?,
        }))
    }
}

impl<'r> FromRow<'r, SqliteRow> for DbUser {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(DbUser {
            id: user_id(row, "id")?,
            email: row.try_get("email")?,
            password: row.try_get("password")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
        })
    }
}

#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("opening database at {:?}", path);
        let url = path
            .to_str()
            .ok_or_else(|| eyre::eyre!("Database path is not valid utf-8"))?;
        let in_memory = url.contains(":memory:");

        if !in_memory && !path.exists() {
            if let Some(dir) = path.parent() {
                fs_err::create_dir_all(dir)?;
            }
        }

        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        // Every connection to an in-memory database is its own database.
        let pool = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        }
        .connect_with(options)
        .await?;

        Self::setup_db(&pool).await?;

        Ok(Self { pool })
    }

    async fn setup_db(pool: &SqlitePool) -> Result<()> {
        debug!("setting up database");
        sqlx::migrate!("./migrations").run(pool).await?;

        Ok(())
    }

    /// Creates the user and its profile in one go. The profile starts from the sign up
    /// metadata.
    pub async fn add_user(&self, user: NewUser) -> Result<User, DbError> {
        let id = UserId::new();
        let created_at = OffsetDateTime::now_utc().unix_timestamp();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            insert into users(id, email, password, first_name, last_name, created_at)
            values(?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(id.to_string())
        .bind(user.email.as_str())
        .bind(user.password.as_str())
        .bind(user.first_name.as_str())
        .bind(user.last_name.as_str())
        .bind(created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            insert into profiles(id, first_name, last_name, email)
            values(?1, ?2, ?3, ?4)
            "#,
        )
        .bind(id.to_string())
        .bind(user.first_name.as_str())
        .bind(user.last_name.as_str())
        .bind(user.email.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(User {
            id,
            email: user.email,
            first_name: Some(user.first_name),
            last_name: Some(user.last_name),
        })
    }

    pub async fn get_user(&self, email: &str) -> Result<DbUser, DbError> {
        let user = sqlx::query_as("select * from users where email = ?1")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn add_session(&self, session: NewSession) -> Result<(), DbError> {
        sqlx::query(
            r#"
            insert into sessions(user_id, token, expires_at)
            values(?1, ?2, ?3)
            "#,
        )
        .bind(session.user_id.to_string())
        .bind(session.token)
        .bind(session.expires_at.unix_timestamp())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_session(&self, token: &str) -> Result<Session, DbError> {
        let row = sqlx::query(
            r#"
            select users.*, sessions.expires_at from sessions
            join users on users.id = sessions.user_id
            where sessions.token = ?1
            "#,
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await?;

        let user = DbUser::from_row(&row)?;
        let expires_at = OffsetDateTime::from_unix_timestamp(row.try_get("expires_at")?)
            .map_err(|err| DbError::Other(err.into()))?;

        Ok(Session {
            user: user.into(),
            expires_at,
        })
    }

    pub async fn remove_session(&self, token: &str) -> Result<(), DbError> {
        sqlx::query("delete from sessions where token = ?1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn list_entries(&self, user_id: &UserId, limit: Option<u32>) -> Result<Vec<Entry>> {
        let mut query = SqlBuilder::select_from("entries");
        query
            .field("*")
            .and_where_eq("user_id", quote(user_id.to_string()))
            .order_desc("entry_date")
            .order_desc("created_at");

        if let Some(limit) = limit {
            query.limit(limit);
        }

        let query = query
            .sql()
            .map_err(|err| eyre::eyre!("Failed to build query: {err}"))?;
        let res = sqlx::query_as(&query)
            .fetch(&self.pool)
            .map_ok(|DbEntry(entry)| entry)
            .try_collect()
            .await?;

        Ok(res)
    }

    pub async fn add_entry(&self, user_id: &UserId, req: &NewEntryRequest) -> Result<Entry, DbError> {
        let entry = Entry {
            id: Uuid::now_v7(),
            user_id: *user_id,
            entry_date: req.entry_date,
            mood: Some(req.mood),
            energy: Some(req.energy),
            stress: Some(req.stress),
            note: req.note.clone(),
            photo_path: req.photo_path.clone(),
            created_at: OffsetDateTime::now_utc(),
        };

        sqlx::query(
            r#"
            insert into entries(
                id, user_id, entry_date, mood, energy, stress, note, photo_path, created_at
            ) values(
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9
            )
            "#,
        )
        .bind(entry.id.to_string())
        .bind(user_id.to_string())
        .bind(format_date(entry.entry_date))
        .bind(i64::from(req.mood))
        .bind(i64::from(req.energy))
        .bind(i64::from(req.stress))
        .bind(entry.note.as_deref())
        .bind(entry.photo_path.as_deref())
        .bind(entry.created_at.unix_timestamp())
        .execute(&self.pool)
        .await?;

        Ok(entry)
    }

    pub async fn update_entry(
        &self,
        user_id: &UserId,
        id: Uuid,
        req: &UpdateEntryRequest,
    ) -> Result<Entry, DbError> {
        let DbEntry(entry) = sqlx::query_as(
            r#"
            update entries set entry_date = ?3, mood = ?4, note = ?5
            where id = ?1 and user_id = ?2
            returning *
            "#,
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(format_date(req.entry_date))
        .bind(i64::from(req.mood))
        .bind(req.note.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Photo of an entry. A missing entry is not an error, it simply has no photo.
    pub async fn entry_photo(&self, user_id: &UserId, id: Uuid) -> Result<Option<String>, DbError> {
        let res: Option<(Option<String>,)> =
            sqlx::query_as("select photo_path from entries where id = ?1 and user_id = ?2")
                .bind(id.to_string())
                .bind(user_id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        Ok(res.and_then(|x| x.0))
    }

    pub async fn delete_entry(&self, user_id: &UserId, id: Uuid) -> Result<(), DbError> {
        let res = sqlx::query("delete from entries where id = ?1 and user_id = ?2")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        if res.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }

    pub async fn get_profile(&self, user_id: &UserId) -> Result<Profile, DbError> {
        let DbProfile(profile) = sqlx::query_as("select * from profiles where id = ?1")
            .bind(user_id.to_string())
            .fetch_one(&self.pool)
            .await?;

        Ok(profile)
    }

    pub async fn set_avatar(&self, user_id: &UserId, avatar_path: &str) -> Result<(), DbError> {
        let res = sqlx::query("update profiles set avatar_path = ?2 where id = ?1")
            .bind(user_id.to_string())
            .bind(avatar_path)
            .execute(&self.pool)
            .await?;

        if res.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }

    pub async fn upsert_push_subscription(
        &self,
        user_id: &UserId,
        sub: &PushSubscriptionRequest,
    ) -> Result<(), DbError> {
        sqlx::query(
            r#"
            insert into push_subscriptions(
                user_id, endpoint, p256dh, auth, user_agent, last_seen_at, is_active
            ) values(
                ?1, ?2, ?3, ?4, ?5, ?6, 1
            )
            on conflict(endpoint) do update set
                user_id = ?1,
                p256dh = ?3,
                auth = ?4,
                user_agent = ?5,
                last_seen_at = ?6,
                is_active = 1
            "#,
        )
        .bind(user_id.to_string())
        .bind(sub.endpoint.as_str())
        .bind(sub.p256dh.as_str())
        .bind(sub.auth.as_str())
        .bind(sub.user_agent.as_str())
        .bind(OffsetDateTime::now_utc().unix_timestamp())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn deactivate_push_subscription(
        &self,
        user_id: &UserId,
        endpoint: &str,
    ) -> Result<(), DbError> {
        sqlx::query(
            r#"
            update push_subscriptions set is_active = 0, last_seen_at = ?3
            where endpoint = ?1 and user_id = ?2
            "#,
        )
        .bind(endpoint)
        .bind(user_id.to_string())
        .bind(OffsetDateTime::now_utc().unix_timestamp())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Active flag of a subscription, `None` when the endpoint is unknown.
    pub async fn push_subscription_active(&self, endpoint: &str) -> Result<Option<bool>, DbError> {
        let res: Option<(bool,)> =
            sqlx::query_as("select is_active from push_subscriptions where endpoint = ?1")
                .bind(endpoint)
                .fetch_optional(&self.pool)
                .await?;

        Ok(res.map(|x| x.0))
    }
}
