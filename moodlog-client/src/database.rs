use eyre::{eyre, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use time::OffsetDateTime;
use tracing::debug;

// updated_at/stored_at -> unix timestamp

/// A response kept by the background worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResponse {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl<'r> FromRow<'r, SqliteRow> for StoredResponse {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            url: row.try_get("url")?,
            status: row.try_get::<i64, _>("status").and_then(|x| {
                u16::try_from(x).map_err(|err| sqlx::Error::Decode(Box::new(err)))
            })?,
            content_type: row.try_get("content_type")?,
            body: row.try_get("body")?,
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
            .ok_or_else(|| eyre!("Database path is not valid utf-8"))?;
        let in_memory = url.contains(":memory:");

        if !in_memory && !path.exists() {
            if let Some(dir) = path.parent() {
                fs_err::create_dir_all(dir)?;
            }
        }

        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
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

    pub async fn save_value(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            insert into cache(key, value, updated_at)
            values(?1, ?2, ?3)
            on conflict(key) do update set
                value = ?2,
                updated_at = ?3
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(OffsetDateTime::now_utc().unix_timestamp())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn load_value(&self, key: &str) -> Result<Option<String>> {
        let res: Option<(String,)> = sqlx::query_as("select value from cache where key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(res.map(|x| x.0))
    }

    pub async fn delete_value(&self, key: &str) -> Result<()> {
        sqlx::query("delete from cache where key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn put_response(&self, cache_name: &str, res: &StoredResponse) -> Result<()> {
        sqlx::query(
            r#"
            insert into worker_cache(cache_name, url, status, content_type, body, stored_at)
            values(?1, ?2, ?3, ?4, ?5, ?6)
            on conflict(cache_name, url) do update set
                status = ?3,
                content_type = ?4,
                body = ?5,
                stored_at = ?6
            "#,
        )
        .bind(cache_name)
        .bind(res.url.as_str())
        .bind(i64::from(res.status))
        .bind(res.content_type.as_deref())
        .bind(res.body.as_slice())
        .bind(OffsetDateTime::now_utc().unix_timestamp())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Looks the url up in every cache, newest first.
    pub async fn match_response(&self, url: &str) -> Result<Option<StoredResponse>> {
        let res = sqlx::query_as(
            "select * from worker_cache where url = ?1 order by stored_at desc limit 1",
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(res)
    }

    pub async fn cache_names(&self) -> Result<Vec<String>> {
        let res: Vec<(String,)> =
            sqlx::query_as("select distinct cache_name from worker_cache order by cache_name")
                .fetch_all(&self.pool)
                .await?;

        Ok(res.into_iter().map(|x| x.0).collect())
    }

    pub async fn delete_caches_except(&self, keep: &str) -> Result<u64> {
        let res = sqlx::query("delete from worker_cache where cache_name != ?1")
            .bind(keep)
            .execute(&self.pool)
            .await?;

        Ok(res.rows_affected())
    }
}
