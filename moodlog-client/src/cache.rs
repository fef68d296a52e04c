//! Offline key/value cache.
//!
//! Values are stored as JSON in the local database. Writes overwrite whatever was stored
//! under the key before: there is no merging and no conflict detection with the server,
//! the last write wins.

use crate::database::Database;
use eyre::Result;
use moodlog_common::domain::UserId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

pub const WEATHER_KEY: &str = "weather_cache";
pub const LAST_EMAIL_KEY: &str = "lastUserEmail";
pub const PUSH_SUBSCRIPTION_KEY: &str = "push_subscription";

/// Entry lists are kept per user so two accounts on one machine never see each other's rows.
pub fn entries_key(user: Option<&UserId>) -> String {
    match user {
        Some(id) => format!("wpisy_cache_{id}"),
        None => "wpisy_cache_anon".to_string(),
    }
}

#[derive(Clone)]
pub struct Cache {
    db: Database,
}

impl Cache {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.db.save_value(key, &raw).await
    }

    /// The stored value, or `fallback` when it is missing, can not be decoded or the store
    /// can not be read. Never fails.
    pub async fn get<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        let raw = match self.db.load_value(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return fallback,
            Err(err) => {
                warn!("failed to read cache key {key}: {err}");
                return fallback;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(err) => {
                warn!("ignoring corrupt cache value under {key}: {err}");
                fallback
            }
        }
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        self.db.delete_value(key).await
    }

    /// Stores a raw string without encoding it.
    pub async fn set_raw(&self, key: &str, raw: &str) -> Result<()> {
        self.db.save_value(key, raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    async fn cache() -> Cache {
        Cache::new(Database::new("sqlite::memory:").await.unwrap())
    }

    #[tokio::test]
    async fn stored_value_comes_back_equal() {
        let cache = cache().await;
        cache.set("k", &json!({"a": 1})).await.unwrap();

        let v: Value = cache.get("k", Value::Null).await;
        assert_eq!(v, json!({"a": 1}));
    }

    #[tokio::test]
    async fn missing_key_returns_fallback() {
        let cache = cache().await;
        let v = cache.get("missing", "fallback".to_string()).await;
        assert_eq!(v, "fallback");
    }

    #[tokio::test]
    async fn corrupt_value_returns_fallback() {
        let cache = cache().await;
        cache.set_raw("k", "{not json").await.unwrap();

        let v: Vec<String> = cache.get("k", vec!["x".to_string()]).await;
        assert_eq!(v, vec!["x".to_string()]);
    }

    #[tokio::test]
    async fn last_write_wins() {
        let cache = cache().await;
        cache.set("k", &1).await.unwrap();
        cache.set("k", &2).await.unwrap();
        assert_eq!(cache.get("k", 0).await, 2);

        cache.remove("k").await.unwrap();
        assert_eq!(cache.get("k", 0).await, 0);
    }

    #[test]
    fn entry_keys_are_per_user() {
        let id = UserId::new();
        assert_eq!(entries_key(Some(&id)), format!("wpisy_cache_{id}"));
        assert_eq!(entries_key(None), "wpisy_cache_anon");
    }
}
