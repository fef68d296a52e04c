use eyre::Result;
use moodlog_common::api::{NewEntryRequest, PushSubscriptionRequest, RegisterRequest, UpdateEntryRequest};
use moodlog_common::domain::{Entry, Profile, User};
use tokio::sync::broadcast;
use uuid::Uuid;

pub const PHOTOS_BUCKET: &str = "wpisy-photos";
pub const AVATARS_BUCKET: &str = "avatars";

/// Sent whenever the signed in user changes. `None` means signed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChange {
    pub user: Option<User>,
}

/// Everything the client needs from the hosted service: auth, rows scoped to the signed in
/// user and object storage.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Current session, checked locally without a network round trip.
    fn session(&self) -> Option<User>;

    fn auth_changes(&self) -> broadcast::Receiver<AuthChange>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<User>;

    /// Creates the account. Does not sign in.
    async fn sign_up(&self, req: &RegisterRequest) -> Result<User>;

    async fn sign_out(&self) -> Result<()>;

    /// Entries of the signed in user, newest entry date first.
    async fn list_entries(&self, limit: Option<u32>) -> Result<Vec<Entry>>;

    async fn insert_entry(&self, req: &NewEntryRequest) -> Result<Entry>;

    async fn update_entry(&self, id: Uuid, req: &UpdateEntryRequest) -> Result<Entry>;

    async fn entry_photo(&self, id: Uuid) -> Result<Option<String>>;

    async fn delete_entry(&self, id: Uuid) -> Result<()>;

    async fn profile(&self) -> Result<Profile>;

    async fn set_avatar(&self, avatar_path: &str) -> Result<()>;

    async fn upsert_push_subscription(&self, sub: &PushSubscriptionRequest) -> Result<()>;

    async fn deactivate_push_subscription(&self, endpoint: &str) -> Result<()>;

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<String>;

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<()>;

    fn public_url(&self, bucket: &str, path: &str) -> String;
}
