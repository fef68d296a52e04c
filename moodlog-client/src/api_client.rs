use crate::backend::{AuthChange, Backend};
use eyre::{bail, Context, Result};
use moodlog_common::api::{
    DeactivatePushRequest, EntryPhotoResponse, ErrorMessage, HealthCheckResponse, ListEntriesQuery,
    LoginRequest, LogoutResponse, NewEntryRequest, PushSubscriptionRequest, RegisterRequest,
    RemoveObjectsRequest, SessionResponse, SetAvatarRequest, UpdateEntryRequest, UploadResponse,
};
use moodlog_common::domain::{Entry, Profile, User};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode};
use std::path::PathBuf;
use std::sync::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

/// Session persisted between runs.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub user: User,
}

async fn handle_response_error(res: Response) -> Result<Response> {
    let status = res.status();
    if status == StatusCode::SERVICE_UNAVAILABLE {
        bail!("Service unavailable.");
    }

    if !status.is_success() {
        match res.json::<ErrorMessage>().await {
            Ok(err) => bail!("{}", err.value),
            Err(_) => bail!("There was an error with the service: Status {status:?}."),
        }
    }

    Ok(res)
}

pub async fn health_check(address: &str) -> Result<HealthCheckResponse> {
    let url = format!("{address}/");
    let res = reqwest::get(url).await?;
    let res = handle_response_error(res).await?;

    let res = res.json::<HealthCheckResponse>().await?;
    Ok(res)
}

pub struct RemoteBackend {
    address: String,
    session_path: PathBuf,
    client: reqwest::Client,
    session: RwLock<Option<StoredSession>>,
    auth_tx: broadcast::Sender<AuthChange>,
}

impl RemoteBackend {
    /// Loads the stored session, if any. A session file that can not be read counts as
    /// signed out.
    pub fn new(address: &str, session_path: impl Into<PathBuf>) -> Self {
        let session_path = session_path.into();
        let session = fs_err::read_to_string(&session_path)
            .ok()
            .and_then(|raw| match serde_json::from_str::<StoredSession>(&raw) {
                Ok(s) => Some(s),
                Err(err) => {
                    warn!("ignoring unreadable session file: {err}");
                    None
                }
            });
        let (auth_tx, _) = broadcast::channel(16);

        Self {
            address: address.trim_end_matches('/').to_string(),
            session_path,
            client: reqwest::Client::new(),
            session: RwLock::new(session),
            auth_tx,
        }
    }

    fn token(&self) -> Result<String> {
        match self.stored() {
            Some(s) => Ok(s.token),
            None => bail!("Not logged in."),
        }
    }

    fn stored(&self) -> Option<StoredSession> {
        self.session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn replace_session(&self, session: Option<StoredSession>) -> Result<()> {
        match &session {
            Some(s) => {
                if let Some(dir) = self.session_path.parent() {
                    fs_err::create_dir_all(dir)?;
                }
                fs_err::write(&self.session_path, serde_json::to_string(s)?)
                    .wrap_err("Failed to create a session file")?;
            }
            None => {
                if self.session_path.exists() {
                    fs_err::remove_file(&self.session_path)?;
                }
            }
        }

        let user = session.as_ref().map(|s| s.user.clone());
        *self.session.write().unwrap_or_else(|e| e.into_inner()) = session;
        // Nobody listening is fine.
        let _ = self.auth_tx.send(AuthChange { user });
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.address)
    }

    fn authed(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        Ok(req.header(AUTHORIZATION, format!("Bearer {}", self.token()?)))
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response> {
        let res = self.authed(req)?.send().await?;
        handle_response_error(res).await
    }
}

#[async_trait::async_trait]
impl Backend for RemoteBackend {
    fn session(&self) -> Option<User> {
        self.stored().map(|s| s.user)
    }

    fn auth_changes(&self) -> broadcast::Receiver<AuthChange> {
        self.auth_tx.subscribe()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        let res = self
            .client
            .post(self.url("/auth/login"))
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        let res = handle_response_error(res).await?;
        let res = res.json::<SessionResponse>().await?;

        let user = res.user.clone();
        self.replace_session(Some(StoredSession {
            token: res.session,
            user: res.user,
        }))?;

        Ok(user)
    }

    async fn sign_up(&self, req: &RegisterRequest) -> Result<User> {
        let res = self
            .client
            .post(self.url("/auth/register"))
            .json(req)
            .send()
            .await?;
        let res = handle_response_error(res).await?;
        let res = res.json::<SessionResponse>().await?;

        Ok(res.user)
    }

    async fn sign_out(&self) -> Result<()> {
        if self.stored().is_some() {
            let req = self.client.post(self.url("/auth/logout"));
            match self.send(req).await {
                Ok(res) => {
                    let res = res.json::<LogoutResponse>().await?;
                    debug!("remote logout ok: {}", res.ok);
                }
                Err(err) => warn!("remote logout failed: {err}"),
            }
        }

        self.replace_session(None)
    }

    async fn list_entries(&self, limit: Option<u32>) -> Result<Vec<Entry>> {
        let req = self
            .client
            .get(self.url("/entries"))
            .query(&ListEntriesQuery { limit });
        let res = self.send(req).await?;
        Ok(res.json().await?)
    }

    async fn insert_entry(&self, req: &NewEntryRequest) -> Result<Entry> {
        let res = self.send(self.client.post(self.url("/entries")).json(req)).await?;
        Ok(res.json().await?)
    }

    async fn update_entry(&self, id: Uuid, req: &UpdateEntryRequest) -> Result<Entry> {
        let req = self
            .client
            .put(self.url(&format!("/entries/{id}")))
            .json(req);
        let res = self.send(req).await?;
        Ok(res.json().await?)
    }

    async fn entry_photo(&self, id: Uuid) -> Result<Option<String>> {
        let req = self.client.get(self.url(&format!("/entries/{id}/photo")));
        let res = self.send(req).await?;
        Ok(res.json::<EntryPhotoResponse>().await?.photo_path)
    }

    async fn delete_entry(&self, id: Uuid) -> Result<()> {
        let req = self.client.delete(self.url(&format!("/entries/{id}")));
        self.send(req).await?;
        Ok(())
    }

    async fn profile(&self) -> Result<Profile> {
        let res = self.send(self.client.get(self.url("/profile"))).await?;
        Ok(res.json().await?)
    }

    async fn set_avatar(&self, avatar_path: &str) -> Result<()> {
        let req = self
            .client
            .put(self.url("/profile/avatar"))
            .json(&SetAvatarRequest {
                avatar_path: avatar_path.to_string(),
            });
        self.send(req).await?;
        Ok(())
    }

    async fn upsert_push_subscription(&self, sub: &PushSubscriptionRequest) -> Result<()> {
        let req = self.client.post(self.url("/push/subscriptions")).json(sub);
        self.send(req).await?;
        Ok(())
    }

    async fn deactivate_push_subscription(&self, endpoint: &str) -> Result<()> {
        let req = self
            .client
            .post(self.url("/push/subscriptions/deactivate"))
            .json(&DeactivatePushRequest {
                endpoint: endpoint.to_string(),
            });
        self.send(req).await?;
        Ok(())
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<String> {
        let req = self
            .client
            .put(self.url(&format!("/storage/{bucket}/{path}")))
            .query(&[("upsert", upsert)])
            .header(CONTENT_TYPE, content_type)
            .body(bytes);
        let res = self.send(req).await?;
        Ok(res.json::<UploadResponse>().await?.path)
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<()> {
        let req = self
            .client
            .delete(self.url(&format!("/storage/{bucket}")))
            .json(&RemoveObjectsRequest {
                paths: paths.to_vec(),
            });
        self.send(req).await?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        let path = path
            .split('/')
            .map(|x| urlencoding::encode(x).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/storage/{bucket}/{path}", self.address)
    }
}
