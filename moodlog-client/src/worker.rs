//! Background worker: network first fetching with a local fallback, and push display.

use crate::database::{Database, StoredResponse};
use eyre::{bail, Result};
use tracing::{debug, info, warn};

pub const CACHE_NAME: &str = "moodlog-v1";

/// Resources needed to start the app without a network.
pub const APP_SHELL: &[&str] = &["/", "/manifest.webmanifest"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub url: String,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub from_cache: bool,
}

impl From<StoredResponse> for WorkerResponse {
    fn from(value: StoredResponse) -> Self {
        Self {
            status: value.status,
            content_type: value.content_type,
            body: value.body,
            from_cache: true,
        }
    }
}

fn fresh(res: StoredResponse) -> WorkerResponse {
    WorkerResponse {
        from_cache: false,
        ..WorkerResponse::from(res)
    }
}

pub struct Worker {
    db: Database,
    origin: String,
    client: reqwest::Client,
}

impl Worker {
    pub fn new(db: Database, origin: &str) -> Self {
        Self {
            db,
            origin: origin.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn same_origin(&self, url: &str) -> bool {
        url.strip_prefix(&self.origin)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'))
    }

    async fn network(&self, req: &Request) -> Result<StoredResponse> {
        let method = reqwest::Method::from_bytes(req.method.as_bytes())?;
        let res = self.client.request(method, &req.url).send().await?;
        let status = res.status().as_u16();
        let content_type = res
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|x| x.to_str().ok())
            .map(String::from);
        let body = res.bytes().await?.to_vec();

        Ok(StoredResponse {
            url: req.url.clone(),
            status,
            content_type,
            body,
        })
    }

    /// Stores the app shell under the current cache name. Fails when any resource fails.
    pub async fn install(&self) -> Result<()> {
        info!("worker install");
        for path in APP_SHELL {
            let req = Request::get(format!("{}{path}", self.origin));
            let res = self.network(&req).await?;
            if !(200..300).contains(&res.status) {
                bail!("Failed to precache {path}: status {}", res.status);
            }
            self.db.put_response(CACHE_NAME, &res).await?;
        }
        Ok(())
    }

    /// Drops every cache but the current one. Returns how many responses were removed.
    pub async fn activate(&self) -> Result<u64> {
        info!("worker activate");
        let names = self.db.cache_names().await?;
        debug!(?names, "caches before activation");
        self.db.delete_caches_except(CACHE_NAME).await
    }

    /// Only GET requests are intercepted, everything else goes straight to the network.
    pub async fn fetch(&self, req: &Request) -> Result<WorkerResponse> {
        if !req.method.eq_ignore_ascii_case("GET") {
            return Ok(fresh(self.network(req).await?));
        }

        match self.network(req).await {
            Ok(res) => {
                let ok = (200..300).contains(&res.status);
                if ok && self.same_origin(&req.url) {
                    if let Err(err) = self.db.put_response(CACHE_NAME, &res).await {
                        warn!("failed to store response for {}: {err}", req.url);
                    }
                }
                Ok(fresh(res))
            }
            Err(err) => {
                debug!("network failed for {}: {err}", req.url);
                match self.db.match_response(&req.url).await? {
                    Some(res) => Ok(res.into()),
                    None => bail!("Network error and no cached response for {}", req.url),
                }
            }
        }
    }
}

fn default_title() -> String {
    "Moodlog".to_string()
}

fn default_icon() -> String {
    "/icons/icon-192.png".to_string()
}

fn default_url() -> String {
    "/#/(tabs)/home".to_string()
}

fn default_tag() -> String {
    "moodlog".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PushMessage {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default = "default_icon")]
    pub badge: String,
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_tag")]
    pub tag: String,
}

impl PushMessage {
    /// Payloads that are not JSON are shown as the body of a default notification.
    pub fn parse(data: Option<&str>) -> Self {
        let data = data.unwrap_or("").trim();
        if data.is_empty() {
            return Self::with_body("");
        }

        match serde_json::from_str::<PushMessage>(data) {
            Ok(msg) => msg,
            Err(_) => Self::with_body(data),
        }
    }

    fn with_body(body: &str) -> Self {
        Self {
            title: default_title(),
            body: body.to_string(),
            icon: default_icon(),
            badge: default_icon(),
            url: default_url(),
            tag: default_tag(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn show(&self, msg: &PushMessage) -> Result<()>;
}

/// Shows notifications on the desktop.
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn show(&self, msg: &PushMessage) -> Result<()> {
        notify_rust::Notification::new()
            .appname("moodlog")
            .summary(&msg.title)
            .body(&msg.body)
            .icon(&msg.icon)
            .show()
            .map_err(|err| eyre::eyre!("Failed to show notification: {err}"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    Focus(usize),
    Open(String),
}

/// What a notification click does given the urls of the open windows: focus a window
/// already showing `url`, else any window, else open a new one.
pub fn resolve_click(windows: &[String], url: &str) -> ClickAction {
    if let Some(idx) = windows.iter().position(|w| w.contains(url)) {
        return ClickAction::Focus(idx);
    }
    if !windows.is_empty() {
        return ClickAction::Focus(0);
    }
    ClickAction::Open(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_payload_gets_defaults() {
        let msg = PushMessage::parse(Some(r#"{"title":"Hi","body":"Time to write"}"#));
        assert_eq!(msg.title, "Hi");
        assert_eq!(msg.body, "Time to write");
        assert_eq!(msg.url, "/#/(tabs)/home");

        let msg = PushMessage::parse(Some("plain text"));
        assert_eq!(msg.title, "Moodlog");
        assert_eq!(msg.body, "plain text");

        let msg = PushMessage::parse(None);
        assert_eq!(msg.body, "");
    }

    #[test]
    fn click_prefers_matching_window() {
        let windows = vec![
            "http://localhost/#/".to_string(),
            "http://localhost/#/(tabs)/advice".to_string(),
        ];
        assert_eq!(resolve_click(&windows, "/#/(tabs)/advice"), ClickAction::Focus(1));
        assert_eq!(resolve_click(&windows, "/#/(tabs)/new"), ClickAction::Focus(0));
        assert_eq!(
            resolve_click(&[], "/#/(tabs)/new"),
            ClickAction::Open("/#/(tabs)/new".to_string())
        );
    }
}
