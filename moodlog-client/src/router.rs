//! Fragment based routing.
//!
//! The current location is a `#/path` fragment. Changing it queues a change notification
//! that the app pump hands to [`Router::handle`]. Routes are exact strings, there are no
//! prefixes and no parameters.

use eyre::Result;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::debug;

pub const NOT_FOUND: &str = "/404";

/// Normalize a raw fragment into a route path. `""` and `"#"` both mean `/`.
pub fn parse_fragment(raw: &str) -> String {
    let path = raw.strip_prefix('#').unwrap_or(raw);
    if path.is_empty() {
        return "/".to_string();
    }
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

#[derive(Clone)]
pub struct Location {
    hash: Arc<watch::Sender<String>>,
    changes: mpsc::UnboundedSender<String>,
}

/// Queue of fragments the location moved to, oldest first.
pub struct HashChanges(mpsc::UnboundedReceiver<String>);

impl HashChanges {
    pub fn try_next(&mut self) -> Option<String> {
        self.0.try_recv().ok()
    }
}

impl Location {
    pub fn new(initial: &str) -> (Self, HashChanges) {
        let (hash, _) = watch::channel(initial.to_string());
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                hash: Arc::new(hash),
                changes: tx,
            },
            HashChanges(rx),
        )
    }

    pub fn hash(&self) -> String {
        self.hash.borrow().clone()
    }

    pub fn path(&self) -> String {
        parse_fragment(&self.hash())
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.hash.subscribe()
    }

    /// Sets the fragment. A change is only queued when the fragment actually changed.
    pub fn set_hash(&self, hash: &str) {
        let hash = if hash.starts_with('#') {
            hash.to_string()
        } else {
            format!("#{hash}")
        };

        let changed = self.hash.send_if_modified(|current| {
            if *current == hash {
                false
            } else {
                *current = hash.clone();
                true
            }
        });

        if changed {
            // The receiver lives as long as the app, a closed queue only happens on shutdown.
            let _ = self.changes.send(hash);
        }
    }

    pub fn navigate(&self, path: &str) {
        if path.starts_with('/') {
            self.set_hash(&format!("#{path}"));
        } else {
            self.set_hash(&format!("#/{path}"));
        }
    }
}

type RenderFn<C> = Arc<dyn Fn(C) -> BoxFuture<'static, Result<()>> + Send + Sync>;

pub struct Router<C> {
    routes: HashMap<String, RenderFn<C>>,
}

impl<C> Default for Router<C> {
    fn default() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }
}

impl<C: Send + 'static> Router<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering the same path again replaces the earlier view.
    pub fn register_route<F, Fut>(&mut self, path: &str, render: F)
    where
        F: Fn(C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let render: RenderFn<C> = Arc::new(move |ctx| render(ctx).boxed());
        self.routes.insert(path.to_string(), render);
    }

    pub fn has_route(&self, path: &str) -> bool {
        self.routes.contains_key(path)
    }

    /// Renders the view for `path`, falling back to the not found view. Returns whether
    /// any view ran.
    pub async fn handle(&self, path: &str, ctx: C) -> Result<bool> {
        let view = self
            .routes
            .get(path)
            .or_else(|| self.routes.get(NOT_FOUND))
            .cloned();

        debug!(path, has_view = view.is_some(), "route");

        match view {
            Some(view) => {
                view(ctx).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
