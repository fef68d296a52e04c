use crate::backend::AuthChange;
use crate::context::AppContext;
use crate::guard::{
    guard, is_public_only, ADVICE, HISTORY, HOME, INDEX, LOGIN, NEW_ENTRY, OFFLINE, REGISTER,
};
use crate::router::{parse_fragment, HashChanges, Router, NOT_FOUND};
use crate::session::SessionStatus;
use crate::views;
use eyre::Result;
use futures_util::future::BoxFuture;
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

/// Guarded route: the view only runs when the guard lets it through.
fn guarded<V>(router: &mut Router<AppContext>, path: &'static str, view: V)
where
    V: for<'a> Fn(&'a AppContext) -> BoxFuture<'a, Result<()>> + Copy + Send + Sync + 'static,
{
    router.register_route(path, move |ctx: AppContext| async move {
        if guard(ctx.session.status(), path, &ctx.location, &ctx.screen) {
            view(&ctx).await?;
        }
        Ok(())
    });
}

pub fn mount_routes(router: &mut Router<AppContext>) {
    use futures_util::FutureExt;

    guarded(router, INDEX, |ctx| views::index(ctx).boxed());
    guarded(router, LOGIN, |ctx| views::login(ctx).boxed());
    guarded(router, REGISTER, |ctx| views::register(ctx).boxed());
    guarded(router, OFFLINE, |ctx| views::offline(ctx).boxed());
    router.register_route(NOT_FOUND, |ctx: AppContext| async move {
        views::not_found(&ctx).await
    });

    guarded(router, HOME, |ctx| views::home(ctx).boxed());
    guarded(router, NEW_ENTRY, |ctx| views::new_entry(ctx).boxed());
    guarded(router, HISTORY, |ctx| views::history(ctx).boxed());
    guarded(router, ADVICE, |ctx| views::advice(ctx).boxed());
}

/// The client event loop. Auth notifications and fragment changes are handled one at a
/// time, each render running to completion before the next one starts.
pub struct App {
    ctx: AppContext,
    router: Router<AppContext>,
    changes: HashChanges,
    auth: broadcast::Receiver<AuthChange>,
}

impl App {
    pub fn new(ctx: AppContext, changes: HashChanges) -> Self {
        let mut router = Router::new();
        mount_routes(&mut router);
        let auth = ctx.backend.auth_changes();

        Self {
            ctx,
            router,
            changes,
            auth,
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn router_mut(&mut self) -> &mut Router<AppContext> {
        &mut self.router
    }

    /// Check the session, render the current location and settle all follow-up navigation.
    pub async fn start(&mut self) -> Result<()> {
        self.ctx.screen.render_loading();

        let logged_in = self.ctx.backend.session().is_some();
        self.ctx.session.set(SessionStatus::from_logged_in(logged_in));
        self.ctx.screen.set_header_for_auth(logged_in);

        self.handle_current().await;

        let path = self.ctx.location.path();
        if logged_in && is_public_only(&path) {
            self.ctx.location.navigate(HOME);
        }

        self.pump().await
    }

    fn on_auth_change(&self, change: AuthChange) {
        let logged_in = change.user.is_some();
        debug!(logged_in, "auth change");
        self.ctx.session.set(SessionStatus::from_logged_in(logged_in));
        if logged_in {
            self.ctx.location.navigate(HOME);
        } else {
            self.ctx.location.navigate(LOGIN);
        }
        self.ctx.screen.set_header_for_auth(logged_in);
    }

    fn drain_auth(&mut self) -> bool {
        let mut seen = false;
        loop {
            match self.auth.try_recv() {
                Ok(change) => {
                    seen = true;
                    self.on_auth_change(change);
                }
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    warn!("missed {n} auth changes");
                }
                Err(_) => return seen,
            }
        }
    }

    async fn handle_current(&self) {
        let path = self.ctx.location.path();
        self.handle_path(&path).await;
    }

    async fn handle_path(&self, path: &str) {
        if let Err(err) = self.router.handle(path, self.ctx.clone()).await {
            error!("view {path} failed: {err:?}");
            self.ctx.screen.render(format!("Error\n{err}\n"));
        }
    }

    /// Renders the current location again, after a write changed what it shows.
    pub async fn refresh(&mut self) -> Result<()> {
        self.handle_current().await;
        self.pump().await
    }

    /// Runs until there is no pending auth change and no pending navigation.
    pub async fn pump(&mut self) -> Result<()> {
        loop {
            let auth_seen = self.drain_auth();
            match self.changes.try_next() {
                Some(hash) => self.handle_path(&parse_fragment(&hash)).await,
                None if auth_seen => continue,
                None => return Ok(()),
            }
        }
    }
}
