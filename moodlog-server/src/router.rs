use crate::database::Database;
use crate::handlers;
use crate::storage::FileStorage;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub storage: FileStorage,
}

pub fn router(database: Database, storage: FileStorage) -> Router {
    let state = AppState { database, storage };

    Router::new()
        .route("/", get(handlers::index))
        .route("/manifest.webmanifest", get(handlers::manifest))
        .route("/auth/register", post(handlers::user::register))
        .route("/auth/login", post(handlers::user::login))
        .route("/auth/logout", post(handlers::user::logout))
        .route("/auth/session", get(handlers::user::session))
        .route(
            "/entries",
            get(handlers::entry::list).post(handlers::entry::add),
        )
        .route(
            "/entries/:id",
            put(handlers::entry::update).delete(handlers::entry::delete),
        )
        .route("/entries/:id/photo", get(handlers::entry::photo))
        .route("/profile", get(handlers::profile::get))
        .route("/profile/avatar", put(handlers::profile::set_avatar))
        .route(
            "/storage/:bucket",
            axum::routing::delete(handlers::storage::remove),
        )
        .route(
            "/storage/:bucket/*path",
            put(handlers::storage::upload).get(handlers::storage::download),
        )
        .route("/push/subscriptions", post(handlers::push::subscribe))
        .route(
            "/push/subscriptions/deactivate",
            post(handlers::push::deactivate),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
