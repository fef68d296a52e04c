use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Json};
use moodlog_common::api::HealthCheckResponse;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod entry;
pub mod profile;
pub mod push;
pub mod storage;
pub mod user;

pub use crate::error::ServerError;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `Json` extractor whose rejections use the same error body as every other failure.
pub struct ApiJson<T>(pub T);

#[async_trait::async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(rejection.into()),
        }
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        ServerError::BadRequest(value.body_text())
    }
}

pub async fn index() -> Json<HealthCheckResponse> {
    let version = VERSION.to_string();

    Json(HealthCheckResponse {
        status: "Ok".to_string(),
        version,
    })
}

#[derive(Debug, Serialize)]
pub struct WebManifest {
    pub name: &'static str,
    pub short_name: &'static str,
    pub start_url: &'static str,
    pub scope: &'static str,
    pub display: &'static str,
    pub background_color: &'static str,
    pub theme_color: &'static str,
}

/// Install metadata for the app shell.
pub async fn manifest() -> impl IntoResponse {
    let manifest = WebManifest {
        name: "Moodlog",
        short_name: "Moodlog",
        start_url: "/#/(tabs)/home",
        scope: "/",
        display: "standalone",
        background_color: "#ffffff",
        theme_color: "#6c63ff",
    };

    ([(CONTENT_TYPE, "application/manifest+json")], Json(manifest))
}
