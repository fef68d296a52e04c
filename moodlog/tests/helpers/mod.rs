#![allow(dead_code)]

use axum::serve;
use eyre::{eyre, Result};
use fake::faker::internet::en::{FreeEmail, Password};
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use moodlog_client::account::{self, RegisterForm};
use moodlog_client::app::App;
use moodlog_client::context::AppContext;
use moodlog_client::settings::Settings as ClientSettings;
use moodlog_server::database::Database as ServerDatabase;
use moodlog_server::make_router;
use moodlog_server::settings::Settings as ServerSettings;
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const VAPID_KEY: &str =
    "BP0kz7vkwdiIQ_uygSK2SIcA_nEoDoXFuwKlnXrszPyHLYQRjfCHZVQdbIiGxUhDwaxlvY8yc1ss3miaUzMeDUc";

pub struct TestServer {
    pub settings: ServerSettings,
    pub database: ServerDatabase,
    _storage: TempDir,
}

impl TestServer {
    pub async fn build(host: &str, port: u16) -> Result<Self> {
        let storage = TempDir::new()?;
        let settings: ServerSettings = ServerSettings::build_default()?
            .set_override("db_path", "sqlite::memory:")?
            .set_override("storage_path", storage.path().to_str())?
            .set_override("port", port)?
            .set_override("host", host)?
            .build()?
            .try_deserialize()
            .map_err(|e| eyre!("Failed to deserialize {e}"))?;

        let database = ServerDatabase::new(&settings.db_path).await?;

        Ok(TestServer {
            settings,
            database,
            _storage: storage,
        })
    }

    pub fn address(&self) -> String {
        format!("http://{}:{}", self.settings.host, self.settings.port)
    }
}

pub async fn spawn_app() -> Result<TestServer> {
    let host = "127.0.0.1";
    let listener = TcpListener::bind(format!("{host}:0")).await?;
    let port = listener.local_addr()?.port();

    let server = TestServer::build(host, port).await?;

    let r = make_router(&server.settings, server.database.clone()).await?;
    let _ = tokio::spawn(async move { serve(listener, r.into_make_service()).await.unwrap() });
    Ok(server)
}

pub struct Credentials {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl Credentials {
    pub fn fake() -> Self {
        Self {
            email: FreeEmail().fake::<String>().to_lowercase(),
            password: Password(8..24).fake(),
            first_name: FirstName().fake(),
            last_name: LastName().fake(),
        }
    }

    pub fn form(&self) -> RegisterForm {
        RegisterForm {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

/// One machine running the client: its own config, cache database and session file.
pub struct TestClient {
    pub settings: ClientSettings,
    dir: TempDir,
}

impl TestClient {
    pub fn build(server_address: &str) -> Result<Self> {
        Self::build_with(server_address, |b| Ok(b))
    }

    pub fn build_with<F>(server_address: &str, extra: F) -> Result<Self>
    where
        F: FnOnce(
            config::ConfigBuilder<config::builder::DefaultState>,
        ) -> Result<config::ConfigBuilder<config::builder::DefaultState>>,
    {
        let dir = TempDir::new()?;
        let builder = ClientSettings::builder()?
            .set_override("db_path", dir.path().join("moodlog.db").to_str())?
            .set_override("session_path", dir.path().join("session").to_str())?
            .set_override("server_address", server_address)?
            .set_override("offline", false)?
            .set_override("vapid_public_key", VAPID_KEY)?;
        let settings = ClientSettings::from_builder(extra(builder)?)?;

        Ok(Self { settings, dir })
    }

    pub fn offline(&mut self, offline: bool) {
        self.settings.offline = offline;
    }

    /// A fresh client run at `path`, like starting the binary.
    pub async fn open(&self, path: &str) -> Result<App> {
        let (ctx, changes) = AppContext::new(self.settings.clone(), &format!("#{path}")).await?;
        let mut app = App::new(ctx, changes);
        app.start().await?;
        Ok(app)
    }

    pub async fn context(&self) -> Result<AppContext> {
        let (ctx, _) = AppContext::new(self.settings.clone(), "#/").await?;
        Ok(ctx)
    }
}

/// Registers `creds` and signs in, returning the settled app on the home view.
pub async fn signed_in(client: &TestClient, creds: &Credentials) -> Result<App> {
    let mut app = client.open("/rejestracja").await?;
    let ctx = app.context().clone();
    account::sign_up(&ctx, creds.form()).await?;
    app.pump().await?;

    account::sign_in(&ctx, &creds.email, &creds.password).await?;
    app.pump().await?;
    Ok(app)
}
