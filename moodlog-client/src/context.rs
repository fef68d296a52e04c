use crate::api_client::RemoteBackend;
use crate::backend::Backend;
use crate::cache::Cache;
use crate::database::Database;
use crate::entries::DateFilter;
use crate::network::Connectivity;
use crate::router::{HashChanges, Location};
use crate::screen::Screen;
use crate::session::Session;
use crate::settings::Settings;
use crate::weather::{FixedPosition, Geolocation};
use eyre::Result;
use std::sync::Arc;
use tokio::sync::watch;

/// Everything a route or an operation can touch. Cheap to clone.
#[derive(Clone)]
pub struct AppContext {
    pub settings: Arc<Settings>,
    pub backend: Arc<dyn Backend>,
    pub cache: Cache,
    pub db: Database,
    pub network: Connectivity,
    pub session: Session,
    pub location: Location,
    pub screen: Screen,
    pub geolocation: Option<Arc<dyn Geolocation>>,
    pub history_filter: Arc<watch::Sender<DateFilter>>,
    pub http: reqwest::Client,
}

impl AppContext {
    pub async fn new(settings: Settings, hash: &str) -> Result<(Self, HashChanges)> {
        let db = Database::new(&settings.db_path).await?;
        let backend = Arc::new(RemoteBackend::new(
            &settings.server_address,
            &settings.session_path,
        ));

        Ok(Self::with_backend(settings, db, backend, hash))
    }

    pub fn with_backend(
        settings: Settings,
        db: Database,
        backend: Arc<dyn Backend>,
        hash: &str,
    ) -> (Self, HashChanges) {
        let (location, changes) = Location::new(hash);
        let geolocation = FixedPosition::from_settings(&settings.weather)
            .map(|x| Arc::new(x) as Arc<dyn Geolocation>);

        let ctx = Self {
            network: Connectivity::new(!settings.offline),
            settings: Arc::new(settings),
            backend,
            cache: Cache::new(db.clone()),
            db,
            session: Session::new(),
            location,
            screen: Screen::new(),
            geolocation,
            history_filter: Arc::new(watch::channel(DateFilter::default()).0),
            http: reqwest::Client::new(),
        };

        (ctx, changes)
    }
}
