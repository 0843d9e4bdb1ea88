// src/application/state.rs

use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::integrations::SupabaseClient;
use crate::repositories::{
    LocalSnapshotRepository, RemoteCoffeeRepository, RemoteConfigRepository, SnapshotRepository,
    SqliteKeyValueStore,
};
use crate::services::{CoffeeService, PinService, StatisticsService, TransferService};

/// Application state shared by every command.
/// All fields are Arc-wrapped; services are built once from the configuration.
pub struct AppState {
    pub coffee_service: Arc<CoffeeService>,
    pub statistics_service: Arc<StatisticsService>,
    pub transfer_service: Arc<TransferService>,
    pub pin_service: Arc<PinService>,
}

impl AppState {
    /// Open the local store and, if configured, connect the remote backend
    pub fn initialize(config: &AppConfig) -> AppResult<Self> {
        // 1. LOCAL STORE
        let store = Arc::new(SqliteKeyValueStore::open(&config.database_path)?);
        store.verify_integrity()?;
        let local: Arc<dyn SnapshotRepository> =
            Arc::new(LocalSnapshotRepository::with_quota(store, config.quota_bytes));

        // 2. REMOTE BACKEND (optional)
        let supabase = match config.remote_settings() {
            Some(settings) => {
                log::info!("Remote backend configured at {}", settings.url);
                Some(Arc::new(SupabaseClient::new(&settings)?))
            }
            None => None,
        };
        let remote_coffees = supabase
            .clone()
            .map(|client| client as Arc<dyn RemoteCoffeeRepository>);
        let remote_config = supabase.map(|client| client as Arc<dyn RemoteConfigRepository>);

        Ok(Self::from_parts(local, remote_coffees, remote_config))
    }

    /// Wire services over already constructed repositories
    pub fn from_parts(
        local: Arc<dyn SnapshotRepository>,
        remote_coffees: Option<Arc<dyn RemoteCoffeeRepository>>,
        remote_config: Option<Arc<dyn RemoteConfigRepository>>,
    ) -> Self {
        let coffee_service = Arc::new(CoffeeService::new(local, remote_coffees));
        let statistics_service = Arc::new(StatisticsService::new(coffee_service.clone()));
        let transfer_service = Arc::new(TransferService::new(coffee_service.clone()));
        let pin_service = Arc::new(PinService::new(remote_config));

        Self {
            coffee_service,
            statistics_service,
            transfer_service,
            pin_service,
        }
    }

    /// Local-only state over an in-memory store
    #[cfg(test)]
    pub fn in_memory() -> Self {
        let store = SqliteKeyValueStore::in_memory().expect("in-memory store");
        let local = Arc::new(LocalSnapshotRepository::new(Arc::new(store)));
        Self::from_parts(local, None, None)
    }
}
