use crate::catalog::{CatalogService, FileCache, ItemCountMatches, SheetsSource};
use crate::config::Config;
use crate::draft::WasteDraft;
use crate::errors::StoreError;
use crate::gate::ManagerGate;
use crate::recipes::RecipeBook;
use crate::selection::Selection;
use crate::store::{KeyValueStore, LocalStore, RealtimeDbStore};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KeyValueStore>,
    pub catalog: Arc<CatalogService>,
    pub gate: ManagerGate,
    pub recipes: &'static RecipeBook,
    pub draft: Arc<Mutex<WasteDraft>>,
    pub selection: Arc<Mutex<Selection>>,
}

impl AppState {
    pub fn new(store: Arc<dyn KeyValueStore>, catalog: CatalogService, gate: ManagerGate) -> Self {
        Self {
            store,
            catalog: Arc::new(catalog),
            gate,
            recipes: RecipeBook::standard(),
            draft: Arc::new(Mutex::new(WasteDraft::default())),
            selection: Arc::new(Mutex::new(Selection::default())),
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self, StoreError> {
        let store: Arc<dyn KeyValueStore> = match &config.store_url {
            Some(url) => {
                info!("using realtime database at {url}");
                Arc::new(RealtimeDbStore::new(url, config.store_auth.clone())?)
            }
            None => {
                info!("using local ledger file {}", config.data_path.display());
                Arc::new(LocalStore::open(config.data_path.clone()).await)
            }
        };

        let catalog = CatalogService::new(
            Box::new(SheetsSource::new(
                config.sheet_id.clone(),
                config.sheets_api_key.clone(),
            )),
            Box::new(FileCache::new(config.cache_dir.clone())),
            Box::new(ItemCountMatches),
        );

        Ok(Self::new(
            store,
            catalog,
            ManagerGate::new(config.manager_passphrase.clone()),
        ))
    }
}
