use std::{env, path::PathBuf};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Ledger file used when no remote store is configured.
    pub data_path: PathBuf,
    pub store_url: Option<String>,
    pub store_auth: Option<String>,
    pub sheet_id: String,
    pub sheets_api_key: String,
    pub cache_dir: PathBuf,
    pub manager_passphrase: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: var("PORT")
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(8080),
            data_path: var("APP_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/ledger.json")),
            store_url: var("REALTIME_DB_URL"),
            store_auth: var("REALTIME_DB_AUTH"),
            sheet_id: var("CATALOG_SHEET_ID").unwrap_or_default(),
            sheets_api_key: var("CATALOG_API_KEY").unwrap_or_default(),
            cache_dir: var("CATALOG_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/cache")),
            manager_passphrase: var("MANAGER_PASSPHRASE").unwrap_or_else(|| "4444".to_string()),
        }
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
