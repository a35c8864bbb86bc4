//! Product catalog: categories, the spreadsheet it is fetched from, and the
//! local cache in front of it.

use crate::errors::CatalogError;
use crate::ledger::RawCategory;
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info, warn};

pub const CATALOG_CACHE_KEY: &str = "menu-items";
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
pub const SHEET_RANGE: &str = "!A1:B40";
pub const TOTAL_RANGE: &str = "total!A1";

/// Stable category identity. The display label and the spreadsheet tab it is
/// read from are looked up separately, so renaming one cannot break the
/// other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryId {
    Burgers,
    Snacks,
    Fries,
    Sauces,
    Drinks,
    Desserts,
    Ingredients,
}

impl CategoryId {
    pub const ALL: [CategoryId; 7] = [
        CategoryId::Burgers,
        CategoryId::Snacks,
        CategoryId::Fries,
        CategoryId::Sauces,
        CategoryId::Drinks,
        CategoryId::Desserts,
        CategoryId::Ingredients,
    ];

    pub fn sheet_name(self) -> &'static str {
        match self {
            CategoryId::Burgers => "Бургери",
            CategoryId::Snacks => "Снеки",
            CategoryId::Fries => "Картопля",
            CategoryId::Sauces => "Соуси",
            CategoryId::Drinks => "Напої",
            CategoryId::Desserts => "Десерти",
            CategoryId::Ingredients => "Інгредієнти",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CategoryId::Burgers => "Бургери",
            CategoryId::Snacks => "Снеки",
            CategoryId::Fries => "Картопля",
            CategoryId::Sauces => "Соуси",
            CategoryId::Drinks => "Напої",
            CategoryId::Desserts => "Десерти",
            CategoryId::Ingredients => "Інгредієнти",
        }
    }

    pub fn fallback_image(self) -> &'static str {
        match self {
            CategoryId::Burgers => "https://s7d1.scene7.com/is/image/mcdonalds/McD_burgers_roll_2023_160x160:category-panel-left-desktop",
            CategoryId::Snacks => "https://s7d1.scene7.com/is/image/mcdonalds/nav_chicken_160x160:category-panel-left-desktop",
            CategoryId::Fries => "https://s7d1.scene7.com/is/image/mcdonalds/menu_frenchfries_160x160:category-panel-left-desktop",
            CategoryId::Sauces => "https://s7d1.scene7.com/is/image/mcdonalds/nav_sauces_160x160:category-panel-left-desktop",
            CategoryId::Drinks => "https://s7d1.scene7.com/is/image/mcdonalds/McD_drinks_2023_160x160:category-panel-left-desktop",
            CategoryId::Desserts => "https://s7d1.scene7.com/is/image/mcdonalds/nav_desserts___shakes_160x160-1:category-panel-left-desktop",
            CategoryId::Ingredients => "/assets/bun.png",
        }
    }

    /// How items of this category are booked in the ledger.
    pub fn raw_category(self) -> RawCategory {
        match self {
            CategoryId::Drinks => RawCategory::Drink,
            CategoryId::Ingredients => RawCategory::Ingredient,
            _ => RawCategory::Food,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSection {
    pub category: CategoryId,
    pub items: Vec<CatalogItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub sections: Vec<CatalogSection>,
}

impl Catalog {
    pub fn item_count(&self) -> u64 {
        self.sections.iter().map(|s| s.items.len() as u64).sum()
    }

    pub fn section(&self, category: CategoryId) -> Option<&CatalogSection> {
        self.sections.iter().find(|s| s.category == category)
    }

    /// Image for a product, falling back to its category's picture.
    pub fn image_for(&self, product: &str) -> Option<&str> {
        self.sections.iter().find_map(|section| {
            section
                .items
                .iter()
                .find(|item| item.name == product)
                .map(|item| {
                    item.image_url
                        .as_deref()
                        .unwrap_or(section.category.fallback_image())
                })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub value: T,
    pub checksum: u64,
}

#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Number of items the source currently lists, used as a checksum.
    async fn fetch_total(&self) -> Result<u64, CatalogError>;

    async fn fetch_category(&self, category: CategoryId) -> Result<Vec<CatalogItem>, CatalogError>;
}

#[async_trait]
pub trait CatalogCache: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<CacheEntry<Value>>, CatalogError>;

    async fn store(&self, key: &str, entry: &CacheEntry<Value>) -> Result<(), CatalogError>;

    async fn clear(&self, key: &str) -> Result<(), CatalogError>;
}

pub trait InvalidationPolicy: Send + Sync {
    fn is_fresh(&self, catalog: &Catalog, checksum: u64) -> bool;
}

/// A cached catalog is good while its item count equals the checksum stored
/// beside it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemCountMatches;

impl InvalidationPolicy for ItemCountMatches {
    fn is_fresh(&self, catalog: &Catalog, checksum: u64) -> bool {
        catalog.item_count() == checksum
    }
}

/// One JSON file per cache key.
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl CatalogCache for FileCache {
    async fn load(&self, key: &str) -> Result<Option<CacheEntry<Value>>, CatalogError> {
        match fs::read(self.path_for(key)).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(entry) => Ok(Some(entry)),
                Err(err) => {
                    warn!(key, "discarding unreadable cache entry: {err}");
                    Ok(None)
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn store(&self, key: &str, entry: &CacheEntry<Value>) -> Result<(), CatalogError> {
        fs::create_dir_all(&self.dir).await?;
        let payload = serde_json::to_vec_pretty(entry)?;
        fs::write(self.path_for(key), payload).await?;
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<(), CatalogError> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    values: Option<Vec<Vec<String>>>,
}

/// Spreadsheet values API: one tab per category, `[name, imageUrl]` rows.
pub struct SheetsSource {
    client: Client,
    base: String,
    sheet_id: String,
    api_key: String,
}

impl SheetsSource {
    pub fn new(sheet_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_base(SHEETS_API_BASE, sheet_id, api_key)
    }

    pub fn with_base(
        base: impl Into<String>,
        sheet_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base: base.into(),
            sheet_id: sheet_id.into(),
            api_key: api_key.into(),
        }
    }

    fn range_url(&self, range: &str) -> Result<Url, CatalogError> {
        if self.sheet_id.is_empty() {
            return Err(CatalogError::Connectivity(
                "catalog sheet id is not configured".to_string(),
            ));
        }
        let mut url = Url::parse(&self.base)
            .map_err(|err| CatalogError::Connectivity(format!("invalid catalog url: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| CatalogError::Connectivity("catalog url cannot hold a path".to_string()))?
            .pop_if_empty()
            .extend([self.sheet_id.as_str(), "values", range]);
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    async fn fetch_range(&self, range: &str) -> Result<Vec<Vec<String>>, CatalogError> {
        let response = self
            .client
            .get(self.range_url(range)?)
            .send()
            .await
            .map_err(|err| CatalogError::Connectivity(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Connectivity(format!("{range}: catalog api answered {status}")));
        }
        let body: ValueRange = response.json().await.map_err(|err| CatalogError::DataShape {
            source_name: range.to_string(),
            reason: err.to_string(),
        })?;
        body.values.ok_or_else(|| CatalogError::DataShape {
            source_name: range.to_string(),
            reason: "response has no values".to_string(),
        })
    }
}

#[async_trait]
impl CatalogSource for SheetsSource {
    async fn fetch_total(&self) -> Result<u64, CatalogError> {
        let rows = self.fetch_range(TOTAL_RANGE).await?;
        let cell = rows
            .first()
            .and_then(|row| row.first())
            .ok_or_else(|| CatalogError::DataShape {
                source_name: TOTAL_RANGE.to_string(),
                reason: "total cell is empty".to_string(),
            })?;
        parse_total(cell)
    }

    async fn fetch_category(&self, category: CategoryId) -> Result<Vec<CatalogItem>, CatalogError> {
        let range = format!("{}{SHEET_RANGE}", category.sheet_name());
        Ok(parse_rows(self.fetch_range(&range).await?))
    }
}

/// Reads the item count from a cell such as `"Total: 123"`.
pub fn parse_total(cell: &str) -> Result<u64, CatalogError> {
    let digits: String = cell.chars().filter(char::is_ascii_digit).collect();
    digits.parse().map_err(|_| CatalogError::DataShape {
        source_name: TOTAL_RANGE.to_string(),
        reason: format!("no number in {cell:?}"),
    })
}

/// Turns sheet rows into items, skipping rows without a name.
pub fn parse_rows(rows: Vec<Vec<String>>) -> Vec<CatalogItem> {
    rows.into_iter()
        .filter_map(|row| {
            let mut cells = row.into_iter().map(|cell| cell.trim().to_string());
            let name = cells.next().filter(|name| !name.is_empty())?;
            let image_url = cells.next().filter(|url| !url.is_empty());
            Some(CatalogItem { name, image_url })
        })
        .collect()
}

pub struct CatalogService {
    source: Box<dyn CatalogSource>,
    cache: Box<dyn CatalogCache>,
    policy: Box<dyn InvalidationPolicy>,
}

impl CatalogService {
    pub fn new(
        source: Box<dyn CatalogSource>,
        cache: Box<dyn CatalogCache>,
        policy: Box<dyn InvalidationPolicy>,
    ) -> Self {
        Self {
            source,
            cache,
            policy,
        }
    }

    /// The cached catalog if it is still fresh. Never touches the source.
    pub async fn cached(&self) -> Option<Catalog> {
        let entry = match self.cache.load(CATALOG_CACHE_KEY).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(err) => {
                warn!("failed to read catalog cache: {err}");
                return None;
            }
        };
        match serde_json::from_value::<Catalog>(entry.value) {
            Ok(catalog) if self.policy.is_fresh(&catalog, entry.checksum) => Some(catalog),
            Ok(catalog) => {
                debug!(
                    cached = catalog.item_count(),
                    checksum = entry.checksum,
                    "catalog cache is stale"
                );
                None
            }
            Err(err) => {
                warn!("discarding malformed catalog cache: {err}");
                None
            }
        }
    }

    /// Cached catalog when fresh, otherwise a fetch of every category.
    /// Categories that fail are left out; only when all of them fail is the
    /// load an error, and nothing is cached then.
    pub async fn load(&self) -> Result<Catalog, CatalogError> {
        if let Some(catalog) = self.cached().await {
            return Ok(catalog);
        }

        let checksum = match self.source.fetch_total().await {
            Ok(total) => total,
            Err(err) => {
                warn!("failed to fetch catalog total: {err}");
                0
            }
        };

        let fetched = join_all(CategoryId::ALL.iter().map(|&category| async move {
            (category, self.source.fetch_category(category).await)
        }))
        .await;

        let mut sections = Vec::new();
        let mut last_error = None;
        for (category, result) in fetched {
            match result {
                Ok(items) => sections.push(CatalogSection { category, items }),
                Err(err) => {
                    warn!(category = category.sheet_name(), "dropping catalog category: {err}");
                    last_error = Some(err);
                }
            }
        }
        if sections.is_empty() {
            if let Some(err) = last_error {
                return Err(err);
            }
        }

        let catalog = Catalog { sections };
        let entry = CacheEntry {
            value: serde_json::to_value(&catalog)?,
            checksum,
        };
        if let Err(err) = self.cache.store(CATALOG_CACHE_KEY, &entry).await {
            warn!("failed to write catalog cache: {err}");
        }
        info!(items = catalog.item_count(), checksum, "catalog fetched");
        Ok(catalog)
    }

    /// Drops the cached catalog and fetches it again.
    pub async fn refresh(&self) -> Result<Catalog, CatalogError> {
        self.cache.clear(CATALOG_CACHE_KEY).await?;
        self.load().await
    }
}
