//! The waste/drink ledger: tagged entry keys, merge-increment writes, and
//! moving pending amounts into their wasted twin.
//!
//! Every write is a read-modify-write against the store with no version
//! check. Two operators writing the same bucket at the same moment can lose
//! one update; the store offers nothing better and none is attempted here.

use crate::bucket::{BucketKey, Feed};
use crate::draft::DraftItem;
use crate::errors::StoreError;
use crate::store::{bucket_path, item_path, KeyValueStore};
use chrono::NaiveDateTime;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

pub const WASTED_SUFFIX: &str = "--wasted";
pub const INGREDIENT_PREFIX: &str = "RW-";

/// Characters the hosted database refuses in keys, plus the path separator.
const RESERVED_CHARACTERS: [char; 6] = ['/', '.', '#', '$', '[', ']'];

/// First character of `name` that cannot appear in a single ledger key.
pub fn reserved_character(name: &str) -> Option<char> {
    name.chars()
        .find(|ch| RESERVED_CHARACTERS.contains(ch) || ch.is_control())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Pending,
    Wasted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawCategory {
    Food,
    Drink,
    Ingredient,
}

/// A ledger key with its naming conventions decoded.
///
/// The store only knows flat strings (`RW-Bun--wasted`); everything past the
/// read boundary works with this record instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LedgerKey {
    pub name: String,
    pub kind: EntryKind,
    pub category: RawCategory,
}

impl LedgerKey {
    pub fn pending(name: impl Into<String>, category: RawCategory) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Pending,
            category,
        }
    }

    /// Decodes a raw key read from a bucket of the given feed.
    pub fn parse(raw: &str, feed: Feed) -> Self {
        let (rest, kind) = match raw.strip_suffix(WASTED_SUFFIX) {
            Some(rest) => (rest, EntryKind::Wasted),
            None => (raw, EntryKind::Pending),
        };
        let (name, category) = match (feed, rest.strip_prefix(INGREDIENT_PREFIX)) {
            (Feed::Drinks, _) => (rest, RawCategory::Drink),
            (Feed::Shift(_), Some(name)) => (name, RawCategory::Ingredient),
            (Feed::Shift(_), None) => (rest, RawCategory::Food),
        };
        Self {
            name: name.to_string(),
            kind,
            category,
        }
    }

    pub fn raw(&self) -> String {
        let prefix = match self.category {
            RawCategory::Ingredient => INGREDIENT_PREFIX,
            RawCategory::Food | RawCategory::Drink => "",
        };
        let suffix = match self.kind {
            EntryKind::Wasted => WASTED_SUFFIX,
            EntryKind::Pending => "",
        };
        format!("{prefix}{}{suffix}", self.name)
    }

    pub fn as_wasted(&self) -> Self {
        Self {
            kind: EntryKind::Wasted,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub key: LedgerKey,
    pub raw_key: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSnapshot {
    pub bucket: BucketKey,
    pub entries: Vec<LedgerEntry>,
}

impl BucketSnapshot {
    pub fn from_amounts(bucket: BucketKey, amounts: &BTreeMap<String, f64>) -> Self {
        let entries = amounts
            .iter()
            .map(|(raw, amount)| LedgerEntry {
                key: LedgerKey::parse(raw, bucket.feed()),
                raw_key: raw.clone(),
                amount: *amount,
            })
            .collect();
        Self { bucket, entries }
    }

    pub fn pending(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter().filter(|e| e.key.kind == EntryKind::Pending)
    }

    pub fn wasted(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter().filter(|e| e.key.kind == EntryKind::Wasted)
    }

    pub fn pending_keys(&self) -> BTreeSet<String> {
        self.pending().map(|e| e.raw_key.clone()).collect()
    }

    /// Amount per item name, pending and wasted added together.
    pub fn totals_by_name(&self) -> BTreeMap<String, f64> {
        let mut totals = BTreeMap::new();
        for entry in &self.entries {
            *totals.entry(entry.key.name.clone()).or_insert(0.0) += entry.amount;
        }
        totals
    }
}

/// Encodes an amount, keeping whole numbers as integers the way the hosted
/// database stores them.
fn number(path: &str, amount: f64) -> Result<Value, StoreError> {
    if amount.fract() == 0.0 && amount.abs() < i64::MAX as f64 {
        return Ok(Value::from(amount as i64));
    }
    Number::from_f64(amount)
        .map(Value::Number)
        .ok_or_else(|| StoreError::data_shape(path, format!("{amount} is not a storable number")))
}

async fn read_object<S: KeyValueStore + ?Sized>(
    store: &S,
    path: &str,
) -> Result<Map<String, Value>, StoreError> {
    match store.get(path).await? {
        None => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(StoreError::data_shape(
            path,
            format!("expected an object of amounts, found {other}"),
        )),
    }
}

async fn amount_at<S: KeyValueStore + ?Sized>(
    store: &S,
    path: &str,
) -> Result<Option<f64>, StoreError> {
    match store.get(path).await? {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| StoreError::data_shape(path, format!("expected a number, found {value}"))),
    }
}

fn amounts_of(path: &str, map: &Map<String, Value>) -> BTreeMap<String, f64> {
    map.iter()
        .filter_map(|(key, value)| match value.as_f64() {
            Some(amount) => Some((key.clone(), amount)),
            None => {
                warn!(path, key = %key, "skipping non-numeric ledger value");
                None
            }
        })
        .collect()
}

/// Raw amounts stored under a bucket; an absent bucket is empty.
pub async fn read_bucket<S: KeyValueStore + ?Sized>(
    store: &S,
    bucket: &BucketKey,
) -> Result<BTreeMap<String, f64>, StoreError> {
    let path = bucket_path(bucket);
    let map = read_object(store, &path).await?;
    Ok(amounts_of(&path, &map))
}

pub async fn load_snapshot<S: KeyValueStore + ?Sized>(
    store: &S,
    bucket: BucketKey,
) -> Result<BucketSnapshot, StoreError> {
    let amounts = read_bucket(store, &bucket).await?;
    Ok(BucketSnapshot::from_amounts(bucket, &amounts))
}

/// Loads several buckets concurrently. Any failure fails the whole load.
pub async fn load_snapshots<S: KeyValueStore + ?Sized>(
    store: &S,
    buckets: &[BucketKey],
) -> Result<Vec<BucketSnapshot>, StoreError> {
    join_all(buckets.iter().map(|bucket| load_snapshot(store, *bucket)))
        .await
        .into_iter()
        .collect()
}

/// Adds `increments` onto whatever the bucket already holds and writes the
/// merged mapping back in one replace. Replaying the same increments counts
/// them twice.
pub async fn write_increments<S: KeyValueStore + ?Sized>(
    store: &S,
    bucket: &BucketKey,
    increments: &BTreeMap<String, f64>,
) -> Result<BTreeMap<String, f64>, StoreError> {
    let path = bucket_path(bucket);
    let mut merged = read_object(store, &path).await?;

    for (item, amount) in increments {
        let current = match merged.get(item) {
            None => 0.0,
            Some(value) => value.as_f64().unwrap_or_else(|| {
                warn!(path = %path, key = %item, "overwriting non-numeric ledger value");
                0.0
            }),
        };
        merged.insert(item.clone(), number(&path, current + amount)?);
    }

    let amounts = amounts_of(&path, &merged);
    store.set(&path, Value::Object(merged)).await?;
    Ok(amounts)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CloseOutcome {
    Moved { total_wasted: f64 },
    NothingPending,
}

/// Moves the pending amount of `raw_key` into its wasted twin, adding to
/// whatever was wasted before. No pending amount means nothing to do.
pub async fn close_item<S: KeyValueStore + ?Sized>(
    store: &S,
    bucket: &BucketKey,
    raw_key: &str,
) -> Result<CloseOutcome, StoreError> {
    if raw_key.ends_with(WASTED_SUFFIX) {
        return Ok(CloseOutcome::NothingPending);
    }
    if let Some(ch) = reserved_character(raw_key) {
        return Err(StoreError::data_shape(
            &bucket_path(bucket),
            format!("key {raw_key:?} contains {ch:?} and cannot be addressed"),
        ));
    }

    let pending_path = item_path(bucket, raw_key);
    let wasted_path = item_path(bucket, &format!("{raw_key}{WASTED_SUFFIX}"));

    let wasted = amount_at(store, &wasted_path).await?.unwrap_or(0.0);
    let Some(pending) = amount_at(store, &pending_path).await? else {
        return Ok(CloseOutcome::NothingPending);
    };

    let total_wasted = pending + wasted;
    let encoded = number(&wasted_path, total_wasted)?;
    store.remove(&pending_path).await?;
    store.set(&wasted_path, encoded).await?;

    Ok(CloseOutcome::Moved { total_wasted })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosedItem {
    pub item: String,
    pub total_wasted: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedItem {
    pub item: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloseReport {
    pub bucket: BucketKey,
    pub closed: Vec<ClosedItem>,
    pub skipped: Vec<String>,
    pub failed: Vec<FailedItem>,
}

impl CloseReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Closes every key independently and concurrently; one failure does not
/// stop the rest.
pub async fn close_batch<S: KeyValueStore + ?Sized>(
    store: &S,
    bucket: &BucketKey,
    raw_keys: &[String],
) -> CloseReport {
    let outcomes = join_all(raw_keys.iter().map(|key| async move {
        (key.clone(), close_item(store, bucket, key).await)
    }))
    .await;

    let mut report = CloseReport {
        bucket: *bucket,
        closed: Vec::new(),
        skipped: Vec::new(),
        failed: Vec::new(),
    };
    for (item, outcome) in outcomes {
        match outcome {
            Ok(CloseOutcome::Moved { total_wasted }) => {
                report.closed.push(ClosedItem { item, total_wasted })
            }
            Ok(CloseOutcome::NothingPending) => report.skipped.push(item),
            Err(err) => {
                warn!(bucket = %bucket, item = %item, "failed to close item: {err}");
                report.failed.push(FailedItem {
                    item,
                    reason: err.to_string(),
                });
            }
        }
    }
    info!(
        bucket = %bucket,
        closed = report.closed.len(),
        failed = report.failed.len(),
        "closed selected items"
    );
    report
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedItem {
    pub item: DraftItem,
    pub bucket: BucketKey,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedSave {
    pub item: DraftItem,
    pub bucket: BucketKey,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct SaveReport {
    pub saved: Vec<SavedItem>,
    pub failed: Vec<FailedSave>,
}

/// Which bucket a draft item is booked into at `now`: drinks go to the day's
/// drinks bucket, everything else to the current shift.
pub fn bucket_for(item: &DraftItem, now: NaiveDateTime) -> BucketKey {
    match item.category {
        RawCategory::Drink => BucketKey::drinks(now.date()),
        RawCategory::Food | RawCategory::Ingredient => BucketKey::shift_at(now),
    }
}

/// Books draft items into their buckets. Each bucket gets one merged write;
/// the writes run concurrently and every item is reported as saved or failed.
pub async fn save_draft<S: KeyValueStore + ?Sized>(
    store: &S,
    now: NaiveDateTime,
    items: &[DraftItem],
) -> SaveReport {
    let mut groups: BTreeMap<BucketKey, Vec<DraftItem>> = BTreeMap::new();
    for item in items {
        groups.entry(bucket_for(item, now)).or_default().push(item.clone());
    }

    let results = join_all(groups.into_iter().map(|(bucket, items)| async move {
        let mut increments = BTreeMap::new();
        for item in &items {
            *increments.entry(item.ledger_key().raw()).or_insert(0.0) += item.amount;
        }
        let result = write_increments(store, &bucket, &increments).await;
        (bucket, items, result)
    }))
    .await;

    let mut report = SaveReport::default();
    for (bucket, items, result) in results {
        match result {
            Ok(_) => {
                info!(bucket = %bucket, items = items.len(), "saved waste items");
                report
                    .saved
                    .extend(items.into_iter().map(|item| SavedItem { item, bucket }));
            }
            Err(err) => {
                warn!(bucket = %bucket, "failed to save waste items: {err}");
                let reason = err.to_string();
                report.failed.extend(items.into_iter().map(|item| FailedSave {
                    item,
                    bucket,
                    reason: reason.clone(),
                }));
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::Shift;
    use crate::store::LocalStore;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::json;

    fn bucket() -> BucketKey {
        "07-03 1SH".parse().unwrap()
    }

    fn increments(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    async fn seeded(value: Value) -> LocalStore {
        let store = LocalStore::in_memory();
        store.set(&bucket_path(&bucket()), value).await.unwrap();
        store
    }

    /// Store whose every call fails, as when the network is down.
    struct Offline;

    #[async_trait]
    impl KeyValueStore for Offline {
        async fn get(&self, _path: &str) -> Result<Option<Value>, StoreError> {
            Err(StoreError::Connectivity("offline".into()))
        }
        async fn set(&self, _path: &str, _value: Value) -> Result<(), StoreError> {
            Err(StoreError::Connectivity("offline".into()))
        }
        async fn remove(&self, _path: &str) -> Result<(), StoreError> {
            Err(StoreError::Connectivity("offline".into()))
        }
    }

    /// Fails only for paths containing the given fragment.
    struct FailingFor {
        inner: LocalStore,
        fragment: &'static str,
    }

    #[async_trait]
    impl KeyValueStore for FailingFor {
        async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
            if path.contains(self.fragment) {
                return Err(StoreError::Connectivity("offline".into()));
            }
            self.inner.get(path).await
        }
        async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
            self.inner.set(path, value).await
        }
        async fn remove(&self, path: &str) -> Result<(), StoreError> {
            self.inner.remove(path).await
        }
    }

    #[test]
    fn ledger_keys_decode_naming_conventions() {
        let shift = Feed::Shift(Shift::First);
        assert_eq!(
            LedgerKey::parse("Burger", shift),
            LedgerKey::pending("Burger", RawCategory::Food)
        );
        assert_eq!(
            LedgerKey::parse("RW-Bun--wasted", shift),
            LedgerKey::pending("Bun", RawCategory::Ingredient).as_wasted()
        );
        assert_eq!(
            LedgerKey::parse("Latte", Feed::Drinks).category,
            RawCategory::Drink
        );
        for raw in ["Burger", "Burger--wasted", "RW-Bun", "RW-Bun--wasted"] {
            assert_eq!(LedgerKey::parse(raw, shift).raw(), raw);
        }
    }

    #[tokio::test]
    async fn write_merges_additively() {
        let store = LocalStore::in_memory();
        write_increments(&store, &bucket(), &increments(&[("A", 3.0)])).await.unwrap();
        let merged = write_increments(&store, &bucket(), &increments(&[("A", 2.0), ("B", 1.0)]))
            .await
            .unwrap();

        assert_eq!(merged, increments(&[("A", 5.0), ("B", 1.0)]));
        assert_eq!(
            store.get(&bucket_path(&bucket())).await.unwrap(),
            Some(json!({"A": 5, "B": 1}))
        );
    }

    #[tokio::test]
    async fn write_keeps_wasted_keys_separate() {
        let store = seeded(json!({"Burger--wasted": 10})).await;
        write_increments(&store, &bucket(), &increments(&[("Burger", 2.0)])).await.unwrap();
        assert_eq!(
            read_bucket(&store, &bucket()).await.unwrap(),
            increments(&[("Burger", 2.0), ("Burger--wasted", 10.0)])
        );
    }

    #[tokio::test]
    async fn write_stores_fractional_amounts() {
        let store = LocalStore::in_memory();
        write_increments(&store, &bucket(), &increments(&[("RW-Bun", 0.5)])).await.unwrap();
        write_increments(&store, &bucket(), &increments(&[("RW-Bun", 0.25)])).await.unwrap();
        assert_eq!(read_bucket(&store, &bucket()).await.unwrap()["RW-Bun"], 0.75);
    }

    #[tokio::test]
    async fn write_surfaces_connectivity_without_writing() {
        let err = write_increments(&Offline, &bucket(), &increments(&[("A", 1.0)]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Connectivity(_)));
    }

    #[tokio::test]
    async fn read_rejects_non_object_bucket() {
        let store = seeded(json!(42)).await;
        assert!(matches!(
            read_bucket(&store, &bucket()).await,
            Err(StoreError::DataShape { .. })
        ));
    }

    #[tokio::test]
    async fn close_moves_pending_into_wasted() {
        let store = seeded(json!({"Burger": 4})).await;
        let outcome = close_item(&store, &bucket(), "Burger").await.unwrap();

        assert_eq!(outcome, CloseOutcome::Moved { total_wasted: 4.0 });
        assert_eq!(
            store.get(&bucket_path(&bucket())).await.unwrap(),
            Some(json!({"Burger--wasted": 4}))
        );
    }

    #[tokio::test]
    async fn close_adds_to_existing_wasted_amount() {
        let store = seeded(json!({"Burger": 4, "Burger--wasted": 10})).await;
        close_item(&store, &bucket(), "Burger").await.unwrap();
        assert_eq!(
            store.get(&bucket_path(&bucket())).await.unwrap(),
            Some(json!({"Burger--wasted": 14}))
        );
    }

    #[tokio::test]
    async fn close_without_pending_is_a_no_op() {
        let store = seeded(json!({"Burger--wasted": 10})).await;
        let outcome = close_item(&store, &bucket(), "Missing").await.unwrap();

        assert_eq!(outcome, CloseOutcome::NothingPending);
        assert_eq!(
            store.get(&bucket_path(&bucket())).await.unwrap(),
            Some(json!({"Burger--wasted": 10}))
        );
    }

    #[tokio::test]
    async fn batch_close_reports_each_item() {
        let store = FailingFor {
            inner: seeded(json!({"Burger": 4, "Fries": 2, "RW-Bun": 1.5})).await,
            fragment: "Fries",
        };
        let keys = ["Burger", "Fries", "RW-Bun", "Missing"].map(String::from);
        let report = close_batch(&store, &bucket(), &keys).await;

        assert_eq!(
            report.closed,
            vec![
                ClosedItem { item: "Burger".into(), total_wasted: 4.0 },
                ClosedItem { item: "RW-Bun".into(), total_wasted: 1.5 },
            ]
        );
        assert_eq!(report.skipped, vec!["Missing".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].item, "Fries");
        assert!(!report.is_complete());

        assert_eq!(
            read_bucket(&store.inner, &bucket()).await.unwrap(),
            increments(&[("Burger--wasted", 4.0), ("Fries", 2.0), ("RW-Bun--wasted", 1.5)])
        );
    }

    #[tokio::test]
    async fn unaddressable_key_fails_instead_of_skipping() {
        let store = seeded(json!({"Соус 1/2": 4, "Burger": 1})).await;
        let keys = ["Соус 1/2", "Burger"].map(String::from);
        let report = close_batch(&store, &bucket(), &keys).await;

        assert!(report.skipped.is_empty());
        assert_eq!(report.closed.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].item, "Соус 1/2");
        assert_eq!(
            read_bucket(&store, &bucket()).await.unwrap(),
            increments(&[("Burger--wasted", 1.0), ("Соус 1/2", 4.0)])
        );
    }

    #[test]
    fn reserved_characters_are_found() {
        assert_eq!(reserved_character("Соус 1/2"), Some('/'));
        assert_eq!(reserved_character("Cola 0.5"), Some('.'));
        assert_eq!(reserved_character("Tab\there"), Some('\t'));
        assert_eq!(reserved_character("RW-Bun--wasted"), None);
    }

    #[tokio::test]
    async fn write_overwrites_non_numeric_values() {
        let store = seeded(json!({"Burger": "lots", "Fries": 1})).await;
        let merged = write_increments(&store, &bucket(), &increments(&[("Burger", 2.0)]))
            .await
            .unwrap();
        assert_eq!(merged, increments(&[("Burger", 2.0), ("Fries", 1.0)]));
    }

    #[tokio::test]
    async fn failed_file_write_is_not_booked() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path().to_path_buf()).await;
        let burgers = increments(&[("Burger", 2.0)]);

        assert!(write_increments(&store, &bucket(), &burgers).await.is_err());
        assert!(write_increments(&store, &bucket(), &burgers).await.is_err());
        assert!(read_bucket(&store, &bucket()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_draft_splits_food_and_drinks() {
        let store = LocalStore::in_memory();
        let now = NaiveDate::from_ymd_opt(2026, 3, 7)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap();
        let items = vec![
            DraftItem::new("Burger", 2.0, RawCategory::Food),
            DraftItem::new("Bun", 0.5, RawCategory::Ingredient),
            DraftItem::new("Latte", 1.0, RawCategory::Drink),
        ];

        let report = save_draft(&store, now, &items).await;
        assert_eq!(report.saved.len(), 3);
        assert!(report.failed.is_empty());

        let shift: BucketKey = "07-03 2SH".parse().unwrap();
        let drinks: BucketKey = "07-03 НАПОЇ".parse().unwrap();
        assert_eq!(
            read_bucket(&store, &shift).await.unwrap(),
            increments(&[("Burger", 2.0), ("RW-Bun", 0.5)])
        );
        assert_eq!(read_bucket(&store, &drinks).await.unwrap(), increments(&[("Latte", 1.0)]));
    }

    #[tokio::test]
    async fn save_draft_lists_failed_items_individually() {
        let store = FailingFor {
            inner: LocalStore::in_memory(),
            fragment: "НАПОЇ",
        };
        let now = NaiveDate::from_ymd_opt(2026, 3, 7)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let items = vec![
            DraftItem::new("Burger", 1.0, RawCategory::Food),
            DraftItem::new("Latte", 2.0, RawCategory::Drink),
            DraftItem::new("Cola", 1.0, RawCategory::Drink),
        ];

        let report = save_draft(&store, now, &items).await;
        assert_eq!(report.saved.len(), 1);
        assert_eq!(report.saved[0].item.product, "Burger");
        let failed: Vec<&str> = report.failed.iter().map(|f| f.item.product.as_str()).collect();
        assert_eq!(failed, ["Latte", "Cola"]);
    }

    #[test]
    fn snapshot_separates_pending_and_wasted() {
        let snapshot = BucketSnapshot::from_amounts(
            bucket(),
            &increments(&[("Burger", 4.0), ("Burger--wasted", 1.0), ("RW-Bun", 2.0)]),
        );
        assert_eq!(
            snapshot.pending_keys(),
            ["Burger", "RW-Bun"].map(String::from).into_iter().collect::<BTreeSet<_>>()
        );
        assert_eq!(snapshot.wasted().count(), 1);
        assert_eq!(snapshot.totals_by_name()["Burger"], 5.0);
    }
}
