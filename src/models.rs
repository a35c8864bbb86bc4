use crate::bucket::BucketKey;
use crate::catalog::CategoryId;
use crate::draft::DraftItem;
use crate::ledger::{CloseReport, LedgerEntry, SaveReport};
use crate::recipes::IngredientLine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub struct CurrentBucketsResponse {
    pub shift: BucketKey,
    pub drinks: BucketKey,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product: String,
    pub category: CategoryId,
    pub amount: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct DraftResponse {
    pub items: Vec<DraftItem>,
    /// Picture per product, when a cached catalog knows it.
    pub images: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    #[serde(flatten)]
    pub report: SaveReport,
    pub remaining: Vec<DraftItem>,
}

#[derive(Debug, Serialize)]
pub struct ClosingBucketView {
    pub bucket: BucketKey,
    pub pending: Vec<LedgerEntry>,
    pub wasted: Vec<LedgerEntry>,
    pub selected: Vec<String>,
    pub all_selected: bool,
}

#[derive(Debug, Serialize)]
pub struct ClosingResponse {
    pub buckets: Vec<ClosingBucketView>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub item: String,
}

#[derive(Debug, Serialize)]
pub struct CloseResponse {
    pub report: CloseReport,
    pub bucket: ClosingBucketView,
}

#[derive(Debug, Serialize)]
pub struct DrinksDayView {
    pub bucket: BucketKey,
    pub sales: BTreeMap<String, f64>,
    pub ingredients: Vec<IngredientLine>,
}

#[derive(Debug, Serialize)]
pub struct DrinksResponse {
    pub days: Vec<DrinksDayView>,
}

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct WeekResponse {
    pub start_date: String,
    pub end_date: String,
    pub days: Vec<DrinksDayView>,
    pub ingredients: Vec<IngredientLine>,
}
