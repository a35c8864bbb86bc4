use crate::bucket::{recent_drink_keys, recent_shift_keys, week_drink_keys, week_range, BucketKey};
use crate::catalog::Catalog;
use crate::draft::DraftItem;
use crate::errors::AppError;
use crate::ledger::{self, close_batch, load_snapshot, load_snapshots, BucketSnapshot};
use crate::models::{
    AddItemRequest, ClosingBucketView, ClosingResponse, CloseResponse, CurrentBucketsResponse,
    DraftResponse, DrinksDayView, DrinksResponse, SaveResponse, ToggleRequest, WeekQuery,
    WeekResponse,
};
use crate::recipes::RecipeBook;
use crate::selection::Selection;
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Html,
    Json,
};
use chrono::{Local, NaiveDateTime};
use std::collections::BTreeMap;

/// Days of shift buckets offered for closing, today included.
const CLOSING_DAYS: u32 = 3;
const DRINK_DAYS: u32 = 3;
const MAX_WEEK_OFFSET: i64 = 520;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let now = local_now();
    let draft = state.draft.lock().await;
    Html(render_index(
        &BucketKey::shift_at(now),
        &BucketKey::drinks(now.date()),
        &draft,
    ))
}

pub async fn current_buckets() -> Json<CurrentBucketsResponse> {
    let now = local_now();
    Json(CurrentBucketsResponse {
        shift: BucketKey::shift_at(now),
        drinks: BucketKey::drinks(now.date()),
    })
}

pub async fn get_draft(State(state): State<AppState>) -> Json<DraftResponse> {
    let items = state.draft.lock().await.items().to_vec();
    Json(draft_response(&state, items).await)
}

pub async fn add_draft_item(
    State(state): State<AppState>,
    Json(payload): Json<AddItemRequest>,
) -> Result<Json<DraftResponse>, AppError> {
    let items = {
        let mut draft = state.draft.lock().await;
        draft.add_item(
            &payload.product,
            payload.category.raw_category(),
            payload.amount,
        )?;
        draft.items().to_vec()
    };
    Ok(Json(draft_response(&state, items).await))
}

pub async fn clear_draft(State(state): State<AppState>) -> Json<DraftResponse> {
    state.draft.lock().await.clear();
    Json(DraftResponse {
        items: Vec::new(),
        images: BTreeMap::new(),
    })
}

/// Saves the draft. Saved items leave the draft, failed ones stay for a
/// retry; the status tells the caller whether that happened to none, some
/// or all of them.
///
/// The draft stays locked for the whole save so a second save cannot book
/// the same items twice.
pub async fn save_draft(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SaveResponse>), AppError> {
    let mut draft = state.draft.lock().await;
    if draft.is_empty() {
        return Err(AppError::bad_request("nothing to save"));
    }

    let report = ledger::save_draft(state.store.as_ref(), local_now(), draft.items()).await;
    draft.remove_saved(&report.saved);
    let status = match (report.saved.is_empty(), report.failed.is_empty()) {
        (_, true) => StatusCode::OK,
        (true, false) => StatusCode::SERVICE_UNAVAILABLE,
        (false, false) => StatusCode::MULTI_STATUS,
    };
    Ok((
        status,
        Json(SaveResponse {
            report,
            remaining: draft.items().to_vec(),
        }),
    ))
}

pub async fn get_closing(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ClosingResponse>, AppError> {
    require_manager(&state, &headers)?;
    let keys = recent_shift_keys(local_now().date(), CLOSING_DAYS);
    let snapshots = load_snapshots(state.store.as_ref(), &keys).await?;

    let mut selection = state.selection.lock().await;
    let buckets = snapshots
        .iter()
        .map(|snapshot| {
            selection.retain_pending(&snapshot.bucket, &snapshot.pending_keys());
            closing_view(snapshot, &selection)
        })
        .collect();
    Ok(Json(ClosingResponse { buckets }))
}

pub async fn toggle_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(bucket): Path<String>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<ClosingBucketView>, AppError> {
    require_manager(&state, &headers)?;
    let bucket = parse_shift_bucket(&bucket)?;
    let snapshot = load_snapshot(state.store.as_ref(), bucket).await?;
    if !snapshot.pending_keys().contains(&payload.item) {
        return Err(AppError::bad_request(format!(
            "{} has nothing pending in {bucket}",
            payload.item
        )));
    }

    let mut selection = state.selection.lock().await;
    selection.toggle(&bucket, &payload.item);
    Ok(Json(closing_view(&snapshot, &selection)))
}

pub async fn select_all(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(bucket): Path<String>,
) -> Result<Json<ClosingBucketView>, AppError> {
    require_manager(&state, &headers)?;
    let bucket = parse_shift_bucket(&bucket)?;
    let snapshot = load_snapshot(state.store.as_ref(), bucket).await?;

    let mut selection = state.selection.lock().await;
    selection.select_all(&bucket, &snapshot.pending_keys());
    Ok(Json(closing_view(&snapshot, &selection)))
}

pub async fn close_selected(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(bucket): Path<String>,
) -> Result<Json<CloseResponse>, AppError> {
    require_manager(&state, &headers)?;
    let bucket = parse_shift_bucket(&bucket)?;
    let keys = state.selection.lock().await.selected(&bucket);
    if keys.is_empty() {
        return Err(AppError::bad_request(format!("nothing selected in {bucket}")));
    }

    let report = close_batch(state.store.as_ref(), &bucket, &keys).await;
    let snapshot = load_snapshot(state.store.as_ref(), bucket).await?;

    let mut selection = state.selection.lock().await;
    selection.retain_pending(&bucket, &snapshot.pending_keys());
    Ok(Json(CloseResponse {
        report,
        bucket: closing_view(&snapshot, &selection),
    }))
}

pub async fn get_drinks(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DrinksResponse>, AppError> {
    require_manager(&state, &headers)?;
    let keys = recent_drink_keys(local_now().date(), DRINK_DAYS);
    let snapshots = load_snapshots(state.store.as_ref(), &keys).await?;
    let days = snapshots
        .iter()
        .map(|snapshot| drinks_view(state.recipes, snapshot))
        .collect();
    Ok(Json(DrinksResponse { days }))
}

pub async fn get_drinks_week(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<WeekQuery>,
) -> Result<Json<WeekResponse>, AppError> {
    require_manager(&state, &headers)?;
    let offset = query.offset.unwrap_or(0);
    if offset.abs() > MAX_WEEK_OFFSET {
        return Err(AppError::bad_request(format!(
            "offset must be within {MAX_WEEK_OFFSET} weeks"
        )));
    }

    let today = local_now().date();
    let (start, end) = week_range(today, offset);
    let snapshots = load_snapshots(state.store.as_ref(), &week_drink_keys(today, offset)).await?;

    let days: Vec<DrinksDayView> = snapshots
        .iter()
        .map(|snapshot| drinks_view(state.recipes, snapshot))
        .collect();
    let mut week_sales = BTreeMap::new();
    for day in &days {
        for (product, quantity) in &day.sales {
            *week_sales.entry(product.clone()).or_insert(0.0) += quantity;
        }
    }

    Ok(Json(WeekResponse {
        start_date: start.to_string(),
        end_date: end.to_string(),
        ingredients: state.recipes.display(&state.recipes.aggregate(&week_sales)),
        days,
    }))
}

pub async fn get_catalog(State(state): State<AppState>) -> Result<Json<Catalog>, AppError> {
    Ok(Json(state.catalog.load().await?))
}

pub async fn refresh_catalog(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Catalog>, AppError> {
    require_manager(&state, &headers)?;
    Ok(Json(state.catalog.refresh().await?))
}

fn require_manager(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    if state.gate.admits_headers(headers) {
        Ok(())
    } else {
        Err(AppError::forbidden("manager passphrase required"))
    }
}

fn parse_shift_bucket(raw: &str) -> Result<BucketKey, AppError> {
    let bucket: BucketKey = raw
        .parse()
        .map_err(|err| AppError::bad_request(format!("{err}")))?;
    if bucket.is_drinks() {
        return Err(AppError::bad_request("drink sales are not closed"));
    }
    Ok(bucket)
}

async fn draft_response(state: &AppState, items: Vec<DraftItem>) -> DraftResponse {
    let images = match state.catalog.cached().await {
        Some(catalog) => item_images(&catalog, &items),
        None => BTreeMap::new(),
    };
    DraftResponse { items, images }
}

fn item_images(catalog: &Catalog, items: &[DraftItem]) -> BTreeMap<String, String> {
    items
        .iter()
        .filter_map(|item| {
            catalog
                .image_for(&item.product)
                .map(|url| (item.product.clone(), url.to_string()))
        })
        .collect()
}

fn closing_view(snapshot: &BucketSnapshot, selection: &Selection) -> ClosingBucketView {
    let pending_keys = snapshot.pending_keys();
    ClosingBucketView {
        bucket: snapshot.bucket,
        pending: snapshot.pending().cloned().collect(),
        wasted: snapshot.wasted().cloned().collect(),
        selected: selection.selected(&snapshot.bucket),
        all_selected: selection.all_selected(&snapshot.bucket, &pending_keys),
    }
}

fn drinks_view(recipes: &RecipeBook, snapshot: &BucketSnapshot) -> DrinksDayView {
    let sales = snapshot.totals_by_name();
    DrinksDayView {
        bucket: snapshot.bucket,
        ingredients: recipes.display(&recipes.aggregate(&sales)),
        sales,
    }
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}
