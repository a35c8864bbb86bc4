use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/buckets/current", get(handlers::current_buckets))
        .route("/api/draft", get(handlers::get_draft).delete(handlers::clear_draft))
        .route("/api/draft/items", post(handlers::add_draft_item))
        .route("/api/draft/save", post(handlers::save_draft))
        .route("/api/closing", get(handlers::get_closing))
        .route("/api/closing/:bucket/toggle", post(handlers::toggle_item))
        .route("/api/closing/:bucket/select-all", post(handlers::select_all))
        .route("/api/closing/:bucket/close", post(handlers::close_selected))
        .route("/api/drinks", get(handlers::get_drinks))
        .route("/api/drinks/week", get(handlers::get_drinks_week))
        .route("/api/catalog", get(handlers::get_catalog))
        .route("/api/catalog/refresh", post(handlers::refresh_catalog))
        .with_state(state)
}
