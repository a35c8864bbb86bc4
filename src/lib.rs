pub mod app;
pub mod bucket;
pub mod catalog;
pub mod config;
pub mod draft;
pub mod errors;
pub mod gate;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod recipes;
pub mod selection;
pub mod state;
pub mod store;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
