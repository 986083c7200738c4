use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::storage::Storage;

use super::analytics::{get_all_clicks, get_analytics, get_basic_analytics};
use super::handlers::{health_check, my_urls, shorten_url, AppState};

pub fn create_api_router(storage: Arc<dyn Storage>) -> Router {
    let state = Arc::new(AppState { storage });

    Router::new()
        .route("/health", get(health_check))
        .route("/api/shorten", post(shorten_url))
        .route("/api/my-urls", get(my_urls))
        .route("/api/analytics/{code}", get(get_analytics))
        .route("/api/analytics/{code}/basic", get(get_basic_analytics))
        .route("/api/analytics/{code}/all-clicks", get(get_all_clicks))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
