use axum::{routing::get, Router};
use std::sync::Arc;

use crate::analytics::GeoIpService;
use crate::storage::Storage;

use super::handlers::{health_check, redirect_url, RedirectState};

pub fn create_redirect_router(storage: Arc<dyn Storage>, geoip: Arc<GeoIpService>) -> Router {
    let state = Arc::new(RedirectState { storage, geoip });

    Router::new()
        .route("/", get(health_check))
        .route("/{code}", get(redirect_url))
        .with_state(state)
}
