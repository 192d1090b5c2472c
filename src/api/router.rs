use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::admin;
use super::health;
use super::state::AppState;
use super::v1;

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    let api = v1::create_v1_router().nest("/admin", admin::create_admin_router());

    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .nest("/api/v1", api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
