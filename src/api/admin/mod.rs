//! Admin API endpoints

pub mod tenants;

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

/// Create admin API router
pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route("/tenants", post(tenants::setup_tenant))
        .route("/tenants/{tenant_id}", get(tenants::get_tenant))
}
