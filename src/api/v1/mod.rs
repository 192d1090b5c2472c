//! Versioned API endpoints

pub mod agents;
pub mod chains;
pub mod documents;
pub mod tasks;

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

/// Create v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/chains", post(chains::create_chain))
        .route("/chains/execute", post(chains::execute_chain))
        .route("/chains/{tenant_id}", get(chains::list_chains))
        .route(
            "/chains/{tenant_id}/{chain_id}",
            get(chains::get_chain).delete(chains::delete_chain),
        )
        .route(
            "/agents/summarize_document",
            post(agents::summarize_document),
        )
        .route("/agents/create_lead", post(agents::create_lead))
        .route("/agents/send_email", post(agents::send_email))
        .route("/documents/index", post(documents::index_document))
        .route("/documents/search", post(documents::search_documents))
        .route("/tasks/{task_id}", get(tasks::get_task))
}
