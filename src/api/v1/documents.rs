//! Tenant document indexing and similarity search

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::SearchHit;

#[derive(Debug, Clone, Deserialize)]
pub struct IndexDocumentRequest {
    pub tenant_id: String,
    pub document_id: String,
    pub document_text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexDocumentResponse {
    pub tenant_id: String,
    pub document_id: String,
    pub status: &'static str,
    pub indexed_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchDocumentsRequest {
    pub tenant_id: String,
    pub query_text: String,
    /// Defaults to 3
    #[serde(default)]
    pub n_results: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchDocumentsResponse {
    pub results: Vec<SearchHit>,
    pub total: usize,
}

/// POST /api/v1/documents/index
pub async fn index_document(
    State(state): State<AppState>,
    Json(request): Json<IndexDocumentRequest>,
) -> Result<Json<IndexDocumentResponse>, ApiError> {
    let document = state
        .document_service
        .index_document(
            &request.tenant_id,
            &request.document_id,
            &request.document_text,
        )
        .await
        .map_err(ApiError::from)?;

    Ok(Json(IndexDocumentResponse {
        tenant_id: document.tenant_id().to_string(),
        document_id: document.id().to_string(),
        status: "indexed",
        indexed_at: document.indexed_at().to_rfc3339(),
    }))
}

/// POST /api/v1/documents/search
pub async fn search_documents(
    State(state): State<AppState>,
    Json(request): Json<SearchDocumentsRequest>,
) -> Result<Json<SearchDocumentsResponse>, ApiError> {
    let results = state
        .document_service
        .search(&request.tenant_id, &request.query_text, request.n_results)
        .await
        .map_err(ApiError::from)?;

    let total = results.len();
    Ok(Json(SearchDocumentsResponse { results, total }))
}
