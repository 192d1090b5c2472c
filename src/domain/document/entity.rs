//! Indexed documents and search hits

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::tenant::TenantId;
use crate::domain::DomainError;

pub const MAX_DOCUMENT_ID_LENGTH: usize = 255;

/// Results returned when a search does not ask for a count
pub const DEFAULT_SEARCH_RESULTS: usize = 3;

pub const MAX_SEARCH_RESULTS: usize = 50;

pub fn validate_document_id(id: &str) -> Result<(), DomainError> {
    if id.trim().is_empty() {
        return Err(DomainError::validation("Document ID cannot be empty"));
    }

    if id.chars().count() > MAX_DOCUMENT_ID_LENGTH {
        return Err(DomainError::validation(format!(
            "Document ID exceeds maximum length of {} characters",
            MAX_DOCUMENT_ID_LENGTH
        )));
    }

    Ok(())
}

/// A document with its embedding, owned by one tenant
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedDocument {
    tenant_id: TenantId,
    id: String,
    text: String,
    embedding: Vec<f32>,
    indexed_at: DateTime<Utc>,
}

impl IndexedDocument {
    pub fn new(
        tenant_id: TenantId,
        id: impl Into<String>,
        text: impl Into<String>,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            tenant_id,
            id: id.into(),
            text: text.into(),
            embedding,
            indexed_at: Utc::now(),
        }
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    pub fn indexed_at(&self) -> DateTime<Utc> {
        self.indexed_at
    }
}

/// One search result; higher `score` is more similar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub document_id: String,
    pub document_text: String,
    pub score: f32,
}
