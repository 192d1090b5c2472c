//! Document domain module
//!
//! Tenants index free-text documents and search them by similarity. Every
//! lookup is scoped to one tenant.

mod embedding;
mod entity;
mod index;

pub use embedding::EmbeddingProvider;
pub use entity::{
    validate_document_id, IndexedDocument, SearchHit, DEFAULT_SEARCH_RESULTS,
    MAX_DOCUMENT_ID_LENGTH, MAX_SEARCH_RESULTS,
};
pub use index::DocumentIndex;

#[cfg(test)]
pub use embedding::mock;
