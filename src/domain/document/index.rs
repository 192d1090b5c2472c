//! Document index trait

use async_trait::async_trait;

use super::entity::{IndexedDocument, SearchHit};
use crate::domain::tenant::TenantId;
use crate::domain::DomainError;

/// Vector store for tenant documents.
///
/// Document ids are unique per tenant; indexing an existing id replaces it.
/// Searches never return another tenant's documents.
#[async_trait]
pub trait DocumentIndex: Send + Sync + std::fmt::Debug {
    async fn upsert(&self, document: IndexedDocument) -> Result<(), DomainError>;

    /// Up to `limit` of the tenant's documents closest to `query`, best first
    async fn search(
        &self,
        tenant_id: &TenantId,
        query: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchHit>, DomainError>;
}
