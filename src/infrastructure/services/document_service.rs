//! Document service - tenant-scoped indexing and similarity search

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::document::{
    validate_document_id, DEFAULT_SEARCH_RESULTS, MAX_SEARCH_RESULTS,
};
use crate::domain::{
    DocumentIndex, DomainError, EmbeddingProvider, IndexedDocument, SearchHit,
    TenantConfigRepository, TenantId,
};

/// Document service
#[derive(Debug)]
pub struct DocumentService {
    tenants: Arc<dyn TenantConfigRepository>,
    embeddings: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn DocumentIndex>,
}

impl DocumentService {
    pub fn new(
        tenants: Arc<dyn TenantConfigRepository>,
        embeddings: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn DocumentIndex>,
    ) -> Self {
        Self {
            tenants,
            embeddings,
            index,
        }
    }

    async fn existing_tenant(&self, tenant_id: &str) -> Result<TenantId, DomainError> {
        let tenant_id = TenantId::new(tenant_id)?;
        if self.tenants.get_tenant(&tenant_id).await?.is_none() {
            return Err(DomainError::not_found(format!(
                "Tenant '{}' not found",
                tenant_id
            )));
        }
        Ok(tenant_id)
    }

    /// Embed and store a document, replacing any document with the same id
    pub async fn index_document(
        &self,
        tenant_id: &str,
        document_id: &str,
        document_text: &str,
    ) -> Result<IndexedDocument, DomainError> {
        let tenant_id = self.existing_tenant(tenant_id).await?;
        validate_document_id(document_id)?;
        if document_text.trim().is_empty() {
            return Err(DomainError::validation("Document text cannot be empty"));
        }

        let embedding = self.embeddings.embed(document_text).await?;
        let document = IndexedDocument::new(tenant_id, document_id, document_text, embedding);
        self.index.upsert(document.clone()).await?;

        info!(
            tenant_id = %document.tenant_id(),
            document_id = %document.id(),
            model = %self.embeddings.model(),
            "Indexed document"
        );
        Ok(document)
    }

    /// The tenant's documents most similar to `query_text`
    pub async fn search(
        &self,
        tenant_id: &str,
        query_text: &str,
        n_results: Option<usize>,
    ) -> Result<Vec<SearchHit>, DomainError> {
        let tenant_id = self.existing_tenant(tenant_id).await?;
        if query_text.trim().is_empty() {
            return Err(DomainError::validation("Query text cannot be empty"));
        }

        let limit = n_results.unwrap_or(DEFAULT_SEARCH_RESULTS);
        if limit == 0 || limit > MAX_SEARCH_RESULTS {
            return Err(DomainError::validation(format!(
                "n_results must be between 1 and {}",
                MAX_SEARCH_RESULTS
            )));
        }

        let query = self.embeddings.embed(query_text).await?;
        let hits = self.index.search(&tenant_id, &query, limit).await?;

        debug!(tenant_id = %tenant_id, hits = hits.len(), "Searched documents");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::mock::MockEmbeddingProvider;
    use crate::domain::Tenant;
    use crate::infrastructure::document::InMemoryDocumentIndex;
    use crate::infrastructure::tenant::InMemoryTenantConfigRepository;

    async fn service_with(embeddings: MockEmbeddingProvider) -> DocumentService {
        let tenants = Arc::new(InMemoryTenantConfigRepository::new());
        for (id, name) in [("acme", "Acme"), ("globex", "Globex")] {
            tenants
                .create_tenant(Tenant::new(TenantId::new(id).unwrap(), name))
                .await
                .unwrap();
        }
        DocumentService::new(
            tenants,
            Arc::new(embeddings),
            Arc::new(InMemoryDocumentIndex::new()),
        )
    }

    async fn service() -> DocumentService {
        service_with(MockEmbeddingProvider::new()).await
    }

    #[tokio::test]
    async fn test_index_and_search() {
        let service = service().await;
        service
            .index_document("acme", "pricing", "Enterprise pricing for 40 seats")
            .await
            .unwrap();
        service
            .index_document("acme", "holiday", "Office closed over the holiday")
            .await
            .unwrap();

        let hits = service.search("acme", "seats pricing", None).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document_id, "pricing");

        let hits = service.search("acme", "seats pricing", Some(1)).await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_search_never_crosses_tenants() {
        let service = service().await;
        service
            .index_document("globex", "plan", "Globex expansion plan")
            .await
            .unwrap();

        let hits = service.search("acme", "expansion plan", None).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_validation() {
        let service = service().await;

        assert!(matches!(
            service.index_document("initech", "doc", "text").await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            service.index_document("acme", " ", "text").await,
            Err(DomainError::Validation { .. })
        ));
        assert!(matches!(
            service.index_document("acme", "doc", "  ").await,
            Err(DomainError::Validation { .. })
        ));
        assert!(matches!(
            service.search("acme", "", None).await,
            Err(DomainError::Validation { .. })
        ));
        assert!(matches!(
            service.search("acme", "query", Some(0)).await,
            Err(DomainError::Validation { .. })
        ));
        assert!(matches!(
            service.search("acme", "query", Some(MAX_SEARCH_RESULTS + 1)).await,
            Err(DomainError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_embedding_failure_is_not_indexed() {
        let service = service_with(MockEmbeddingProvider::new().with_error("HTTP 500")).await;

        let err = service
            .index_document("acme", "doc", "text")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Provider { .. }));
    }
}
