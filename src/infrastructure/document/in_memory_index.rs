//! In-memory document index with brute-force cosine similarity

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{DocumentIndex, DomainError, IndexedDocument, SearchHit, TenantId};

/// Documents grouped by tenant, then by document id
type TenantDocuments = HashMap<TenantId, HashMap<String, IndexedDocument>>;

#[derive(Debug, Default)]
pub struct InMemoryDocumentIndex {
    documents: Arc<RwLock<TenantDocuments>>,
}

impl InMemoryDocumentIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Cosine similarity; 0.0 when either vector has no magnitude
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl DocumentIndex for InMemoryDocumentIndex {
    async fn upsert(&self, document: IndexedDocument) -> Result<(), DomainError> {
        let mut documents = self.documents.write().await;
        documents
            .entry(document.tenant_id().clone())
            .or_default()
            .insert(document.id().to_string(), document);
        Ok(())
    }

    async fn search(
        &self,
        tenant_id: &TenantId,
        query: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchHit>, DomainError> {
        let documents = self.documents.read().await;
        let Some(tenant_documents) = documents.get(tenant_id) else {
            return Ok(Vec::new());
        };

        // Vectors from a different embedding model cannot be compared
        let mut hits: Vec<SearchHit> = tenant_documents
            .values()
            .filter(|doc| doc.embedding().len() == query.len())
            .map(|doc| SearchHit {
                document_id: doc.id().to_string(),
                document_text: doc.text().to_string(),
                score: cosine_similarity(doc.embedding(), query),
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.document_id.cmp(&b.document_id))
        });
        hits.truncate(limit);

        Ok(hits)
    }
}
