//! In-memory chain repository implementation

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{ChainDefinition, ChainId, ChainRepository, DomainError, TenantId};

type ChainKey = (TenantId, ChainId);

/// In-memory implementation of ChainRepository
#[derive(Debug)]
pub struct InMemoryChainRepository {
    chains: Arc<RwLock<HashMap<ChainKey, ChainDefinition>>>,
}

impl InMemoryChainRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            chains: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a repository pre-populated with chains
    pub fn with_chains(chains: Vec<ChainDefinition>) -> Self {
        let map: HashMap<ChainKey, ChainDefinition> = chains
            .into_iter()
            .map(|c| ((c.tenant_id().clone(), c.id().clone()), c))
            .collect();

        Self {
            chains: Arc::new(RwLock::new(map)),
        }
    }
}

impl Default for InMemoryChainRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainRepository for InMemoryChainRepository {
    async fn get(
        &self,
        tenant_id: &TenantId,
        chain_id: &ChainId,
    ) -> Result<Option<ChainDefinition>, DomainError> {
        let chains = self.chains.read().await;
        Ok(chains
            .get(&(tenant_id.clone(), chain_id.clone()))
            .cloned())
    }

    async fn list(&self, tenant_id: &TenantId) -> Result<Vec<ChainDefinition>, DomainError> {
        let chains = self.chains.read().await;
        let mut list: Vec<ChainDefinition> = chains
            .values()
            .filter(|c| c.tenant_id() == tenant_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| a.id().as_str().cmp(b.id().as_str()));
        Ok(list)
    }

    async fn create(&self, chain: ChainDefinition) -> Result<ChainDefinition, DomainError> {
        let mut chains = self.chains.write().await;
        let key = (chain.tenant_id().clone(), chain.id().clone());

        if chains.contains_key(&key) {
            return Err(DomainError::conflict(format!(
                "Chain '{}' already exists for tenant '{}'",
                chain.id(),
                chain.tenant_id()
            )));
        }

        chains.insert(key, chain.clone());
        Ok(chain)
    }

    async fn delete(&self, tenant_id: &TenantId, chain_id: &ChainId) -> Result<bool, DomainError> {
        let mut chains = self.chains.write().await;
        Ok(chains
            .remove(&(tenant_id.clone(), chain_id.clone()))
            .is_some())
    }
}
