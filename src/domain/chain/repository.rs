//! Chain repository trait

use async_trait::async_trait;

use super::entity::{ChainDefinition, ChainId};
use crate::domain::tenant::TenantId;
use crate::domain::DomainError;

/// Tenant-scoped chain definition storage
#[async_trait]
pub trait ChainRepository: Send + Sync + std::fmt::Debug {
    /// Get a chain by tenant and ID
    async fn get(
        &self,
        tenant_id: &TenantId,
        chain_id: &ChainId,
    ) -> Result<Option<ChainDefinition>, DomainError>;

    /// All chains of a tenant
    async fn list(&self, tenant_id: &TenantId) -> Result<Vec<ChainDefinition>, DomainError>;

    /// Store a new chain; fails with a conflict if the ID is taken within the tenant
    async fn create(&self, chain: ChainDefinition) -> Result<ChainDefinition, DomainError>;

    /// Delete a chain, returning whether it existed
    async fn delete(&self, tenant_id: &TenantId, chain_id: &ChainId) -> Result<bool, DomainError>;
}
