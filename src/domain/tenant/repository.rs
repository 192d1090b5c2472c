//! Tenant and agent configuration repository trait

use async_trait::async_trait;

use super::config::{DocSumConfig, EmailAgentConfig, SfdcConfig};
use super::entity::{Tenant, TenantId};
use crate::domain::DomainError;

/// Read/write access to tenants and their per-agent configuration.
///
/// Agents only use the getters, and they call them on every invocation so
/// configuration changes take effect without restarting anything.
#[async_trait]
pub trait TenantConfigRepository: Send + Sync + std::fmt::Debug {
    async fn get_tenant(&self, id: &TenantId) -> Result<Option<Tenant>, DomainError>;

    /// Create a tenant; fails with a conflict if the id or name is taken
    async fn create_tenant(&self, tenant: Tenant) -> Result<Tenant, DomainError>;

    async fn email_config(&self, id: &TenantId) -> Result<Option<EmailAgentConfig>, DomainError>;

    async fn sfdc_config(&self, id: &TenantId) -> Result<Option<SfdcConfig>, DomainError>;

    async fn doc_sum_config(&self, id: &TenantId) -> Result<Option<DocSumConfig>, DomainError>;

    async fn put_email_config(
        &self,
        id: &TenantId,
        config: EmailAgentConfig,
    ) -> Result<(), DomainError>;

    async fn put_sfdc_config(&self, id: &TenantId, config: SfdcConfig) -> Result<(), DomainError>;

    async fn put_doc_sum_config(
        &self,
        id: &TenantId,
        config: DocSumConfig,
    ) -> Result<(), DomainError>;
}
