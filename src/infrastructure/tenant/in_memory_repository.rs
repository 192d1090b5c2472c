//! In-memory tenant and agent configuration repository

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{
    DocSumConfig, DomainError, EmailAgentConfig, SfdcConfig, Tenant, TenantConfigRepository,
    TenantId,
};

#[derive(Debug, Clone)]
struct TenantRecord {
    tenant: Tenant,
    email: Option<EmailAgentConfig>,
    sfdc: Option<SfdcConfig>,
    doc_sum: Option<DocSumConfig>,
}

impl TenantRecord {
    fn new(tenant: Tenant) -> Self {
        Self {
            tenant,
            email: None,
            sfdc: None,
            doc_sum: None,
        }
    }
}

/// In-memory implementation of TenantConfigRepository
#[derive(Debug, Default)]
pub struct InMemoryTenantConfigRepository {
    tenants: Arc<RwLock<HashMap<TenantId, TenantRecord>>>,
}

impl InMemoryTenantConfigRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn update<F>(&self, id: &TenantId, apply: F) -> Result<(), DomainError>
    where
        F: FnOnce(&mut TenantRecord) + Send,
    {
        let mut tenants = self.tenants.write().await;
        let record = tenants
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found(format!("Tenant '{}' not found", id)))?;
        apply(record);
        Ok(())
    }
}

#[async_trait]
impl TenantConfigRepository for InMemoryTenantConfigRepository {
    async fn get_tenant(&self, id: &TenantId) -> Result<Option<Tenant>, DomainError> {
        let tenants = self.tenants.read().await;
        Ok(tenants.get(id).map(|r| r.tenant.clone()))
    }

    async fn create_tenant(&self, tenant: Tenant) -> Result<Tenant, DomainError> {
        let mut tenants = self.tenants.write().await;

        if tenants.contains_key(tenant.id()) {
            return Err(DomainError::conflict(format!(
                "Tenant '{}' already exists",
                tenant.id()
            )));
        }

        if tenants.values().any(|r| r.tenant.name() == tenant.name()) {
            return Err(DomainError::conflict(format!(
                "Tenant name '{}' is already in use",
                tenant.name()
            )));
        }

        tenants.insert(tenant.id().clone(), TenantRecord::new(tenant.clone()));
        Ok(tenant)
    }

    async fn email_config(&self, id: &TenantId) -> Result<Option<EmailAgentConfig>, DomainError> {
        let tenants = self.tenants.read().await;
        Ok(tenants.get(id).and_then(|r| r.email.clone()))
    }

    async fn sfdc_config(&self, id: &TenantId) -> Result<Option<SfdcConfig>, DomainError> {
        let tenants = self.tenants.read().await;
        Ok(tenants.get(id).and_then(|r| r.sfdc.clone()))
    }

    async fn doc_sum_config(&self, id: &TenantId) -> Result<Option<DocSumConfig>, DomainError> {
        let tenants = self.tenants.read().await;
        Ok(tenants.get(id).and_then(|r| r.doc_sum.clone()))
    }

    async fn put_email_config(
        &self,
        id: &TenantId,
        config: EmailAgentConfig,
    ) -> Result<(), DomainError> {
        self.update(id, |r| r.email = Some(config)).await
    }

    async fn put_sfdc_config(&self, id: &TenantId, config: SfdcConfig) -> Result<(), DomainError> {
        self.update(id, |r| r.sfdc = Some(config)).await
    }

    async fn put_doc_sum_config(
        &self,
        id: &TenantId,
        config: DocSumConfig,
    ) -> Result<(), DomainError> {
        self.update(id, |r| r.doc_sum = Some(config)).await
    }
}
