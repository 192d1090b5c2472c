//! Tenant service - tenant setup with optional agent configuration

use std::sync::Arc;

use tracing::info;

use crate::domain::{
    DocSumConfig, DomainError, EmailAgentConfig, SfdcConfig, Tenant, TenantConfigRepository,
    TenantId,
};

/// Request to set up a tenant
#[derive(Debug, Clone)]
pub struct SetupTenantRequest {
    pub id: String,
    pub name: String,
    pub email: Option<EmailAgentConfig>,
    pub sfdc: Option<SfdcConfig>,
    pub doc_sum: Option<DocSumConfig>,
}

impl SetupTenantRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
            sfdc: None,
            doc_sum: None,
        }
    }

    pub fn with_email(mut self, config: EmailAgentConfig) -> Self {
        self.email = Some(config);
        self
    }

    pub fn with_sfdc(mut self, config: SfdcConfig) -> Self {
        self.sfdc = Some(config);
        self
    }

    pub fn with_doc_sum(mut self, config: DocSumConfig) -> Self {
        self.doc_sum = Some(config);
        self
    }
}

/// Tenant service
#[derive(Debug)]
pub struct TenantService {
    tenants: Arc<dyn TenantConfigRepository>,
}

impl TenantService {
    pub fn new(tenants: Arc<dyn TenantConfigRepository>) -> Self {
        Self { tenants }
    }

    pub async fn get(&self, id: &str) -> Result<Option<Tenant>, DomainError> {
        let id = TenantId::new(id)?;
        self.tenants.get_tenant(&id).await
    }

    /// Create a tenant and store whichever agent configs are supplied
    pub async fn setup_tenant(&self, request: SetupTenantRequest) -> Result<Tenant, DomainError> {
        let id = TenantId::new(request.id)?;

        if request.name.trim().is_empty() {
            return Err(DomainError::validation("Tenant name cannot be empty"));
        }

        if let Some(email) = &request.email {
            validate_email_config(email)?;
        }
        if let Some(sfdc) = &request.sfdc {
            validate_sfdc_config(sfdc)?;
        }
        if let Some(doc_sum) = &request.doc_sum {
            if doc_sum.summarizer_setting.trim().is_empty() {
                return Err(DomainError::validation("summarizer_setting cannot be empty"));
            }
        }

        let tenant = self
            .tenants
            .create_tenant(Tenant::new(id.clone(), request.name))
            .await?;

        if let Some(email) = request.email {
            self.tenants.put_email_config(&id, email).await?;
        }
        if let Some(sfdc) = request.sfdc {
            self.tenants.put_sfdc_config(&id, sfdc).await?;
        }
        if let Some(doc_sum) = request.doc_sum {
            self.tenants.put_doc_sum_config(&id, doc_sum).await?;
        }

        info!(tenant_id = %id, "Tenant set up");
        Ok(tenant)
    }
}

fn validate_email_config(config: &EmailAgentConfig) -> Result<(), DomainError> {
    if config.smtp_server.trim().is_empty() {
        return Err(DomainError::validation("smtp_server cannot be empty"));
    }
    if config.smtp_port == 0 {
        return Err(DomainError::validation("smtp_port must be greater than 0"));
    }
    if config.smtp_username.trim().is_empty() {
        return Err(DomainError::validation("smtp_username cannot be empty"));
    }
    Ok(())
}

fn validate_sfdc_config(config: &SfdcConfig) -> Result<(), DomainError> {
    if !config.instance_url.starts_with("http://") && !config.instance_url.starts_with("https://") {
        return Err(DomainError::validation(
            "instance_url must be an http(s) URL",
        ));
    }
    if config.access_token.trim().is_empty() {
        return Err(DomainError::validation("access_token cannot be empty"));
    }
    Ok(())
}
