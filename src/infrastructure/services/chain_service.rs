//! Chain service - authoring and execution of tenant chains

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::domain::{
    ChainDefinition, ChainError, ChainId, ChainRepository, ChainRunResult, ChainRunner,
    DomainError, ExecutionPlan, StepDefinition, TenantConfigRepository, TenantId,
};

/// Request to create a new chain
#[derive(Debug, Clone)]
pub struct CreateChainRequest {
    pub tenant_id: String,
    /// Generated when absent
    pub chain_id: Option<String>,
    pub name: String,
    pub steps: Vec<StepDefinition>,
}

impl CreateChainRequest {
    pub fn new(tenant_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            chain_id: None,
            name: name.into(),
            steps: Vec::new(),
        }
    }

    pub fn with_id(mut self, chain_id: impl Into<String>) -> Self {
        self.chain_id = Some(chain_id.into());
        self
    }

    pub fn with_steps(mut self, steps: Vec<StepDefinition>) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_step(mut self, step: StepDefinition) -> Self {
        self.steps.push(step);
        self
    }
}

/// Chain service for CRUD operations and runs
pub struct ChainService {
    chains: Arc<dyn ChainRepository>,
    tenants: Arc<dyn TenantConfigRepository>,
    runner: Arc<dyn ChainRunner>,
}

impl std::fmt::Debug for ChainService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainService").finish()
    }
}

impl ChainService {
    pub fn new(
        chains: Arc<dyn ChainRepository>,
        tenants: Arc<dyn TenantConfigRepository>,
        runner: Arc<dyn ChainRunner>,
    ) -> Self {
        Self {
            chains,
            tenants,
            runner,
        }
    }

    /// Get a chain by tenant and chain ID
    pub async fn get(
        &self,
        tenant_id: &str,
        chain_id: &str,
    ) -> Result<Option<ChainDefinition>, DomainError> {
        let tenant_id = TenantId::new(tenant_id)?;
        let chain_id = ChainId::new(chain_id)?;
        self.chains.get(&tenant_id, &chain_id).await
    }

    /// List a tenant's chains
    pub async fn list(&self, tenant_id: &str) -> Result<Vec<ChainDefinition>, DomainError> {
        let tenant_id = TenantId::new(tenant_id)?;
        self.chains.list(&tenant_id).await
    }

    /// Validate and store a new chain.
    ///
    /// Rejects unknown agent names, malformed conditions and duplicate step
    /// orders so that stored chains only fail at run time on input data.
    pub async fn create(&self, request: CreateChainRequest) -> Result<ChainDefinition, DomainError> {
        let tenant_id = TenantId::new(request.tenant_id)?;
        let chain_id = match request.chain_id {
            Some(id) => ChainId::new(id)?,
            None => ChainId::generate(),
        };

        if self.tenants.get_tenant(&tenant_id).await?.is_none() {
            return Err(DomainError::not_found(format!(
                "Tenant '{}' not found",
                tenant_id
            )));
        }

        if request.name.trim().is_empty() {
            return Err(DomainError::validation("Chain name cannot be empty"));
        }

        let chain = ChainDefinition::new(tenant_id, chain_id, request.name).with_steps(request.steps);

        let duplicates = chain.duplicate_step_orders();
        if !duplicates.is_empty() {
            return Err(DomainError::validation(format!(
                "Duplicate step_order values: {:?}",
                duplicates
            )));
        }

        ExecutionPlan::build(&chain).map_err(|e| DomainError::validation(e.to_string()))?;

        self.chains.create(chain).await
    }

    /// Delete a chain, returning whether it existed
    pub async fn delete(&self, tenant_id: &str, chain_id: &str) -> Result<bool, DomainError> {
        let tenant_id = TenantId::new(tenant_id)?;
        let chain_id = ChainId::new(chain_id)?;
        self.chains.delete(&tenant_id, &chain_id).await
    }

    /// Run a stored chain against `input`
    pub async fn execute(
        &self,
        tenant_id: &TenantId,
        chain_id: &ChainId,
        input: Map<String, Value>,
    ) -> Result<ChainRunResult, ChainError> {
        self.runner.run_chain(tenant_id, chain_id, input).await
    }
}
