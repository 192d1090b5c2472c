//! Start-up seed file for tenants, agent configs and chains
//!
//! ```toml
//! [[tenants]]
//! id = "acme"
//! name = "Acme Corp"
//!
//! [tenants.sfdc]
//! instance_url = "https://acme.my.salesforce.com"
//! access_token = "..."
//!
//! [[tenants.chains]]
//! id = "lead-intake"
//! name = "Lead intake"
//!
//! [[tenants.chains.steps]]
//! step_order = 1
//! agent_name = "doc_sum"
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use super::services::{ChainService, CreateChainRequest, SetupTenantRequest, TenantService};
use crate::domain::{DocSumConfig, DomainError, EmailAgentConfig, SfdcConfig, StepDefinition};

#[derive(Debug, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub tenants: Vec<TenantSeed>,
}

#[derive(Debug, Deserialize)]
pub struct TenantSeed {
    pub id: String,
    pub name: String,
    pub email: Option<EmailAgentConfig>,
    pub sfdc: Option<SfdcConfig>,
    pub doc_sum: Option<DocSumConfig>,

    #[serde(default)]
    pub chains: Vec<ChainSeed>,
}

#[derive(Debug, Deserialize)]
pub struct ChainSeed {
    pub id: Option<String>,
    pub name: String,

    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

/// Counts of what a seed file created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedSummary {
    pub tenants: usize,
    pub chains: usize,
}

impl SeedFile {
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        toml::from_str(text)
            .map_err(|e| DomainError::configuration(format!("Invalid seed file: {}", e)))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            DomainError::configuration(format!(
                "Failed to read seed file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&text)
    }

    /// Create every tenant and chain through the services, stopping at the
    /// first invalid entry
    pub async fn apply(
        self,
        tenants: &TenantService,
        chains: &ChainService,
    ) -> Result<SeedSummary, DomainError> {
        let mut summary = SeedSummary::default();

        for seed in self.tenants {
            let tenant_id = seed.id.clone();
            let mut request = SetupTenantRequest::new(seed.id, seed.name);
            request.email = seed.email;
            request.sfdc = seed.sfdc;
            request.doc_sum = seed.doc_sum;
            tenants.setup_tenant(request).await?;
            summary.tenants += 1;

            for chain in seed.chains {
                let mut request =
                    CreateChainRequest::new(tenant_id.clone(), chain.name).with_steps(chain.steps);
                request.chain_id = chain.id;

                let created = chains.create(request).await.map_err(|e| {
                    DomainError::configuration(format!(
                        "Invalid chain in seed file for tenant '{}': {}",
                        tenant_id, e
                    ))
                })?;
                info!(tenant_id = %tenant_id, chain_id = %created.id(), "Seeded chain");
                summary.chains += 1;
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::mock::ScriptedTaskRunner;
    use crate::domain::{AgentInvoker, TenantConfigRepository, TenantId};
    use crate::infrastructure::chain::{ChainRunnerImpl, InMemoryChainRepository};
    use crate::infrastructure::tenant::InMemoryTenantConfigRepository;
    use std::sync::Arc;

    const SEED: &str = r#"
[[tenants]]
id = "acme"
name = "Acme Corp"

[tenants.email]
smtp_server = "smtp.acme.test"
smtp_port = 587
smtp_username = "bot@acme.test"
smtp_password = "secret"

[tenants.sfdc]
instance_url = "https://acme.my.salesforce.com"
access_token = "tok"

[[tenants.chains]]
id = "lead-intake"
name = "Lead intake"

[[tenants.chains.steps]]
step_order = 1
agent_name = "doc_sum"

[[tenants.chains.steps]]
step_order = 2
agent_name = "sfdc"
condition = "summary is present"

[[tenants]]
id = "globex"
name = "Globex"
"#;

    fn services() -> (TenantService, ChainService, Arc<InMemoryTenantConfigRepository>) {
        let tenants = Arc::new(InMemoryTenantConfigRepository::new());
        let chains = Arc::new(InMemoryChainRepository::new());
        let runner = Arc::new(ChainRunnerImpl::new(
            chains.clone(),
            AgentInvoker::new(Arc::new(ScriptedTaskRunner::new())),
        ));
        (
            TenantService::new(tenants.clone()),
            ChainService::new(chains, tenants.clone(), runner),
            tenants,
        )
    }

    #[tokio::test]
    async fn test_apply_seed() {
        let (tenant_service, chain_service, repo) = services();
        let summary = SeedFile::parse(SEED)
            .unwrap()
            .apply(&tenant_service, &chain_service)
            .await
            .unwrap();

        assert_eq!(summary, SeedSummary { tenants: 2, chains: 1 });

        let acme = TenantId::new("acme").unwrap();
        let sfdc = repo.sfdc_config(&acme).await.unwrap().unwrap();
        assert_eq!(sfdc.api_version, "v59.0");
        assert!(repo.email_config(&acme).await.unwrap().is_some());

        let chain = chain_service.get("acme", "lead-intake").await.unwrap().unwrap();
        assert_eq!(chain.steps().len(), 2);
        assert_eq!(chain.steps()[1].condition.as_deref(), Some("summary is present"));
    }

    #[tokio::test]
    async fn test_invalid_chain_aborts() {
        let seed = r#"
[[tenants]]
id = "acme"
name = "Acme"

[[tenants.chains]]
name = "Broken"

[[tenants.chains.steps]]
step_order = 1
agent_name = "fax"
"#;
        let (tenant_service, chain_service, _) = services();
        let err = SeedFile::parse(seed)
            .unwrap()
            .apply(&tenant_service, &chain_service)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Configuration { .. }));
        assert!(err.to_string().contains("fax"));
    }

    #[tokio::test]
    async fn test_example_seed_file_applies() {
        let (tenant_service, chain_service, _) = services();
        let summary = SeedFile::parse(include_str!("../../config/seed.example.toml"))
            .unwrap()
            .apply(&tenant_service, &chain_service)
            .await
            .unwrap();

        assert_eq!(summary, SeedSummary { tenants: 1, chains: 1 });

        let input = serde_json::json!({
            "document_text": "Acme wants 40 seats",
            "lead_data": {"LastName": "Doe", "Company": "Acme"},
            "email_params": {"recipient": "sales@example.com", "subject": "New lead"}
        });
        let serde_json::Value::Object(input) = input else {
            panic!("expected an object");
        };
        let run = chain_service
            .execute(
                &TenantId::new("acme").unwrap(),
                &crate::domain::ChainId::new("lead-intake").unwrap(),
                input,
            )
            .await
            .unwrap();

        assert_eq!(run.executed_agents(), vec!["doc_sum", "sfdc", "email"]);
    }

    #[test]
    fn test_parse_error() {
        let err = SeedFile::parse("[[tenants]]\nid = 1").unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }
}
