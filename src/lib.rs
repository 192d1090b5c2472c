//! Tenant-scoped agent chains
//!
//! Tenants author chains of agent steps (`doc_sum`, `sfdc`, `email`). A run
//! walks the steps in `step_order`, evaluates each step's condition against a
//! shared execution context, dispatches the agent through the task runner and
//! merges its output back into the context. Tenants can also index documents
//! and search them by embedding similarity.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::state::AppState;
use domain::AgentInvoker;
use infrastructure::{
    agents::{
        EmailAgent, HttpClient, SfdcLeadAgent, SmtpMailSender, SummarizerAgent, SummarizerSettings,
    },
    chain::{ChainRunnerImpl, InMemoryChainRepository},
    document::{EmbeddingSettings, InMemoryDocumentIndex, OpenAiEmbeddingProvider},
    seed::SeedFile,
    services::{ChainService, DocumentService, TenantService},
    task_runner::{LocalTaskRunner, TaskRunnerConfig},
    tenant::InMemoryTenantConfigRepository,
};
use tracing::info;

/// Build every store, agent and service from configuration and load the seed
/// file when one is configured
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let tenants = Arc::new(InMemoryTenantConfigRepository::new());
    let chains = Arc::new(InMemoryChainRepository::new());

    let http_client = HttpClient::new();
    let summarizer = SummarizerAgent::new(
        http_client.clone(),
        tenants.clone(),
        SummarizerSettings {
            base_url: config.summarizer.base_url.clone(),
            api_key: config.summarizer.api_key.clone(),
            model: config.summarizer.model.clone(),
            max_tokens: config.summarizer.max_tokens,
            temperature: config.summarizer.temperature,
        },
    );
    let embeddings = OpenAiEmbeddingProvider::new(
        http_client.clone(),
        EmbeddingSettings {
            base_url: config.embeddings.base_url.clone(),
            api_key: config
                .embeddings
                .api_key_or(&config.summarizer.api_key)
                .to_string(),
            model: config.embeddings.model.clone(),
        },
    );
    let sfdc = SfdcLeadAgent::new(http_client, tenants.clone());
    let email = EmailAgent::new(
        SmtpMailSender::new(Duration::from_secs(config.email.timeout_secs)),
        tenants.clone(),
    )
    .with_default_from(config.email.from_address.clone());

    let task_runner = LocalTaskRunner::new(TaskRunnerConfig {
        max_concurrency: config.task_runner.max_concurrency,
        max_retries: config.task_runner.max_retries,
        retry_delay: Duration::from_millis(config.task_runner.retry_delay_ms),
        status_ttl: Duration::from_secs(config.task_runner.status_ttl_secs),
        status_capacity: config.task_runner.status_capacity,
    })
    .with_agent(Arc::new(summarizer))
    .with_agent(Arc::new(sfdc))
    .with_agent(Arc::new(email));

    let invoker =
        AgentInvoker::new(Arc::new(task_runner)).with_default_timeout(config.runner.step_timeout());
    let runner = Arc::new(ChainRunnerImpl::new(chains.clone(), invoker.clone()));

    let chain_service = Arc::new(ChainService::new(chains, tenants.clone(), runner));
    let document_service = Arc::new(DocumentService::new(
        tenants.clone(),
        Arc::new(embeddings),
        Arc::new(InMemoryDocumentIndex::new()),
    ));
    let tenant_service = Arc::new(TenantService::new(tenants));

    if let Some(path) = &config.storage.seed_file {
        let summary = SeedFile::from_path(path)?
            .apply(&tenant_service, &chain_service)
            .await?;
        info!(
            seed_file = %path,
            tenants = summary.tenants,
            chains = summary.chains,
            "Seed file loaded"
        );
    }

    Ok(AppState::new(
        chain_service,
        tenant_service,
        document_service,
        invoker,
    ))
}
