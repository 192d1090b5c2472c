//! Document summarization agent backed by an OpenAI-compatible chat completions API

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::http_client::HttpClientTrait;
use crate::domain::{
    Agent, AgentError, AgentKind, AgentPayload, TaskOutcome, TenantConfigRepository, TenantId,
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Connection and sampling settings shared by all tenants
#[derive(Clone)]
pub struct SummarizerSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 150,
            temperature: 0.5,
        }
    }
}

impl std::fmt::Debug for SummarizerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummarizerSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// `doc_sum` agent
#[derive(Debug)]
pub struct SummarizerAgent<C: HttpClientTrait> {
    client: C,
    tenants: Arc<dyn TenantConfigRepository>,
    settings: SummarizerSettings,
    auth_header: String,
}

impl<C: HttpClientTrait> SummarizerAgent<C> {
    pub fn new(
        client: C,
        tenants: Arc<dyn TenantConfigRepository>,
        mut settings: SummarizerSettings,
    ) -> Self {
        settings.base_url = settings.base_url.trim_end_matches('/').to_string();
        let auth_header = format!("Bearer {}", settings.api_key);

        Self {
            client,
            tenants,
            settings,
            auth_header,
        }
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.settings.base_url)
    }

    /// Model for the tenant: its doc_sum setting when present, else the shared default
    async fn model_for(&self, tenant_id: &TenantId) -> Result<String, AgentError> {
        let config = self
            .tenants
            .doc_sum_config(tenant_id)
            .await
            .map_err(|e| AgentError::failure(e.to_string()))?;

        Ok(config
            .map(|c| c.summarizer_setting)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.settings.model.clone()))
    }

    async fn summarize(&self, tenant_id: &TenantId, document_text: &str) -> TaskOutcome {
        let model = self.model_for(tenant_id).await?;
        let body = json!({
            "model": model,
            "messages": [{
                "role": "user",
                "content": format!("Summarize the following document:\n\n{}", document_text),
            }],
            "max_tokens": self.settings.max_tokens,
            "temperature": self.settings.temperature,
        });

        debug!(tenant_id = %tenant_id, model = %model, "Requesting summary");

        let response = self
            .client
            .post_json(
                &self.chat_completions_url(),
                vec![
                    ("Authorization", self.auth_header.as_str()),
                    ("Content-Type", "application/json"),
                ],
                &body,
            )
            .await?;

        let response: ChatCompletionResponse = serde_json::from_value(response)
            .map_err(|e| AgentError::failure(format!("Failed to parse summary response: {}", e)))?;

        let summary = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AgentError::failure("Summarizer returned no content"))?;

        Ok(json!(summary))
    }
}

#[async_trait]
impl<C: HttpClientTrait> Agent for SummarizerAgent<C> {
    fn kind(&self) -> AgentKind {
        AgentKind::DocSum
    }

    async fn run(&self, tenant_id: &TenantId, payload: &AgentPayload) -> TaskOutcome {
        match payload {
            AgentPayload::DocSum { document_text } => self.summarize(tenant_id, document_text).await,
            other => Err(AgentError::failure(format!(
                "doc_sum cannot handle a {} payload",
                other.kind()
            ))),
        }
    }
}
