//! Embeddings from an OpenAI-compatible `/v1/embeddings` endpoint

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::domain::{DomainError, EmbeddingProvider};
use crate::infrastructure::agents::HttpClientTrait;

const PROVIDER: &str = "embeddings";

#[derive(Clone)]
pub struct EmbeddingSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl std::fmt::Debug for EmbeddingSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug)]
pub struct OpenAiEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    settings: EmbeddingSettings,
    auth_header: String,
}

impl<C: HttpClientTrait> OpenAiEmbeddingProvider<C> {
    pub fn new(client: C, mut settings: EmbeddingSettings) -> Self {
        settings.base_url = settings.base_url.trim_end_matches('/').to_string();
        let auth_header = format!("Bearer {}", settings.api_key);

        Self {
            client,
            settings,
            auth_header,
        }
    }

    fn embeddings_url(&self) -> String {
        format!("{}/v1/embeddings", self.settings.base_url)
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for OpenAiEmbeddingProvider<C> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let body = json!({
            "model": self.settings.model,
            "input": text,
        });

        debug!(model = %self.settings.model, chars = text.len(), "Requesting embedding");

        let response = self
            .client
            .post_json(
                &self.embeddings_url(),
                vec![
                    ("Authorization", self.auth_header.as_str()),
                    ("Content-Type", "application/json"),
                ],
                &body,
            )
            .await
            .map_err(|e| DomainError::provider(PROVIDER, e.to_string()))?;

        let response: EmbeddingResponse = serde_json::from_value(response).map_err(|e| {
            DomainError::provider(PROVIDER, format!("Failed to parse embedding response: {}", e))
        })?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| DomainError::provider(PROVIDER, "Response contained no embedding"))
    }

    fn model(&self) -> &str {
        &self.settings.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::agents::HttpClient;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(base_url: String) -> EmbeddingSettings {
        EmbeddingSettings {
            base_url: format!("{}/", base_url),
            api_key: "sk-test".to_string(),
            model: "text-embedding-ada-002".to_string(),
        }
    }

    #[tokio::test]
    async fn test_embed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "text-embedding-ada-002",
                "input": "Quarterly report"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [{"object": "embedding", "index": 0, "embedding": [0.25, -0.5, 1.0]}],
                "model": "text-embedding-ada-002"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenAiEmbeddingProvider::new(HttpClient::new(), settings(server.uri()));
        let vector = provider.embed("Quarterly report").await.unwrap();

        assert_eq!(vector, vec![0.25, -0.5, 1.0]);
        assert_eq!(provider.model(), "text-embedding-ada-002");
    }

    #[tokio::test]
    async fn test_http_error_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let provider = OpenAiEmbeddingProvider::new(HttpClient::new(), settings(server.uri()));
        let err = provider.embed("text").await.unwrap_err();

        assert!(matches!(err, DomainError::Provider { ref message, .. } if message.contains("429")));
    }

    #[tokio::test]
    async fn test_empty_data_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;

        let provider = OpenAiEmbeddingProvider::new(HttpClient::new(), settings(server.uri()));
        assert!(matches!(
            provider.embed("text").await,
            Err(DomainError::Provider { .. })
        ));
    }
}
