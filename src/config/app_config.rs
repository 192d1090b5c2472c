use std::time::Duration;

use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub runner: RunnerConfig,
    pub task_runner: TaskRunnerSettings,
    pub summarizer: SummarizerConfig,
    pub embeddings: EmbeddingsConfig,
    pub email: EmailConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Chain runner settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Default wait for each step's agent
    pub step_timeout_secs: u64,
}

/// Worker pool and retry settings of the in-process task runner
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TaskRunnerSettings {
    pub max_concurrency: usize,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    /// Retention of task statuses after their last update
    pub status_ttl_secs: u64,
    pub status_capacity: u64,
}

/// OpenAI-compatible summarizer used by the doc_sum agent
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// OpenAI-compatible embeddings endpoint used for document search
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingsConfig {
    pub base_url: String,
    /// Falls back to the summarizer key when empty
    pub api_key: String,
    pub model: String,
}

impl EmbeddingsConfig {
    pub fn api_key_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.api_key.trim().is_empty() {
            fallback
        } else {
            &self.api_key
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// Sender used when a tenant's email config has no from_address
    pub from_address: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// TOML file with tenants and chains loaded at start-up
    pub seed_file: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            step_timeout_secs: 60,
        }
    }
}

impl RunnerConfig {
    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs)
    }
}

impl Default for TaskRunnerSettings {
    fn default() -> Self {
        Self {
            max_concurrency: 16,
            max_retries: 3,
            retry_delay_ms: 10_000,
            status_ttl_secs: 3600,
            status_capacity: 10_000,
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 150,
            temperature: 0.5,
        }
    }
}

impl std::fmt::Debug for SummarizerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummarizerConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: "text-embedding-ada-002".to_string(),
        }
    }
}

impl std::fmt::Debug for EmbeddingsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingsConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            from_address: None,
            timeout_secs: 10,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.runner.step_timeout(), Duration::from_secs(60));
        assert_eq!(config.task_runner.max_concurrency, 16);
        assert_eq!(config.task_runner.max_retries, 3);
        assert_eq!(config.task_runner.retry_delay_ms, 10_000);
        assert_eq!(config.task_runner.status_ttl_secs, 3600);
        assert_eq!(config.task_runner.status_capacity, 10_000);
        assert_eq!(config.summarizer.max_tokens, 150);
        assert!(config.storage.seed_file.is_none());
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                "[runner]\nstep_timeout_secs = 5\n\n[logging]\nformat = \"json\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.runner.step_timeout_secs, 5);
        assert!(matches!(config.logging.format, LogFormat::Json));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = SummarizerConfig {
            api_key: "sk-live-123".to_string(),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("sk-live-123"));

        let embeddings = EmbeddingsConfig {
            api_key: "sk-embed-456".to_string(),
            ..Default::default()
        };
        assert!(!format!("{:?}", embeddings).contains("sk-embed-456"));
    }

    #[test]
    fn test_embeddings_key_falls_back() {
        let config = EmbeddingsConfig::default();
        assert_eq!(config.model, "text-embedding-ada-002");
        assert_eq!(config.api_key_or("sk-summarizer"), "sk-summarizer");

        let config = EmbeddingsConfig {
            api_key: "sk-embed".to_string(),
            ..Default::default()
        };
        assert_eq!(config.api_key_or("sk-summarizer"), "sk-embed");
    }
}
