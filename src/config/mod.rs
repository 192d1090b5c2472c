//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, EmailConfig, EmbeddingsConfig, LogFormat, LoggingConfig, RunnerConfig,
    ServerConfig, StorageConfig, SummarizerConfig, TaskRunnerSettings,
};
