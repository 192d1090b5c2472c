//! Per-tenant agent configuration
//!
//! Each tenant has at most one active configuration per agent kind. An absent
//! configuration means the agent is not configured for that tenant.

use std::fmt;

use serde::{Deserialize, Serialize};

/// SMTP settings used by the email agent
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailAgentConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,

    /// Sender address; the SMTP username is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,
}

impl EmailAgentConfig {
    pub fn sender(&self) -> &str {
        self.from_address.as_deref().unwrap_or(&self.smtp_username)
    }
}

impl fmt::Debug for EmailAgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailAgentConfig")
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"<redacted>")
            .field("from_address", &self.from_address)
            .finish()
    }
}

/// CRM connection used by the lead creation agent
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct SfdcConfig {
    pub instance_url: String,
    pub access_token: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,
}

fn default_api_version() -> String {
    "v59.0".to_string()
}

impl SfdcConfig {
    pub fn new(instance_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            instance_url: instance_url.into(),
            access_token: access_token.into(),
            api_version: default_api_version(),
        }
    }

    /// REST endpoint for creating Lead records
    pub fn lead_endpoint(&self) -> String {
        format!(
            "{}/services/data/{}/sobjects/Lead/",
            self.instance_url.trim_end_matches('/'),
            self.api_version
        )
    }
}

impl fmt::Debug for SfdcConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SfdcConfig")
            .field("instance_url", &self.instance_url)
            .field("access_token", &"<redacted>")
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Summarizer settings; `summarizer_setting` names the model to use
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocSumConfig {
    pub summarizer_setting: String,
}
