//! Agent error types

use std::time::Duration;

use thiserror::Error;

use super::kind::AgentKind;

/// The single outcome an agent invocation can fail with
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AgentError {
    #[error("Missing or invalid input '{key}'")]
    InvalidInput { key: String },

    #[error("No result within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("{agent} is not configured for tenant '{tenant_id}'")]
    NotConfigured { agent: AgentKind, tenant_id: String },

    #[error("{reason}")]
    Failure { reason: String },
}

impl AgentError {
    pub fn invalid_input(key: impl Into<String>) -> Self {
        Self::InvalidInput { key: key.into() }
    }

    pub fn timeout(timeout: Duration) -> Self {
        Self::Timeout {
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    pub fn not_configured(agent: AgentKind, tenant_id: impl Into<String>) -> Self {
        Self::NotConfigured {
            agent,
            tenant_id: tenant_id.into(),
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }

    /// Whether the task runner may retry the attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            AgentError::invalid_input("email_params").to_string(),
            "Missing or invalid input 'email_params'"
        );
        assert_eq!(
            AgentError::timeout(Duration::from_secs(60)).to_string(),
            "No result within 60000ms"
        );
        assert_eq!(
            AgentError::not_configured(AgentKind::Email, "acme").to_string(),
            "email is not configured for tenant 'acme'"
        );
    }

    #[test]
    fn test_only_failures_are_retryable() {
        assert!(AgentError::failure("HTTP 503").is_retryable());
        assert!(!AgentError::invalid_input("lead_data").is_retryable());
        assert!(!AgentError::timeout(Duration::from_millis(5)).is_retryable());
        assert!(!AgentError::not_configured(AgentKind::Sfdc, "acme").is_retryable());
    }
}
