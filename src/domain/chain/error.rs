//! Chain run errors

use thiserror::Error;

use super::condition::ConditionError;
use super::entity::ChainId;
use crate::domain::agent::{AgentError, AgentKind};
use crate::domain::tenant::TenantId;
use crate::domain::DomainError;

/// Terminal failure of a chain run.
///
/// `step` is the zero-based position of the step in execution order.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChainError {
    #[error("Chain '{chain_id}' not found for tenant '{tenant_id}'")]
    ChainNotFound { tenant_id: TenantId, chain_id: ChainId },

    #[error("Step {step} ({agent}): invalid condition: {message}")]
    InvalidCondition {
        step: usize,
        agent: AgentKind,
        message: String,
    },

    #[error("Step {step} ({agent}): missing required input '{key}'")]
    MissingInput {
        step: usize,
        agent: AgentKind,
        key: String,
    },

    #[error("Step {step} ({agent}): no result within {timeout_ms}ms")]
    AgentTimeout {
        step: usize,
        agent: AgentKind,
        timeout_ms: u64,
    },

    #[error("Step {step} ({agent}) failed: {reason}")]
    AgentFailure {
        step: usize,
        agent: AgentKind,
        reason: String,
    },

    #[error("Step {step}: unknown agent '{agent_name}'")]
    UnknownAgentKind { step: usize, agent_name: String },

    #[error("Store error: {0}")]
    Store(String),
}

impl ChainError {
    pub fn chain_not_found(tenant_id: &TenantId, chain_id: &ChainId) -> Self {
        Self::ChainNotFound {
            tenant_id: tenant_id.clone(),
            chain_id: chain_id.clone(),
        }
    }

    pub fn invalid_condition(step: usize, agent: AgentKind, error: &ConditionError) -> Self {
        Self::InvalidCondition {
            step,
            agent,
            message: error.to_string(),
        }
    }

    /// Attribute an agent error to the step that produced it
    pub fn from_agent(step: usize, agent: AgentKind, error: AgentError) -> Self {
        match error {
            AgentError::InvalidInput { key } => Self::MissingInput { step, agent, key },
            AgentError::Timeout { timeout_ms } => Self::AgentTimeout {
                step,
                agent,
                timeout_ms,
            },
            other @ (AgentError::NotConfigured { .. } | AgentError::Failure { .. }) => {
                Self::AgentFailure {
                    step,
                    agent,
                    reason: other.to_string(),
                }
            }
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::ChainNotFound { .. } => "chain_not_found",
            Self::InvalidCondition { .. } => "invalid_condition",
            Self::MissingInput { .. } => "missing_input",
            Self::AgentTimeout { .. } => "agent_timeout",
            Self::AgentFailure { .. } => "agent_failure",
            Self::UnknownAgentKind { .. } => "unknown_agent_kind",
            Self::Store(_) => "store_error",
        }
    }

    /// Index of the failing step, if the failure is attributed to one
    pub fn step(&self) -> Option<usize> {
        match self {
            Self::InvalidCondition { step, .. }
            | Self::MissingInput { step, .. }
            | Self::AgentTimeout { step, .. }
            | Self::AgentFailure { step, .. }
            | Self::UnknownAgentKind { step, .. } => Some(*step),
            Self::ChainNotFound { .. } | Self::Store(_) => None,
        }
    }

    /// Agent name of the failing step, if any
    pub fn agent(&self) -> Option<String> {
        match self {
            Self::InvalidCondition { agent, .. }
            | Self::MissingInput { agent, .. }
            | Self::AgentTimeout { agent, .. }
            | Self::AgentFailure { agent, .. } => Some(agent.to_string()),
            Self::UnknownAgentKind { agent_name, .. } => Some(agent_name.clone()),
            Self::ChainNotFound { .. } | Self::Store(_) => None,
        }
    }
}

impl From<DomainError> for ChainError {
    fn from(error: DomainError) -> Self {
        Self::Store(error.to_string())
    }
}
