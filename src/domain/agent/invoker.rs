//! Agent invoker - submits agent work to the task runner and waits for it

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use super::error::AgentError;
use super::kind::AgentKind;
use super::payload::{AgentPayload, EmailParams};
use super::task::{AgentTask, TaskOutcome, TaskRunner};
use crate::domain::chain::ExecutionContext;
use crate::domain::tenant::TenantId;

/// Default time a step waits for its agent
pub const DEFAULT_AGENT_TIMEOUT: Duration = Duration::from_secs(60);

/// Uniform entry point for running agents through the task runner
#[derive(Debug, Clone)]
pub struct AgentInvoker {
    task_runner: Arc<dyn TaskRunner>,
    default_timeout: Duration,
}

impl AgentInvoker {
    pub fn new(task_runner: Arc<dyn TaskRunner>) -> Self {
        Self {
            task_runner,
            default_timeout: DEFAULT_AGENT_TIMEOUT,
        }
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn task_runner(&self) -> &Arc<dyn TaskRunner> {
        &self.task_runner
    }

    /// Build the payload for `kind` from the execution context.
    ///
    /// For `sfdc`, a `summary` produced earlier in the run is copied into
    /// `lead_data.Description`, both in the context and in the payload.
    pub fn prepare(
        &self,
        kind: AgentKind,
        context: &mut ExecutionContext,
    ) -> Result<AgentPayload, AgentError> {
        match kind {
            AgentKind::DocSum => {
                let document_text = context
                    .non_blank("document_text")
                    .and_then(Value::as_str)
                    .ok_or_else(|| AgentError::invalid_input("document_text"))?;

                Ok(AgentPayload::DocSum {
                    document_text: document_text.to_string(),
                })
            }
            AgentKind::Sfdc => {
                if context
                    .non_blank("lead_data")
                    .and_then(Value::as_object)
                    .is_none()
                {
                    return Err(AgentError::invalid_input("lead_data"));
                }

                let summary = context.get("summary").filter(|v| !v.is_null()).cloned();
                let lead_data = context
                    .get_mut("lead_data")
                    .and_then(Value::as_object_mut)
                    .ok_or_else(|| AgentError::invalid_input("lead_data"))?;

                if let Some(summary) = summary {
                    lead_data.insert("Description".to_string(), summary);
                }

                Ok(AgentPayload::Sfdc {
                    lead_data: lead_data.clone(),
                })
            }
            AgentKind::Email => {
                let params = context
                    .non_blank("email_params")
                    .filter(|v| v.is_object())
                    .ok_or_else(|| AgentError::invalid_input("email_params"))?;

                let params: EmailParams = serde_json::from_value(params.clone())
                    .map_err(|_| AgentError::invalid_input("email_params"))?;

                if !params.has_valid_recipient() {
                    return Err(AgentError::invalid_input("email_params.recipient"));
                }

                Ok(AgentPayload::Email(params))
            }
        }
    }

    pub async fn summarize_document(
        &self,
        tenant_id: &TenantId,
        document_text: impl Into<String>,
        timeout: Option<Duration>,
    ) -> TaskOutcome {
        let payload = AgentPayload::DocSum {
            document_text: document_text.into(),
        };
        self.invoke(tenant_id, payload, timeout).await
    }

    pub async fn create_lead(
        &self,
        tenant_id: &TenantId,
        lead_data: Map<String, Value>,
        timeout: Option<Duration>,
    ) -> TaskOutcome {
        self.invoke(tenant_id, AgentPayload::Sfdc { lead_data }, timeout)
            .await
    }

    pub async fn send_email(
        &self,
        tenant_id: &TenantId,
        params: EmailParams,
        timeout: Option<Duration>,
    ) -> TaskOutcome {
        self.invoke(tenant_id, AgentPayload::Email(params), timeout)
            .await
    }

    /// Submit the payload and wait for its result, bounded by `timeout`
    /// (or the invoker's default)
    pub async fn invoke(
        &self,
        tenant_id: &TenantId,
        payload: AgentPayload,
        timeout: Option<Duration>,
    ) -> TaskOutcome {
        payload.validate()?;

        let timeout = timeout.unwrap_or(self.default_timeout);
        let agent = payload.kind();
        let handle = self
            .task_runner
            .submit(AgentTask::new(tenant_id.clone(), payload))
            .await?;
        let task_id = handle.task_id();

        debug!(
            tenant_id = %tenant_id,
            agent = %agent,
            task_id = %task_id,
            timeout_ms = timeout.as_millis() as u64,
            "Waiting for agent result"
        );

        let outcome = handle.await_result(timeout).await;
        if let Err(e) = &outcome {
            warn!(
                tenant_id = %tenant_id,
                agent = %agent,
                task_id = %task_id,
                error = %e,
                "Agent invocation failed"
            );
        }

        outcome
    }

    /// Submit the payload without waiting; the outcome is tracked by the
    /// task runner under the returned id
    pub async fn dispatch(
        &self,
        tenant_id: &TenantId,
        payload: AgentPayload,
    ) -> Result<Uuid, AgentError> {
        payload.validate()?;

        let agent = payload.kind();
        let handle = self
            .task_runner
            .submit(AgentTask::new(tenant_id.clone(), payload))
            .await?;

        debug!(
            tenant_id = %tenant_id,
            agent = %agent,
            task_id = %handle.task_id(),
            "Dispatched agent task"
        );

        Ok(handle.task_id())
    }
}
