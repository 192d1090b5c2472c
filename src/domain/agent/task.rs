//! Task runner contract
//!
//! Agent work is submitted to a [`TaskRunner`] and awaited through a
//! [`TaskHandle`]. Submission never blocks on the agent; the only suspension
//! point is [`TaskHandle::await_result`], which is always bounded by a deadline.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::oneshot;
use uuid::Uuid;

use super::error::AgentError;
use super::kind::AgentKind;
use super::payload::AgentPayload;
use crate::domain::tenant::TenantId;

/// Outcome delivered by the task runner for one task
pub type TaskOutcome = Result<Value, AgentError>;

/// One unit of agent work
#[derive(Debug, Clone)]
pub struct AgentTask {
    id: Uuid,
    tenant_id: TenantId,
    payload: AgentPayload,
}

impl AgentTask {
    pub fn new(tenant_id: TenantId, payload: AgentPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            payload,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn payload(&self) -> &AgentPayload {
        &self.payload
    }

    pub fn kind(&self) -> AgentKind {
        self.payload.kind()
    }
}

/// Lifecycle of a submitted task as seen by the task runner
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running { attempt: u32 },
    Succeeded { result: Value },
    Failed { error: String },
}

impl TaskStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }
}

/// Receiving end of a submitted task
#[derive(Debug)]
pub struct TaskHandle {
    task_id: Uuid,
    agent: AgentKind,
    receiver: oneshot::Receiver<TaskOutcome>,
}

impl TaskHandle {
    /// Create a handle for `task` and the sender the runner completes it with
    pub fn channel(task: &AgentTask) -> (oneshot::Sender<TaskOutcome>, Self) {
        let (sender, receiver) = oneshot::channel();
        let handle = Self {
            task_id: task.id(),
            agent: task.kind(),
            receiver,
        };
        (sender, handle)
    }

    pub fn task_id(&self) -> Uuid {
        self.task_id
    }

    pub fn agent(&self) -> AgentKind {
        self.agent
    }

    /// Wait for the task's outcome for at most `timeout`.
    ///
    /// On timeout the handle is consumed and the task is left running; its
    /// eventual result is discarded by the runner.
    pub async fn await_result(self, timeout: Duration) -> TaskOutcome {
        match tokio::time::timeout(timeout, self.receiver).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(AgentError::failure(format!(
                "Task {} for {} was dropped before it completed",
                self.task_id, self.agent
            ))),
            Err(_) => Err(AgentError::timeout(timeout)),
        }
    }
}

/// Executes agent tasks out of band
#[async_trait]
pub trait TaskRunner: Send + Sync + std::fmt::Debug {
    /// Queue a task and return immediately with its handle
    async fn submit(&self, task: AgentTask) -> Result<TaskHandle, AgentError>;

    /// Current status of a task, if the runner knows it
    async fn status(&self, task_id: &Uuid) -> Option<TaskStatus>;
}

/// A concrete agent executed by the task runner
#[async_trait]
pub trait Agent: Send + Sync + std::fmt::Debug {
    fn kind(&self) -> AgentKind;

    async fn run(&self, tenant_id: &TenantId, payload: &AgentPayload) -> TaskOutcome;
}
