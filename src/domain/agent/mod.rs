//! Agent domain - agent kinds, payloads, the task runner contract and the invoker

mod error;
mod invoker;
mod kind;
mod payload;
mod task;

pub use error::AgentError;
pub use invoker::{AgentInvoker, DEFAULT_AGENT_TIMEOUT};
pub use kind::{AgentKind, UnknownAgentName};
pub use payload::{AgentPayload, EmailParams};
pub use task::{Agent, AgentTask, TaskHandle, TaskOutcome, TaskRunner, TaskStatus};

#[cfg(test)]
pub use task::mock;
