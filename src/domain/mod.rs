//! Domain layer - Core business logic and entities

pub mod agent;
pub mod chain;
pub mod document;
pub mod error;
pub mod identifier;
pub mod tenant;

pub use agent::{
    Agent, AgentError, AgentInvoker, AgentKind, AgentPayload, AgentTask, EmailParams, TaskHandle,
    TaskOutcome, TaskRunner, TaskStatus,
};
pub use chain::{
    ChainDefinition, ChainError, ChainId, ChainRepository, ChainRunResult, ChainRunner,
    Condition, ConditionError, ExecutionContext, ExecutionPlan, StepDefinition,
    StepExecutionResult,
};
pub use document::{DocumentIndex, EmbeddingProvider, IndexedDocument, SearchHit};
pub use error::DomainError;
pub use identifier::validate_identifier;
pub use tenant::{
    DocSumConfig, EmailAgentConfig, SfdcConfig, Tenant, TenantConfigRepository, TenantId,
};
