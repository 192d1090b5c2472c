//! Chain domain - chain definitions, conditions, execution context and the runner contract

mod condition;
mod context;
mod entity;
mod error;
mod plan;
mod repository;
mod runner;

pub use condition::{evaluate, Condition, ConditionError, CONTEXT_BINDING};
pub use context::{is_blank, ExecutionContext};
pub use entity::{ChainDefinition, ChainId, StepDefinition};
pub use error::ChainError;
pub use plan::{ExecutionPlan, PlannedStep};
pub use repository::ChainRepository;
pub use runner::{ChainRunResult, ChainRunner, ResultMap, StepExecutionResult};

#[cfg(test)]
pub use repository::mock;
