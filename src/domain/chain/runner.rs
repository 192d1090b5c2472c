//! Chain runner contract and run report types

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use super::entity::ChainId;
use super::error::ChainError;
use crate::domain::agent::AgentKind;
use crate::domain::tenant::TenantId;

/// Agent outputs keyed by agent name, in execution order
pub type ResultMap = IndexMap<String, Value>;

/// Report for one visited step
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StepExecutionResult {
    pub step: usize,
    pub step_order: i32,
    pub agent: AgentKind,
    pub skipped: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,

    pub execution_time_ms: u64,
}

impl StepExecutionResult {
    pub fn executed(
        step: usize,
        step_order: i32,
        agent: AgentKind,
        output: Value,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            step,
            step_order,
            agent,
            skipped: false,
            output: Some(output),
            execution_time_ms,
        }
    }

    pub fn skipped(step: usize, step_order: i32, agent: AgentKind) -> Self {
        Self {
            step,
            step_order,
            agent,
            skipped: true,
            output: None,
            execution_time_ms: 0,
        }
    }
}

/// Outcome of a completed chain run
#[derive(Debug, Clone, Serialize)]
pub struct ChainRunResult {
    pub tenant_id: TenantId,
    pub chain_id: ChainId,
    pub result: ResultMap,
    pub steps: Vec<StepExecutionResult>,
    pub execution_time_ms: u64,
}

impl ChainRunResult {
    /// Agent names in the order they executed
    pub fn executed_agents(&self) -> Vec<&str> {
        self.result.keys().map(String::as_str).collect()
    }
}

/// Entry point for running a stored chain
#[async_trait]
pub trait ChainRunner: Send + Sync + std::fmt::Debug {
    async fn run_chain(
        &self,
        tenant_id: &TenantId,
        chain_id: &ChainId,
        input: Map<String, Value>,
    ) -> Result<ChainRunResult, ChainError>;
}
