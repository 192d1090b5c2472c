//! Chain runner implementation

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::domain::chain::{evaluate, ResultMap};
use crate::domain::{
    AgentInvoker, ChainError, ChainId, ChainRepository, ChainRunResult, ChainRunner,
    ExecutionContext, ExecutionPlan, StepExecutionResult, TenantId,
};

/// Runs stored chains step by step through the agent invoker
#[derive(Debug, Clone)]
pub struct ChainRunnerImpl {
    chains: Arc<dyn ChainRepository>,
    invoker: AgentInvoker,
}

impl ChainRunnerImpl {
    pub fn new(chains: Arc<dyn ChainRepository>, invoker: AgentInvoker) -> Self {
        Self { chains, invoker }
    }

    async fn execute(
        &self,
        tenant_id: &TenantId,
        chain_id: &ChainId,
        input: Map<String, Value>,
    ) -> Result<ChainRunResult, ChainError> {
        let start = Instant::now();

        let chain = self
            .chains
            .get(tenant_id, chain_id)
            .await?
            .ok_or_else(|| ChainError::chain_not_found(tenant_id, chain_id))?;

        let plan = ExecutionPlan::build(&chain)?;

        info!(
            tenant_id = %tenant_id,
            chain_id = %chain_id,
            steps = plan.len(),
            "Running chain"
        );

        let mut context = ExecutionContext::new(input);
        let mut result = ResultMap::new();
        let mut steps = Vec::with_capacity(plan.len());

        for step in plan.steps() {
            let should_run = evaluate(step.condition.as_ref(), &context)
                .map_err(|e| ChainError::invalid_condition(step.index, step.agent, &e))?;

            if !should_run {
                debug!(
                    chain_id = %chain_id,
                    step = step.index,
                    agent = %step.agent,
                    "Condition not met, skipping step"
                );
                steps.push(StepExecutionResult::skipped(
                    step.index,
                    step.step_order,
                    step.agent,
                ));
                continue;
            }

            let step_start = Instant::now();
            debug!(
                chain_id = %chain_id,
                step = step.index,
                agent = %step.agent,
                "Executing step"
            );

            let payload = self
                .invoker
                .prepare(step.agent, &mut context)
                .map_err(|e| ChainError::from_agent(step.index, step.agent, e))?;

            let output = self
                .invoker
                .invoke(tenant_id, payload, step.timeout)
                .await
                .map_err(|e| ChainError::from_agent(step.index, step.agent, e))?;

            context.merge_output(step.agent, &output);
            result.insert(step.agent.to_string(), output.clone());
            steps.push(StepExecutionResult::executed(
                step.index,
                step.step_order,
                step.agent,
                output,
                step_start.elapsed().as_millis() as u64,
            ));
        }

        let execution_time_ms = start.elapsed().as_millis() as u64;
        info!(
            tenant_id = %tenant_id,
            chain_id = %chain_id,
            executed = result.len(),
            execution_time_ms,
            "Chain completed"
        );

        Ok(ChainRunResult {
            tenant_id: tenant_id.clone(),
            chain_id: chain_id.clone(),
            result,
            steps,
            execution_time_ms,
        })
    }
}

#[async_trait]
impl ChainRunner for ChainRunnerImpl {
    async fn run_chain(
        &self,
        tenant_id: &TenantId,
        chain_id: &ChainId,
        input: Map<String, Value>,
    ) -> Result<ChainRunResult, ChainError> {
        let outcome = self.execute(tenant_id, chain_id, input).await;

        if let Err(e) = &outcome {
            warn!(
                tenant_id = %tenant_id,
                chain_id = %chain_id,
                code = e.code(),
                step = ?e.step(),
                error = %e,
                "Chain aborted"
            );
        }

        outcome
    }
}
