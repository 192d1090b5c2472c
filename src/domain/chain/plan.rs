//! Execution plan built from a chain definition before any agent runs

use std::time::Duration;

use super::condition::Condition;
use super::entity::ChainDefinition;
use super::error::ChainError;
use crate::domain::agent::AgentKind;

/// A step resolved and ready to execute
#[derive(Debug, Clone)]
pub struct PlannedStep {
    /// Position in execution order
    pub index: usize,
    pub step_order: i32,
    pub agent: AgentKind,
    pub condition: Option<Condition>,
    pub timeout: Option<Duration>,
}

/// Ordered steps with agent kinds resolved and conditions parsed
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan {
    steps: Vec<PlannedStep>,
}

impl ExecutionPlan {
    /// Resolve every step of `chain`, failing on the first unknown agent or
    /// malformed condition in execution order
    pub fn build(chain: &ChainDefinition) -> Result<Self, ChainError> {
        let steps = chain
            .ordered_steps()
            .into_iter()
            .enumerate()
            .map(|(index, step)| -> Result<PlannedStep, ChainError> {
                let agent = step.agent_name.parse::<AgentKind>().map_err(|_| {
                    ChainError::UnknownAgentKind {
                        step: index,
                        agent_name: step.agent_name.clone(),
                    }
                })?;

                let condition = step
                    .condition()
                    .map(Condition::parse)
                    .transpose()
                    .map_err(|e| ChainError::invalid_condition(index, agent, &e))?;

                Ok(PlannedStep {
                    index,
                    step_order: step.step_order,
                    agent,
                    condition,
                    timeout: step.timeout_ms.map(Duration::from_millis),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[PlannedStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chain::{ChainId, StepDefinition};
    use crate::domain::tenant::TenantId;

    fn chain(steps: Vec<StepDefinition>) -> ChainDefinition {
        ChainDefinition::new(
            TenantId::new("acme").unwrap(),
            ChainId::new("c1").unwrap(),
            "Chain",
        )
        .with_steps(steps)
    }

    #[test]
    fn test_build_orders_and_resolves_steps() {
        let plan = ExecutionPlan::build(&chain(vec![
            StepDefinition::new(20, "email").with_timeout_ms(500),
            StepDefinition::new(10, "doc_sum"),
            StepDefinition::new(15, "sfdc").with_condition("summary is present"),
        ]))
        .unwrap();

        let agents: Vec<AgentKind> = plan.steps().iter().map(|s| s.agent).collect();
        assert_eq!(agents, vec![AgentKind::DocSum, AgentKind::Sfdc, AgentKind::Email]);
        assert_eq!(plan.steps()[2].index, 2);
        assert_eq!(plan.steps()[2].timeout, Some(Duration::from_millis(500)));
        assert!(plan.steps()[1].condition.is_some());
        assert!(plan.steps()[0].condition.is_none());
    }

    #[test]
    fn test_unknown_agent_reports_execution_index() {
        let err = ExecutionPlan::build(&chain(vec![
            StepDefinition::new(2, "slack"),
            StepDefinition::new(1, "doc_sum"),
        ]))
        .unwrap_err();

        assert_eq!(
            err,
            ChainError::UnknownAgentKind {
                step: 1,
                agent_name: "slack".to_string()
            }
        );
    }

    #[test]
    fn test_malformed_condition_is_rejected() {
        let err = ExecutionPlan::build(&chain(vec![
            StepDefinition::new(1, "email").with_condition("summary ==")
        ]))
        .unwrap_err();

        assert!(matches!(
            err,
            ChainError::InvalidCondition {
                step: 0,
                agent: AgentKind::Email,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_chain() {
        let plan = ExecutionPlan::build(&chain(Vec::new())).unwrap();
        assert!(plan.is_empty());
    }
}
