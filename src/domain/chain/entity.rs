//! Chain definition entity

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::identifier::validate_identifier;
use crate::domain::tenant::TenantId;

/// Chain identifier, unique within a tenant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChainId(String);

impl ChainId {
    /// Create a new ChainId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        validate_identifier("Chain", &id)?;
        Ok(Self(id))
    }

    /// Generate a random chain id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ChainId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChainId> for String {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One step of a chain.
///
/// `agent_name` is kept as authored so a stored chain naming an unknown agent
/// fails the run with a typed error instead of failing to load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub step_order: i32,
    pub agent_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    /// Overrides the default agent wait for this step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl StepDefinition {
    pub fn new(step_order: i32, agent_name: impl Into<String>) -> Self {
        Self {
            step_order,
            agent_name: agent_name.into(),
            condition: None,
            timeout_ms: None,
        }
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// The condition text, treating a blank condition as none
    pub fn condition(&self) -> Option<&str> {
        self.condition
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// A tenant-scoped ordered sequence of agent steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainDefinition {
    tenant_id: TenantId,
    id: ChainId,
    name: String,
    steps: Vec<StepDefinition>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ChainDefinition {
    pub fn new(tenant_id: TenantId, id: ChainId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            tenant_id,
            id,
            name: name.into(),
            steps: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_steps(mut self, steps: Vec<StepDefinition>) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_step(mut self, step: StepDefinition) -> Self {
        self.steps.push(step);
        self
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn id(&self) -> &ChainId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Steps in storage order
    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    /// Steps sorted by `step_order`; equal orders keep their storage order
    pub fn ordered_steps(&self) -> Vec<&StepDefinition> {
        let mut steps: Vec<&StepDefinition> = self.steps.iter().collect();
        steps.sort_by_key(|s| s.step_order);
        steps
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Step orders used by more than one step
    pub fn duplicate_step_orders(&self) -> Vec<i32> {
        let mut orders: Vec<i32> = self.steps.iter().map(|s| s.step_order).collect();
        orders.sort_unstable();
        let mut duplicates: Vec<i32> = orders
            .windows(2)
            .filter(|w| w[0] == w[1])
            .map(|w| w[0])
            .collect();
        duplicates.dedup();
        duplicates
    }
}
