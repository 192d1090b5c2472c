//! In-process task runner backed by tokio tasks

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::domain::{
    Agent, AgentError, AgentKind, AgentTask, TaskHandle, TaskOutcome, TaskRunner, TaskStatus,
};

/// Worker pool and retry settings
#[derive(Debug, Clone)]
pub struct TaskRunnerConfig {
    /// Maximum number of agent calls in flight at once
    pub max_concurrency: usize,

    /// Retries after the first failed attempt
    pub max_retries: u32,

    /// Fixed delay between attempts
    pub retry_delay: Duration,

    /// How long a task's status stays queryable after its last update
    pub status_ttl: Duration,

    /// Maximum number of task statuses kept
    pub status_capacity: u64,
}

impl Default for TaskRunnerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 16,
            max_retries: 3,
            retry_delay: Duration::from_secs(10),
            status_ttl: Duration::from_secs(3600),
            status_capacity: 10_000,
        }
    }
}

type StatusTable = Cache<Uuid, TaskStatus>;

/// Runs agent tasks on the tokio runtime with bounded concurrency and retry
#[derive(Debug)]
pub struct LocalTaskRunner {
    agents: HashMap<AgentKind, Arc<dyn Agent>>,
    permits: Arc<Semaphore>,
    statuses: StatusTable,
    config: TaskRunnerConfig,
}

impl LocalTaskRunner {
    pub fn new(config: TaskRunnerConfig) -> Self {
        Self {
            agents: HashMap::new(),
            permits: Arc::new(Semaphore::new(config.max_concurrency.max(1))),
            statuses: Cache::builder()
                .max_capacity(config.status_capacity)
                .time_to_live(config.status_ttl)
                .build(),
            config,
        }
    }

    /// Register the agent that handles its kind, replacing any previous one
    pub fn with_agent(mut self, agent: Arc<dyn Agent>) -> Self {
        self.agents.insert(agent.kind(), agent);
        self
    }

    pub fn config(&self) -> &TaskRunnerConfig {
        &self.config
    }
}

async fn set_status(statuses: &StatusTable, task_id: Uuid, status: TaskStatus) {
    statuses.insert(task_id, status).await;
}

async fn run_with_retries(
    agent: Arc<dyn Agent>,
    task: &AgentTask,
    permits: &Semaphore,
    statuses: &StatusTable,
    config: &TaskRunnerConfig,
) -> TaskOutcome {
    let mut attempt = 1;

    loop {
        let outcome = {
            let _permit = permits
                .acquire()
                .await
                .map_err(|_| AgentError::failure("Task runner is shutting down"))?;

            set_status(statuses, task.id(), TaskStatus::Running { attempt }).await;
            agent.run(task.tenant_id(), task.payload()).await
        };

        match outcome {
            Err(e) if e.is_retryable() && attempt <= config.max_retries => {
                warn!(
                    task_id = %task.id(),
                    tenant_id = %task.tenant_id(),
                    agent = %task.kind(),
                    attempt,
                    error = %e,
                    "Agent attempt failed, retrying"
                );
                attempt += 1;
                tokio::time::sleep(config.retry_delay).await;
            }
            other => return other,
        }
    }
}

#[async_trait]
impl TaskRunner for LocalTaskRunner {
    async fn submit(&self, task: AgentTask) -> Result<TaskHandle, AgentError> {
        let kind = task.kind();
        let agent = self
            .agents
            .get(&kind)
            .cloned()
            .ok_or_else(|| AgentError::failure(format!("No agent registered for '{}'", kind)))?;

        let (sender, handle) = TaskHandle::channel(&task);
        set_status(&self.statuses, task.id(), TaskStatus::Pending).await;

        let permits = self.permits.clone();
        let statuses = self.statuses.clone();
        let config = self.config.clone();

        tokio::spawn(async move {
            let outcome = run_with_retries(agent, &task, &permits, &statuses, &config).await;

            let status = match &outcome {
                Ok(result) => TaskStatus::Succeeded {
                    result: result.clone(),
                },
                Err(e) => {
                    error!(
                        task_id = %task.id(),
                        tenant_id = %task.tenant_id(),
                        agent = %task.kind(),
                        error = %e,
                        "Agent task failed"
                    );
                    TaskStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };
            set_status(&statuses, task.id(), status).await;

            if sender.send(outcome).is_err() {
                debug!(
                    task_id = %task.id(),
                    agent = %task.kind(),
                    "Caller stopped waiting, result discarded"
                );
            }
        });

        Ok(handle)
    }

    async fn status(&self, task_id: &Uuid) -> Option<TaskStatus> {
        self.statuses.get(task_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AgentPayload, EmailParams, TenantId};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

    /// Fails with `error` for the first `failures` calls, then echoes the payload kind
    #[derive(Debug)]
    struct FlakyAgent {
        kind: AgentKind,
        failures: u32,
        error: AgentError,
        calls: AtomicU32,
    }

    impl FlakyAgent {
        fn new(kind: AgentKind, failures: u32, error: AgentError) -> Self {
            Self {
                kind,
                failures,
                error,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Agent for FlakyAgent {
        fn kind(&self) -> AgentKind {
            self.kind
        }

        async fn run(&self, _tenant_id: &TenantId, _payload: &AgentPayload) -> TaskOutcome {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(self.error.clone())
            } else {
                Ok(json!(format!("{} ok", self.kind)))
            }
        }
    }

    /// Sleeps while tracking how many calls overlap
    #[derive(Debug, Default)]
    struct SlowAgent {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl Agent for SlowAgent {
        fn kind(&self) -> AgentKind {
            AgentKind::DocSum
        }

        async fn run(&self, _tenant_id: &TenantId, _payload: &AgentPayload) -> TaskOutcome {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Value::Null)
        }
    }

    fn config() -> TaskRunnerConfig {
        TaskRunnerConfig {
            max_concurrency: 4,
            max_retries: 3,
            retry_delay: Duration::from_millis(1),
            ..TaskRunnerConfig::default()
        }
    }

    fn email_task() -> AgentTask {
        AgentTask::new(
            TenantId::new("acme").unwrap(),
            AgentPayload::Email(EmailParams::new("x@y.com", "Hi", "Body")),
        )
    }

    fn doc_task() -> AgentTask {
        AgentTask::new(
            TenantId::new("acme").unwrap(),
            AgentPayload::DocSum {
                document_text: "text".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_submit_and_await() {
        let agent = Arc::new(FlakyAgent::new(AgentKind::Email, 0, AgentError::failure("x")));
        let runner = LocalTaskRunner::new(config()).with_agent(agent.clone());

        let task = email_task();
        let task_id = task.id();
        let handle = runner.submit(task).await.unwrap();
        let outcome = handle.await_result(Duration::from_secs(1)).await;

        assert_eq!(outcome, Ok(json!("email ok")));
        assert_eq!(agent.calls(), 1);
        assert_eq!(
            runner.status(&task_id).await,
            Some(TaskStatus::Succeeded {
                result: json!("email ok")
            })
        );
    }

    #[tokio::test]
    async fn test_retryable_failures_are_retried() {
        let agent = Arc::new(FlakyAgent::new(
            AgentKind::Email,
            2,
            AgentError::failure("SMTP 421"),
        ));
        let runner = LocalTaskRunner::new(config()).with_agent(agent.clone());

        let handle = runner.submit(email_task()).await.unwrap();
        let outcome = handle.await_result(Duration::from_secs(1)).await;

        assert!(outcome.is_ok());
        assert_eq!(agent.calls(), 3);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let agent = Arc::new(FlakyAgent::new(
            AgentKind::Email,
            u32::MAX,
            AgentError::failure("SMTP 421"),
        ));
        let runner = LocalTaskRunner::new(config()).with_agent(agent.clone());

        let task = email_task();
        let task_id = task.id();
        let handle = runner.submit(task).await.unwrap();
        let outcome = handle.await_result(Duration::from_secs(1)).await;

        assert_eq!(outcome, Err(AgentError::failure("SMTP 421")));
        assert_eq!(agent.calls(), 4);
        assert!(matches!(
            runner.status(&task_id).await,
            Some(TaskStatus::Failed { .. })
        ));
    }

    #[tokio::test]
    async fn test_not_configured_is_not_retried() {
        let agent = Arc::new(FlakyAgent::new(
            AgentKind::Email,
            u32::MAX,
            AgentError::not_configured(AgentKind::Email, "acme"),
        ));
        let runner = LocalTaskRunner::new(config()).with_agent(agent.clone());

        let handle = runner.submit(email_task()).await.unwrap();
        let outcome = handle.await_result(Duration::from_secs(1)).await;

        assert!(matches!(outcome, Err(AgentError::NotConfigured { .. })));
        assert_eq!(agent.calls(), 1);
    }

    #[tokio::test]
    async fn test_submit_without_registered_agent() {
        let runner = LocalTaskRunner::new(config());
        let err = runner.submit(email_task()).await.unwrap_err();
        assert!(matches!(err, AgentError::Failure { .. }));
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let agent = Arc::new(SlowAgent::default());
        let runner = LocalTaskRunner::new(TaskRunnerConfig {
            max_concurrency: 2,
            ..config()
        })
        .with_agent(agent.clone());

        let mut handles = Vec::new();
        for _ in 0..6 {
            handles.push(runner.submit(doc_task()).await.unwrap());
        }
        for handle in handles {
            assert!(handle.await_result(Duration::from_secs(2)).await.is_ok());
        }

        assert!(agent.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_result_after_timeout_is_discarded() {
        let agent = Arc::new(SlowAgent::default());
        let runner = LocalTaskRunner::new(config()).with_agent(agent);

        let task = doc_task();
        let task_id = task.id();
        let handle = runner.submit(task).await.unwrap();
        let outcome = handle.await_result(Duration::from_millis(1)).await;
        assert!(matches!(outcome, Err(AgentError::Timeout { .. })));

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(matches!(
            runner.status(&task_id).await,
            Some(TaskStatus::Succeeded { .. })
        ));
    }

    #[tokio::test]
    async fn test_statuses_expire() {
        let agent = Arc::new(FlakyAgent::new(AgentKind::Email, 0, AgentError::failure("x")));
        let runner = LocalTaskRunner::new(TaskRunnerConfig {
            status_ttl: Duration::from_millis(50),
            ..config()
        })
        .with_agent(agent);

        let task = email_task();
        let task_id = task.id();
        let handle = runner.submit(task).await.unwrap();
        assert!(handle.await_result(Duration::from_secs(1)).await.is_ok());
        assert!(runner.status(&task_id).await.is_some());

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(runner.status(&task_id).await, None);
    }

    #[tokio::test]
    async fn test_status_table_is_bounded() {
        let agent = Arc::new(FlakyAgent::new(AgentKind::Email, 0, AgentError::failure("x")));
        let runner = LocalTaskRunner::new(TaskRunnerConfig {
            status_capacity: 5,
            ..config()
        })
        .with_agent(agent);

        for _ in 0..50 {
            let handle = runner.submit(email_task()).await.unwrap();
            assert!(handle.await_result(Duration::from_secs(1)).await.is_ok());
        }

        runner.statuses.run_pending_tasks().await;
        assert!(runner.statuses.entry_count() <= 5);
    }

    #[tokio::test]
    async fn test_unknown_task_status() {
        let runner = LocalTaskRunner::new(config());
        assert_eq!(runner.status(&Uuid::new_v4()).await, None);
    }
}
