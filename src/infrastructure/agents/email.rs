//! SMTP email agent

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde_json::json;
use tracing::{debug, info};

use crate::domain::{
    Agent, AgentError, AgentKind, AgentPayload, EmailAgentConfig, EmailParams, TaskOutcome,
    TenantConfigRepository, TenantId,
};

/// Delivers a built message through a tenant's SMTP server
#[async_trait]
pub trait MailSender: Send + Sync + std::fmt::Debug {
    async fn send(&self, config: &EmailAgentConfig, message: Message) -> Result<(), AgentError>;
}

/// STARTTLS SMTP delivery; a transport is built per message from the tenant's settings
#[derive(Debug, Clone)]
pub struct SmtpMailSender {
    timeout: Duration,
}

impl SmtpMailSender {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl MailSender for SmtpMailSender {
    async fn send(&self, config: &EmailAgentConfig, message: Message) -> Result<(), AgentError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.clone(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_server)
            .map_err(|e| AgentError::failure(format!("Invalid SMTP server: {}", e)))?
            .port(config.smtp_port)
            .credentials(credentials)
            .timeout(Some(self.timeout))
            .build();

        transport
            .send(message)
            .await
            .map_err(|e| AgentError::failure(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

/// `email` agent
#[derive(Debug)]
pub struct EmailAgent<M: MailSender> {
    sender: M,
    tenants: Arc<dyn TenantConfigRepository>,
    default_from: Option<String>,
}

impl<M: MailSender> EmailAgent<M> {
    pub fn new(sender: M, tenants: Arc<dyn TenantConfigRepository>) -> Self {
        Self {
            sender,
            tenants,
            default_from: None,
        }
    }

    /// Sender used when the tenant config has no `from_address`
    pub fn with_default_from(mut self, from: Option<String>) -> Self {
        self.default_from = from;
        self
    }

    fn build_message(
        &self,
        config: &EmailAgentConfig,
        params: &EmailParams,
    ) -> Result<Message, AgentError> {
        let from_text = config
            .from_address
            .as_deref()
            .or(self.default_from.as_deref())
            .unwrap_or(&config.smtp_username);

        let from = from_text
            .parse::<Mailbox>()
            .map_err(|e| AgentError::failure(format!("Invalid sender '{}': {}", from_text, e)))?;
        let to = params
            .recipient
            .parse::<Mailbox>()
            .map_err(|e| {
                AgentError::failure(format!("Invalid recipient '{}': {}", params.recipient, e))
            })?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(params.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(params.body.clone())
            .map_err(|e| AgentError::failure(format!("Failed to build email: {}", e)))
    }

    async fn send_email(&self, tenant_id: &TenantId, params: &EmailParams) -> TaskOutcome {
        let config = self
            .tenants
            .email_config(tenant_id)
            .await
            .map_err(|e| AgentError::failure(e.to_string()))?
            .ok_or_else(|| AgentError::not_configured(AgentKind::Email, tenant_id.as_str()))?;

        let message = self.build_message(&config, params)?;
        debug!(
            tenant_id = %tenant_id,
            smtp_server = %config.smtp_server,
            "Sending email"
        );

        self.sender.send(&config, message).await?;
        info!(tenant_id = %tenant_id, "Email sent");

        Ok(json!("Email sent successfully"))
    }
}

#[async_trait]
impl<M: MailSender> Agent for EmailAgent<M> {
    fn kind(&self) -> AgentKind {
        AgentKind::Email
    }

    async fn run(&self, tenant_id: &TenantId, payload: &AgentPayload) -> TaskOutcome {
        match payload {
            AgentPayload::Email(params) => self.send_email(tenant_id, params).await,
            other => Err(AgentError::failure(format!(
                "email cannot handle a {} payload",
                other.kind()
            ))),
        }
    }
}
